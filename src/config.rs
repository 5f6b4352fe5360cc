use std::path::PathBuf;
use std::time::Duration;

pub const IMPASSABLE_COST: f64 = 1.0e9;
pub const NEAR_GHOST_COST: f64 = 1_000.0;
pub const ITEM_COST: f64 = 1.0;
pub const EMPTY_COST: f64 = 2.0;
pub const NEAR_GHOST_RADIUS: usize = 2;
pub const DEFAULT_SAFETY_THRESHOLD: usize = 4;

const DEFAULT_TICK_MS: u64 = 70;
const DEFAULT_GHOST_MS: u64 = 140;
const DEFAULT_RENDER_FPS: u64 = 120;
const DEFAULT_GRID_W: usize = 31;
const DEFAULT_GRID_H: usize = 21;

/// Safety threshold used while at least `min_items` items are left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdTier {
    pub min_items: usize,
    pub threshold: usize,
}

/// Autopilot tuning. Fixed for the life of an [`Autopilot`](crate::Autopilot).
#[derive(Clone, Debug, PartialEq)]
pub struct AiConfig {
    /// Cost of stepping onto a ghost. Must dominate any sum of the other costs.
    pub impassable_cost: f64,
    pub near_ghost_cost: f64,
    pub item_cost: f64,
    pub empty_cost: f64,
    pub near_ghost_radius: usize,
    /// Starting threshold, and the one used when no tier matches.
    pub safety_threshold: usize,
    /// Checked in order; the first tier whose `min_items` is met wins.
    pub tiers: Vec<ThresholdTier>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            impassable_cost: IMPASSABLE_COST,
            near_ghost_cost: NEAR_GHOST_COST,
            item_cost: ITEM_COST,
            empty_cost: EMPTY_COST,
            near_ghost_radius: NEAR_GHOST_RADIUS,
            safety_threshold: DEFAULT_SAFETY_THRESHOLD,
            tiers: vec![
                ThresholdTier {
                    min_items: 120,
                    threshold: 5,
                },
                ThresholdTier {
                    min_items: 40,
                    threshold: DEFAULT_SAFETY_THRESHOLD,
                },
                ThresholdTier {
                    min_items: 10,
                    threshold: 3,
                },
                ThresholdTier {
                    min_items: 0,
                    threshold: 2,
                },
            ],
        }
    }
}

impl AiConfig {
    /// Tier lookup: far when the board is full, tight near the end.
    pub fn threshold_for(&self, items_left: usize) -> usize {
        self.tiers
            .iter()
            .find(|tier| items_left >= tier.min_items)
            .map(|tier| tier.threshold)
            .unwrap_or(self.safety_threshold)
    }
}

/// Runtime knobs of the terminal game, read from `PACMAN_*` variables.
#[derive(Clone, Debug)]
pub struct Settings {
    pub tick: Duration,
    pub ghost_tick: Duration,
    pub render_fps: u64,
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
    pub log_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let tick_ms = positive_var("PACMAN_TICK_MS").unwrap_or(DEFAULT_TICK_MS);
        let ghost_ms = positive_var("PACMAN_GHOST_MS").unwrap_or(DEFAULT_GHOST_MS);
        let render_fps = positive_var("PACMAN_FPS").unwrap_or(DEFAULT_RENDER_FPS);
        let width = positive_var("PACMAN_WIDTH").map_or(DEFAULT_GRID_W, |v| v as usize);
        let height = positive_var("PACMAN_HEIGHT").map_or(DEFAULT_GRID_H, |v| v as usize);
        let log_dir = std::env::var_os("PACMAN_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("pacman"));
        Self {
            tick: Duration::from_millis(tick_ms),
            ghost_tick: Duration::from_millis(ghost_ms),
            render_fps,
            // the maze lattice needs odd dimensions
            width: width | 1,
            height: height | 1,
            seed: std::env::var("PACMAN_SEED")
                .ok()
                .and_then(|v| v.parse::<u64>().ok()),
            log_dir,
        }
    }
}

fn positive_var(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
}
