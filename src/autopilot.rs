//! Per-tick steering for a computer-controlled player.
//!
//! Each call to [`Autopilot::next_move`] reads the board fresh, decides
//! whether a ghost is close enough to flee from, picks a goal with a BFS scan,
//! routes to it with A* under the [`CostModel`], and hands back one direction.
//! The rest of the route is kept for the following ticks until the player
//! reaches a junction, gets threatened, or ends up somewhere unexpected.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::config::AiConfig;
use crate::cost::{CostModel, PlayerSpace};
use crate::error::PlanError;
use crate::grid::{Actor, Dir, Grid, Level, Pos};
use crate::scan::Scanner;
use crate::search::AStar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Goal {
    Safety,
    Item,
}

impl Goal {
    fn other(self) -> Goal {
        match self {
            Goal::Safety => Goal::Item,
            Goal::Item => Goal::Safety,
        }
    }
}

#[derive(Debug)]
pub struct Autopilot {
    config: AiConfig,
    model: CostModel,
    safety_threshold: usize,
    pinned: bool,
    pending: VecDeque<Dir>,
    expect_at: Option<Pos>,
    astar: AStar<Pos>,
    scanner: Scanner,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::with_config(AiConfig::default())
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AiConfig) -> Self {
        Self {
            model: CostModel::new(&config),
            safety_threshold: config.safety_threshold,
            pinned: false,
            pending: VecDeque::new(),
            expect_at: None,
            astar: AStar::new(),
            scanner: Scanner::new(),
            config,
        }
    }

    pub fn safety_threshold(&self) -> usize {
        self.safety_threshold
    }

    /// Pins the threshold; tier retuning stays off until
    /// [`clear_safety_override`](Self::clear_safety_override).
    pub fn set_safety_threshold(&mut self, threshold: usize) {
        self.safety_threshold = threshold;
        self.pinned = true;
    }

    pub fn clear_safety_override(&mut self) {
        self.pinned = false;
    }

    /// Directions still queued from the last plan.
    pub fn pending(&self) -> impl Iterator<Item = Dir> + '_ {
        self.pending.iter().copied()
    }

    /// Chooses the player's next step. Never fails: when no plan works out it
    /// falls back to a fixed turning rule.
    pub fn next_move<L: Level>(&mut self, level: &L) -> Dir {
        if !self.pinned {
            self.safety_threshold = self.config.threshold_for(level.items_left());
        }

        let here = level.player();
        let facing = level.facing();
        let ghosts = level.ghosts();
        let threatened = ghosts
            .iter()
            .any(|&g| level.distance(g, here) <= self.safety_threshold);

        let dir = match self.take_pending(level, here, threatened) {
            Some(dir) => dir,
            None => self.replan(level, here, facing, threatened),
        };

        if is_intersection(level, here, facing) {
            self.pending.clear();
        }
        self.expect_at = if self.pending.is_empty() {
            None
        } else {
            Some(level.neighbor(here, dir))
        };
        dir
    }

    fn take_pending<L: Level>(&mut self, level: &L, here: Pos, threatened: bool) -> Option<Dir> {
        if threatened || self.expect_at != Some(here) {
            self.pending.clear();
            return None;
        }
        let dir = *self.pending.front()?;
        let next = level.neighbor(here, dir);
        if !level.is_accessible(next, Actor::Player) || level.has_ghost(next) {
            self.pending.clear();
            return None;
        }
        self.pending.pop_front()
    }

    fn replan<L: Level>(&mut self, level: &L, here: Pos, facing: Dir, threatened: bool) -> Dir {
        self.pending.clear();
        let first = if threatened { Goal::Safety } else { Goal::Item };

        for goal in [first, first.other()] {
            match self.plan(level, here, goal) {
                Ok(path) => {
                    self.pending = path_directions(level, &path);
                    debug!(
                        ?goal,
                        threatened,
                        steps = self.pending.len(),
                        cost = self.astar.last_cost(),
                        "planned route"
                    );
                    if let Some(dir) = self.pending.pop_front() {
                        return dir;
                    }
                }
                Err(err) => debug!(?goal, %err, "plan rejected"),
            }
        }

        let dir = last_resort(level, here, facing);
        debug!(?dir, "no usable route, falling back");
        dir
    }

    fn plan<L: Level>(&mut self, level: &L, here: Pos, goal: Goal) -> Result<Vec<Pos>, PlanError> {
        let ghosts = level.ghosts();
        let target = match goal {
            Goal::Safety => {
                self.scanner
                    .nearest_safe(level, here, ghosts, self.safety_threshold)
            }
            Goal::Item => self.scanner.nearest_item(level, here),
        }
        .ok_or(PlanError::InvalidGoal)?;

        let space = PlayerSpace {
            grid: level,
            ghosts,
            model: &self.model,
            goal: target,
        };
        let path = self
            .astar
            .compute(&space, here)
            .ok_or(PlanError::NoPathFound)?;
        trace!(?target, expanded = self.astar.expanded(), "search finished");

        let cost = self.astar.last_cost();
        if self.model.is_unusable(cost) {
            return Err(PlanError::Unsafe { cost });
        }
        if path.len() < 2 {
            return Err(PlanError::Degenerate);
        }
        Ok(path)
    }
}

/// One direction per consecutive pair of squares.
pub fn path_directions<G: Grid>(grid: &G, path: &[Pos]) -> VecDeque<Dir> {
    path.windows(2)
        .map(|pair| direction_between(grid, pair[0], pair[1]))
        .collect()
}

/// Direction of the step `from -> to`. Resolved through the grid so wrapped
/// edges come out right; non-adjacent squares fall back to the sign of the
/// x delta, then the y delta.
pub fn direction_between<G: Grid>(grid: &G, from: Pos, to: Pos) -> Dir {
    if let Some(dir) = Dir::ALL.into_iter().find(|&d| grid.neighbor(from, d) == to) {
        return dir;
    }
    if to.x > from.x {
        Dir::East
    } else if to.x < from.x {
        Dir::West
    } else if to.y < from.y {
        Dir::North
    } else {
        Dir::South
    }
}

/// More than one way on, not counting the way back.
pub fn is_intersection<G: Grid>(grid: &G, pos: Pos, facing: Dir) -> bool {
    [facing, facing.clockwise(), facing.counter_clockwise()]
        .into_iter()
        .filter(|&d| {
            let next = grid.neighbor(pos, d);
            next != pos && grid.is_accessible(next, Actor::Player)
        })
        .count()
        > 1
}

/// Keep going if possible, otherwise turn right, left, then back.
fn last_resort<G: Grid>(grid: &G, here: Pos, facing: Dir) -> Dir {
    [
        facing,
        facing.clockwise(),
        facing.counter_clockwise(),
        facing.reverse(),
    ]
    .into_iter()
    .find(|&d| {
        let next = grid.neighbor(here, d);
        next != here && grid.is_accessible(next, Actor::Player)
    })
    .unwrap_or(facing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn board(rows: &[&str]) -> Board {
        Board::parse(rows).unwrap()
    }

    #[test]
    fn straight_corridor_heads_east() {
        let b = board(&["####", "#P.#", "####"]);
        let mut ai = Autopilot::new();
        assert_eq!(ai.next_move(&b), Dir::East);
    }

    #[test]
    fn corner_route_is_east_then_south() {
        let mut b = board(&["####", "#P #", "##.#", "####"]);
        let mut ai = Autopilot::new();
        assert_eq!(ai.next_move(&b), Dir::East);
        assert_eq!(ai.pending().collect::<Vec<_>>(), vec![Dir::South]);

        b.set_player(Pos::new(2, 1), Dir::East);
        assert_eq!(ai.next_move(&b), Dir::South);
    }

    #[test]
    fn flees_when_ghost_is_close() {
        // ghost two squares west, open run to the east
        let b = board(&["##########", "#G P     #", "##########"]);
        let mut ai = Autopilot::new();
        ai.set_safety_threshold(3);
        assert_eq!(ai.next_move(&b), Dir::East);
    }

    #[test]
    fn cornered_player_follows_the_item_route() {
        // every square is within the threshold, so there is no safe square;
        // the pellet two steps east is planned for instead
        let b = board(&["#######", "#G P .#", "#######"]);
        let mut ai = Autopilot::new();
        ai.set_safety_threshold(10);
        assert_eq!(b.facing(), Dir::West);
        assert_eq!(ai.next_move(&b), Dir::East);
        assert_eq!(ai.pending().collect::<Vec<_>>(), vec![Dir::East]);
    }

    #[test]
    fn tiers_retune_each_tick() {
        let b = board(&["####", "#P.#", "####"]);
        let mut ai = Autopilot::new();
        ai.next_move(&b);
        assert_eq!(ai.safety_threshold(), 2);

        ai.set_safety_threshold(7);
        ai.next_move(&b);
        assert_eq!(ai.safety_threshold(), 7);

        ai.clear_safety_override();
        ai.next_move(&b);
        assert_eq!(ai.safety_threshold(), 2);
    }

    #[test]
    fn ghost_in_only_corridor_falls_back() {
        // the single pellet sits behind a ghost; both scans come up empty
        let mut b = board(&["######", "#PG.##", "######"]);
        b.set_player(Pos::new(1, 1), Dir::East);
        let mut ai = Autopilot::new();
        let dir = ai.next_move(&b);
        // facing east is open terrain, so the last resort keeps going
        assert_eq!(dir, Dir::East);
        assert_eq!(ai.pending().count(), 0);
    }

    #[test]
    fn boxed_in_player_keeps_facing() {
        let mut b = board(&["###", "#P#", "###"]);
        b.set_player(Pos::new(1, 1), Dir::North);
        let mut ai = Autopilot::new();
        assert_eq!(ai.next_move(&b), Dir::North);
    }

    #[test]
    fn last_resort_turns_clockwise_first() {
        let b = board(&["#####", "# P #", "#####"]);
        assert_eq!(last_resort(&b, Pos::new(2, 1), Dir::North), Dir::East);
        assert_eq!(last_resort(&b, Pos::new(1, 1), Dir::West), Dir::East);
    }

    #[test]
    fn queue_is_dropped_at_junctions() {
        let b = board(&["#####", "# P #", "## ##", "## .#", "#####"]);
        let mut ai = Autopilot::new();
        // (2,1) has exits east, west and south
        assert!(is_intersection(&b, Pos::new(2, 1), Dir::West));
        ai.next_move(&b);
        assert_eq!(ai.pending().count(), 0);
    }

    #[test]
    fn unexpected_position_forces_replan() {
        let mut b = board(&["#######", "#P    #", "#####.#", "#######"]);
        b.set_player(Pos::new(1, 1), Dir::East);
        let mut ai = Autopilot::new();
        assert_eq!(ai.next_move(&b), Dir::East);
        assert!(ai.pending().count() > 0);

        // the harness put the player somewhere else (e.g. a respawn)
        b.set_player(Pos::new(4, 1), Dir::East);
        assert_eq!(ai.next_move(&b), Dir::East);
        assert_eq!(ai.pending().collect::<Vec<_>>(), vec![Dir::South]);
    }

    #[test]
    fn wrapped_step_maps_to_direction() {
        let b = board(&["P  "]);
        assert_eq!(direction_between(&b, Pos::new(0, 0), Pos::new(2, 0)), Dir::West);
        assert_eq!(direction_between(&b, Pos::new(2, 0), Pos::new(0, 0)), Dir::East);
    }
}
