use thiserror::Error;

/// A board that cannot be built. Fatal: the level never starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board has no rows")]
    Empty,

    #[error("row {row} is {found} squares wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error("board has no square the player can stand on")]
    NoOpenSquare,

    #[error("maze of {width}x{height} is too small, need at least 7x7")]
    TooSmall { width: usize, height: usize },
}

/// Why a single planning attempt produced nothing usable.
///
/// The autopilot absorbs every variant through its fallback chain; these only
/// reach the logs.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PlanError {
    #[error("no goal square found")]
    InvalidGoal,

    #[error("goal unreachable")]
    NoPathFound,

    #[error("path does not leave the start square")]
    Degenerate,

    #[error("path cost {cost} crosses a ghost")]
    Unsafe { cost: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("shared game state lock was poisoned")]
    Poisoned,
}
