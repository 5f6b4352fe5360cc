//! A terminal Pac-Man whose player can steer itself.
//!
//! The autopilot is the interesting part: [`Autopilot::next_move`] runs once
//! per tick, flees along an A* route when a ghost is within its safety
//! threshold and otherwise heads for the nearest pellet. Everything it needs
//! from the board goes through the [`Grid`] and [`Level`] traits.
//!
//! | Module | Role |
//! |---|---|
//! | [`search`] | generic A* engine |
//! | [`cost`] | step costs, heuristic, the board as a search space |
//! | [`scan`] | BFS scans for goal selection and ghost distance maps |
//! | [`autopilot`] | the per-tick decision loop |
//! | [`scheduler`] | cooperative multi-actor ticking with cancellation |
//! | [`board`], [`maze`], [`ghost`], [`game`] | the game the autopilot plays |

pub mod autopilot;
pub mod board;
pub mod config;
pub mod cost;
pub mod error;
pub mod game;
pub mod ghost;
pub mod grid;
pub mod maze;
pub mod scan;
pub mod scheduler;
pub mod search;

pub use autopilot::Autopilot;
pub use board::{Board, Tile};
pub use config::{AiConfig, Settings, ThresholdTier};
pub use cost::{CostModel, PlayerSpace};
pub use error::{BoardError, PlanError, SchedulerError};
pub use game::{Game, Session};
pub use grid::{manhattan, Actor, Dir, Grid, Level, Occupant, Pos};
pub use scan::Scanner;
pub use scheduler::{ActorId, CancelToken, Scheduler, Tickable};
pub use search::{AStar, SearchSpace};
