//! Snake engine
//!
//! Pure game logic with no I/O or rendering dependencies. A driver owns a
//! [`GameController`], feeds it direction input, and calls `tick` on a timer.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{ConfigError, GameConfig};
pub use engine::{GameController, GameObserver, GAME_OVER_MESSAGE, WIN_MESSAGE};
pub use error::GameError;
pub use grid::{Cell, Grid};
pub use state::{CollisionType, GamePhase, MoveOutcome, Position, Score, Snake};
