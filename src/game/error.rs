use thiserror::Error;

use super::state::Position;

/// Faults raised by the engine. Collisions and wins are not errors; they are
/// reported as game phases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("position {0} is outside the grid")]
    OffGrid(Position),
    #[error("no empty cell left to place food")]
    NoSpace,
    #[error("coordinate overflow moving from {0}")]
    CoordinateOverflow(Position),
    #[error("cell {0} is not empty")]
    Occupied(Position),
}
