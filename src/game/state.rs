use std::collections::VecDeque;
use std::fmt;

use super::action::Direction;
use super::error::GameError;
use super::grid::{Cell, Grid};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring position one step in `direction`
    pub fn offset(&self, direction: Direction) -> Result<Self, GameError> {
        let (dx, dy) = direction.delta();
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Ok(Self { x, y }),
            _ => Err(GameError::CoordinateOverflow(*self)),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Type of collision that ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall or left the grid
    Wall,
    /// Snake hit its own body
    SelfCollision,
}

/// What a single snake move did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Ate,
    Collided(CollisionType),
}

/// The snake: a head plus trailing body segments, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    head: Position,
    body: VecDeque<Position>,
    target_len: usize,
}

impl Snake {
    /// A snake with only a head; the body grows behind it as it moves.
    pub fn new(head: Position, target_len: usize) -> Self {
        Self {
            head,
            body: VecDeque::new(),
            target_len,
        }
    }

    pub fn head(&self) -> Position {
        self.head
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Move one cell in `direction`, updating both the snake and the grid.
    ///
    /// A collision leaves the snake and the grid untouched.
    pub fn advance(&mut self, direction: Direction, grid: &mut Grid) -> Result<MoveOutcome, GameError> {
        let next = self.head.offset(direction)?;

        let ate = match grid.get(next) {
            Some(Cell::Food) => true,
            Some(Cell::Empty) => false,
            Some(Cell::Snake) => return Ok(MoveOutcome::Collided(CollisionType::SelfCollision)),
            Some(Cell::Wall) | None => return Ok(MoveOutcome::Collided(CollisionType::Wall)),
        };

        if ate {
            self.target_len += 1;
        }

        grid.set(next, Cell::Snake)?;
        self.body.push_front(self.head);
        while self.body.len() > self.target_len {
            if let Some(tail) = self.body.pop_back() {
                grid.set(tail, Cell::Empty)?;
            }
        }
        self.head = next;

        Ok(if ate { MoveOutcome::Ate } else { MoveOutcome::Moved })
    }
}

/// Lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    Idle,
    Playing,
    Won,
    Lost,
}

impl GamePhase {
    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Score reported to the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub food_eaten: u32,
    pub speed_level: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self {
            food_eaten: 0,
            speed_level: 1,
        }
    }
}
