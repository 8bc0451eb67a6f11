use std::ops::Range;
use std::time::Duration;

use rand::rngs::ThreadRng;
use rand::seq::IteratorRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use super::{
    action::Direction,
    config::{ConfigError, GameConfig},
    error::GameError,
    grid::{Cell, Grid},
    state::{GamePhase, MoveOutcome, Position, Score, Snake},
};

pub const GAME_OVER_MESSAGE: &str = "Game Over";
pub const WIN_MESSAGE: &str = "You win";

/// Receives everything the UI layer needs to draw the game.
pub trait GameObserver {
    /// Text rendering of the grid, sent after every successful tick and on start
    fn on_render(&mut self, field: &str);
    /// Sent on start and whenever food is eaten
    fn on_score(&mut self, score: Score);
    /// Terminal message when the game ends, `None` when a new game starts
    fn on_message(&mut self, message: Option<&str>);
    /// Unexpected fault during a tick
    fn on_error(&mut self, error: &str);
}

impl GameObserver for () {
    fn on_render(&mut self, _field: &str) {}
    fn on_score(&mut self, _score: Score) {}
    fn on_message(&mut self, _message: Option<&str>) {}
    fn on_error(&mut self, _error: &str) {}
}

/// Interval after one more food, and whether the speed level goes up.
///
/// Once the next step would go below `floor` the interval is pinned there
/// and the level stops climbing.
pub fn next_interval(current: Duration, step: Duration, floor: Duration) -> (Duration, bool) {
    match current.checked_sub(step) {
        Some(candidate) if candidate >= floor => (candidate, true),
        _ => (floor, false),
    }
}

/// Central span of `len` with `len / divisor` cut from each side, or the
/// whole span when that leaves nothing.
fn spawn_range(len: usize, divisor: usize) -> Range<usize> {
    let margin = len / divisor;
    if margin * 2 < len {
        margin..len - margin
    } else {
        0..len
    }
}

/// Owns the grid and the snake and advances the game one tick at a time.
///
/// The controller never schedules itself: an external driver calls
/// [`tick`](Self::tick) every [`tick_interval`](Self::tick_interval).
pub struct GameController<O, R = ThreadRng> {
    config: GameConfig,
    grid: Grid,
    snake: Snake,
    food: Option<Position>,
    /// Direction of the last move actually made
    heading: Direction,
    /// Direction the next tick will move in
    requested: Direction,
    score: Score,
    interval: Duration,
    phase: GamePhase,
    observer: O,
    rng: R,
}

impl<O: GameObserver> GameController<O, ThreadRng> {
    pub fn new(config: GameConfig, observer: O) -> Result<Self, ConfigError> {
        Self::with_rng(config, observer, rand::thread_rng())
    }
}

impl<O: GameObserver, R: Rng> GameController<O, R> {
    /// Fails when `config` does not pass [`GameConfig::validate`].
    pub fn with_rng(config: GameConfig, observer: O, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: Grid::new(config.grid_width, config.grid_height),
            snake: Snake::new(Position::new(0, 0), config.initial_body_length),
            food: None,
            heading: Direction::Right,
            requested: Direction::Right,
            score: Score::default(),
            interval: config.initial_interval(),
            phase: GamePhase::Idle,
            observer,
            rng,
            config,
        })
    }

    /// Start a new game with the snake at a random spot away from the edges.
    pub fn start(&mut self) -> Result<(), GameError> {
        let xs = spawn_range(self.grid.width(), 5);
        let ys = spawn_range(self.grid.height(), 4);
        let head = Position::new(self.rng.gen_range(xs) as i32, self.rng.gen_range(ys) as i32);
        self.start_at(head)
    }

    /// Start a new game with the snake's head at `head`.
    pub fn start_at(&mut self, head: Position) -> Result<(), GameError> {
        if !self.grid.contains(head) {
            return Err(GameError::OffGrid(head));
        }

        self.grid.clear();
        self.snake = Snake::new(head, self.config.initial_body_length);
        self.grid.set(head, Cell::Snake)?;
        self.food = None;
        self.heading = Direction::Right;
        self.requested = Direction::Right;
        self.score = Score::default();
        self.interval = self.config.initial_interval();
        self.phase = GamePhase::Playing;

        self.observer.on_message(None);
        self.observer.on_score(self.score);
        debug!(x = head.x, y = head.y, "game started");

        if self.grid.is_full() {
            self.finish(GamePhase::Won);
        } else {
            self.spawn_food()?;
        }
        self.observer.on_render(&self.grid.render());
        Ok(())
    }

    /// Place food on a random empty cell.
    pub fn spawn_food(&mut self) -> Result<Position, GameError> {
        if self.grid.is_full() {
            return Err(GameError::NoSpace);
        }

        let (width, height) = (self.grid.width(), self.grid.height());
        for _ in 0..4 * width * height {
            let pos = Position::new(
                self.rng.gen_range(0..width) as i32,
                self.rng.gen_range(0..height) as i32,
            );
            if self.grid.get(pos) == Some(Cell::Empty) {
                return self.put_food(pos);
            }
        }

        // Nearly full grid: stop sampling blindly
        let pos = self
            .grid
            .empty_cells()
            .choose(&mut self.rng)
            .ok_or(GameError::NoSpace)?;
        self.put_food(pos)
    }

    /// Move the current food to `pos`, which must be an empty cell.
    pub fn place_food(&mut self, pos: Position) -> Result<(), GameError> {
        if self.food == Some(pos) {
            return Ok(());
        }
        match self.grid.get(pos) {
            None => return Err(GameError::OffGrid(pos)),
            Some(Cell::Empty) => {}
            Some(_) => return Err(GameError::Occupied(pos)),
        }
        if let Some(old) = self.food.take() {
            if self.grid.get(old) == Some(Cell::Food) {
                self.grid.set(old, Cell::Empty)?;
            }
        }
        self.put_food(pos).map(|_| ())
    }

    fn put_food(&mut self, pos: Position) -> Result<Position, GameError> {
        self.grid.set(pos, Cell::Food)?;
        self.food = Some(pos);
        debug!(x = pos.x, y = pos.y, "food placed");
        Ok(pos)
    }

    /// Request a new direction for the next tick.
    ///
    /// Returns false when it would reverse the last move.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if self.heading.allows_turn_to(direction) {
            self.requested = direction;
            true
        } else {
            false
        }
    }

    /// Advance the game by one step. Does nothing unless a game is in progress.
    pub fn tick(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        if let Err(err) = self.step() {
            warn!(error = %err, "tick failed");
            self.observer.on_error(&err.to_string());
        }
    }

    fn step(&mut self) -> Result<(), GameError> {
        let direction = self.requested;
        let outcome = self.snake.advance(direction, &mut self.grid)?;
        if let MoveOutcome::Collided(kind) = outcome {
            info!(?kind, food = self.score.food_eaten, "snake collided");
            self.finish(GamePhase::Lost);
            return Ok(());
        }

        self.heading = direction;
        if outcome == MoveOutcome::Ate {
            self.on_food_eaten()?;
        }
        self.observer.on_render(&self.grid.render());
        Ok(())
    }

    fn on_food_eaten(&mut self) -> Result<(), GameError> {
        self.food = None;
        self.score.food_eaten += 1;

        let (interval, faster) = next_interval(
            self.interval,
            Duration::from_millis(self.config.interval_step_ms),
            Duration::from_millis(self.config.min_interval_ms),
        );
        self.interval = interval;
        if faster {
            self.score.speed_level += 1;
        }
        self.observer.on_score(self.score);

        if self.grid.is_full() {
            info!(food = self.score.food_eaten, "grid filled");
            self.finish(GamePhase::Won);
            return Ok(());
        }
        self.spawn_food()?;
        Ok(())
    }

    fn finish(&mut self, phase: GamePhase) {
        self.phase = phase;
        let message = match phase {
            GamePhase::Won => WIN_MESSAGE,
            _ => GAME_OVER_MESSAGE,
        };
        self.observer.on_message(Some(message));
    }

    /// Halt a running game; ticks are ignored until the next start.
    pub fn stop(&mut self) {
        if self.phase == GamePhase::Playing {
            debug!("game stopped");
            self.phase = GamePhase::Idle;
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn tick_interval(&self) -> Duration {
        self.interval
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, Default)]
    struct Recorder {
        renders: Vec<String>,
        scores: Vec<Score>,
        messages: Vec<Option<String>>,
        errors: Vec<String>,
    }

    impl GameObserver for Recorder {
        fn on_render(&mut self, field: &str) {
            self.renders.push(field.to_string());
        }
        fn on_score(&mut self, score: Score) {
            self.scores.push(score);
        }
        fn on_message(&mut self, message: Option<&str>) {
            self.messages.push(message.map(str::to_string));
        }
        fn on_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }
    }

    fn controller(config: GameConfig) -> GameController<Recorder, StdRng> {
        GameController::with_rng(config, Recorder::default(), StdRng::seed_from_u64(7)).unwrap()
    }

    fn food_cells(grid: &Grid) -> Vec<Position> {
        (0..grid.height() as i32)
            .flat_map(|y| (0..grid.width() as i32).map(move |x| Position::new(x, y)))
            .filter(|&pos| grid.get(pos) == Some(Cell::Food))
            .collect()
    }

    #[test]
    fn test_start() {
        let mut game = controller(GameConfig::default());
        assert_eq!(game.phase(), GamePhase::Idle);

        game.start().unwrap();

        assert_eq!(game.phase(), GamePhase::Playing);
        let head = game.snake().head();
        assert!((20..80).contains(&head.x), "x = {}", head.x);
        assert!((4..14).contains(&head.y), "y = {}", head.y);
        assert_eq!(game.grid().get(head), Some(Cell::Snake));
        assert_eq!(food_cells(game.grid()).len(), 1);

        let seen = game.observer();
        assert_eq!(seen.messages, vec![None]);
        assert_eq!(seen.scores, vec![Score::default()]);
        assert_eq!(seen.renders.len(), 1);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut game = controller(GameConfig::new(5, 5));
        game.start_at(Position::new(4, 2)).unwrap();
        game.place_food(Position::new(0, 0)).unwrap();
        game.tick();
        assert_eq!(game.phase(), GamePhase::Lost);

        game.start().unwrap();

        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.heading(), Direction::Right);
        assert_eq!(game.score(), Score::default());
        assert_eq!(game.tick_interval(), Duration::from_millis(200));
        assert_eq!(game.grid().empty_cells().count(), 25 - 2);
        assert_eq!(game.observer().messages.last(), Some(&None));
    }

    #[test]
    fn test_eating_food_end_to_end() {
        let config = GameConfig {
            initial_body_length: 1,
            ..GameConfig::new(5, 5)
        };
        let mut game = controller(config);
        game.start_at(Position::new(1, 1)).unwrap();
        game.place_food(Position::new(2, 1)).unwrap();

        game.tick();

        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.snake().head(), Position::new(2, 1));
        assert_eq!(game.snake().target_len(), 2);
        assert_eq!(game.grid().get(Position::new(1, 1)), Some(Cell::Snake));

        let food = food_cells(game.grid());
        assert_eq!(food.len(), 1);
        assert_ne!(food[0], Position::new(2, 1));
        assert_eq!(game.food(), Some(food[0]));

        let score = game.score();
        assert_eq!(score.food_eaten, 1);
        assert_eq!(score.speed_level, 2);
        assert_eq!(game.observer().scores.last(), Some(&score));
        assert_eq!(game.tick_interval(), Duration::from_millis(180));
        assert_eq!(game.observer().renders.len(), 2);
    }

    #[test]
    fn test_wall_collision_end_to_end() {
        let mut game = controller(GameConfig::new(5, 5));
        game.start_at(Position::new(4, 2)).unwrap();
        game.place_food(Position::new(0, 4)).unwrap();
        let grid_before = game.grid().clone();
        let snake_before = game.snake().clone();

        game.tick();

        assert_eq!(game.phase(), GamePhase::Lost);
        assert_eq!(
            game.observer().messages.last(),
            Some(&Some(GAME_OVER_MESSAGE.to_string()))
        );
        assert_eq!(game.grid(), &grid_before);
        assert_eq!(game.snake(), &snake_before);
        assert_eq!(game.observer().renders.len(), 1);
    }

    #[test]
    fn test_ticks_ignored_after_game_over() {
        let mut game = controller(GameConfig::new(5, 5));
        game.start_at(Position::new(4, 0)).unwrap();
        game.place_food(Position::new(0, 4)).unwrap();
        game.tick();
        assert_eq!(game.phase(), GamePhase::Lost);

        game.turn(Direction::Down);
        game.tick();

        assert_eq!(game.phase(), GamePhase::Lost);
        assert_eq!(game.snake().head(), Position::new(4, 0));
        assert_eq!(game.observer().messages.len(), 2);
    }

    #[test]
    fn test_stop_halts_ticks() {
        let mut game = controller(GameConfig::new(10, 10));
        game.start_at(Position::new(2, 2)).unwrap();
        game.stop();
        assert_eq!(game.phase(), GamePhase::Idle);

        game.tick();
        assert_eq!(game.snake().head(), Position::new(2, 2));

        game.start_at(Position::new(2, 2)).unwrap();
        game.place_food(Position::new(9, 9)).unwrap();
        game.tick();
        assert_eq!(game.snake().head(), Position::new(3, 2));
    }

    #[test]
    fn test_turn_cannot_reverse() {
        let mut game = controller(GameConfig::new(10, 10));
        game.start_at(Position::new(5, 5)).unwrap();
        game.place_food(Position::new(0, 0)).unwrap();

        assert!(!game.turn(Direction::Left));
        assert!(game.turn(Direction::Right));
        assert!(game.turn(Direction::Up));
        // Still heading right until the next tick moves up
        assert!(!game.turn(Direction::Left));

        game.tick();
        assert_eq!(game.snake().head(), Position::new(5, 4));
        assert_eq!(game.heading(), Direction::Up);
        assert!(!game.turn(Direction::Down));
        assert!(game.turn(Direction::Left));
    }

    #[test]
    fn test_filling_grid_wins() {
        let config = GameConfig {
            initial_body_length: 1,
            ..GameConfig::new(2, 1)
        };
        let mut game = controller(config);
        game.start_at(Position::new(0, 0)).unwrap();
        assert_eq!(game.food(), Some(Position::new(1, 0)));

        game.tick();

        assert_eq!(game.phase(), GamePhase::Won);
        assert!(game.grid().is_full());
        assert_eq!(
            game.observer().messages.last(),
            Some(&Some(WIN_MESSAGE.to_string()))
        );
        assert_eq!(game.score().food_eaten, 1);
    }

    #[test]
    fn test_spawn_food_on_full_grid() {
        let config = GameConfig {
            initial_body_length: 0,
            ..GameConfig::new(1, 1)
        };
        let mut game = controller(config);
        game.start_at(Position::new(0, 0)).unwrap();

        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(game.spawn_food(), Err(GameError::NoSpace));
    }

    #[test]
    fn test_spawn_food_finds_last_empty_cell() {
        let mut game = controller(GameConfig::new(4, 4));
        game.start_at(Position::new(0, 0)).unwrap();
        game.place_food(Position::new(1, 0)).unwrap();
        let last = Position::new(3, 3);
        let cells: Vec<_> = game.grid().empty_cells().filter(|&p| p != last).collect();
        for pos in cells {
            game.grid.set(pos, Cell::Wall).unwrap();
        }

        assert_eq!(game.spawn_food(), Ok(last));
        assert_eq!(game.grid().get(last), Some(Cell::Food));
    }

    #[test]
    fn test_place_food_rejects_occupied_cells() {
        let mut game = controller(GameConfig::new(5, 5));
        game.start_at(Position::new(2, 2)).unwrap();

        assert_eq!(
            game.place_food(Position::new(2, 2)),
            Err(GameError::Occupied(Position::new(2, 2)))
        );
        assert_eq!(
            game.place_food(Position::new(5, 0)),
            Err(GameError::OffGrid(Position::new(5, 0)))
        );
        assert_eq!(
            game.start_at(Position::new(-1, 0)),
            Err(GameError::OffGrid(Position::new(-1, 0)))
        );
    }

    #[test]
    fn test_tick_error_is_reported() {
        let mut game = controller(GameConfig::new(5, 5));
        game.start_at(Position::new(2, 2)).unwrap();
        game.snake = Snake::new(Position::new(i32::MAX, 0), 1);
        let renders = game.observer().renders.len();

        game.tick();

        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.observer().errors.len(), 1);
        assert_eq!(game.observer().renders.len(), renders);
    }

    #[test]
    fn test_speed_ramp_stops_at_floor() {
        let step = Duration::from_millis(20);
        let floor = Duration::from_millis(10);
        let mut interval = Duration::from_millis(200);
        let mut level = 1;
        for _ in 0..15 {
            let (next, faster) = next_interval(interval, step, floor);
            interval = next;
            if faster {
                level += 1;
            }
        }
        assert_eq!(interval, floor);
        assert_eq!(level, 10);

        assert_eq!(
            next_interval(Duration::from_millis(40), step, floor),
            (Duration::from_millis(20), true)
        );
        assert_eq!(next_interval(Duration::from_millis(20), step, floor), (floor, false));
        assert_eq!(next_interval(floor, step, floor), (floor, false));
    }

    #[test]
    fn test_spawn_range() {
        assert_eq!(spawn_range(100, 5), 20..80);
        assert_eq!(spawn_range(18, 4), 4..14);
        assert_eq!(spawn_range(1, 4), 0..1);
        assert_eq!(spawn_range(2, 2), 0..2);
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let empty = GameController::new(GameConfig::new(0, 5), ());
        assert!(matches!(empty, Err(ConfigError::Invalid(_))));

        let oversized = GameConfig {
            initial_body_length: usize::MAX,
            ..GameConfig::new(5, 5)
        };
        assert!(GameController::new(oversized, ()).is_err());
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let mut a = controller(GameConfig::default());
        let mut b = controller(GameConfig::default());
        a.start().unwrap();
        b.start().unwrap();
        assert_eq!(a.snake().head(), b.snake().head());
        assert_eq!(a.food(), b.food());
    }
}
