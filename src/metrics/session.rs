use std::time::{Duration, Instant};

use crate::game::{GamePhase, Score};

/// Stats across all games played in one session
pub struct SessionStats {
    game_started: Instant,
    pub elapsed_time: Duration,
    pub best_food: u32,
    pub best_speed: u32,
    pub games_played: u32,
    pub games_won: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            game_started: Instant::now(),
            elapsed_time: Duration::ZERO,
            best_food: 0,
            best_speed: 0,
            games_played: 0,
            games_won: 0,
        }
    }

    /// Refresh the clock of the game in progress
    pub fn update(&mut self) {
        self.elapsed_time = self.game_started.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.game_started = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, phase: GamePhase, score: Score) {
        self.games_played += 1;
        if phase == GamePhase::Won {
            self.games_won += 1;
        }
        self.best_food = self.best_food.max(score.food_eaten);
        self.best_speed = self.best_speed.max(score.speed_level);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
