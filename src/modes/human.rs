use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at};
use tracing::{debug, info};

use crate::game::{GameConfig, GameController, GamePhase};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::SessionStats;
use crate::render::{FrameModel, Renderer};

const RENDER_INTERVAL: Duration = Duration::from_millis(33);

fn tick_timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Interactive game in the terminal.
pub struct HumanMode {
    game: GameController<FrameModel>,
    stats: SessionStats,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Result<Self> {
        let mut mode = Self {
            game: GameController::new(config, FrameModel::default())?,
            stats: SessionStats::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        };
        mode.restart()?;
        Ok(mode)
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;
        self.game.stop();

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut armed_period = self.game.tick_interval();
        let mut tick = tick_timer(armed_period);
        let mut render = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event)?,
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                _ = tick.tick() => {
                    self.update_game();
                }

                _ = render.tick() => {
                    if self.game.phase() == GamePhase::Playing {
                        self.stats.update();
                    }
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.game.observer(), &self.stats);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            // Speed changes apply from the next tick on
            let period = self.game.tick_interval();
            if period != armed_period {
                debug!(period_ms = period.as_millis() as u64, "re-arming tick timer");
                armed_period = period;
                tick = tick_timer(period);
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Turn(direction) => {
                    self.game.turn(direction);
                }
                KeyAction::Restart => self.restart()?,
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) {
        let was_playing = self.game.phase() == GamePhase::Playing;
        self.game.tick();

        if was_playing && self.game.phase().is_over() {
            self.record_result();
        }
    }

    fn restart(&mut self) -> Result<()> {
        self.game.start().context("Failed to start game")?;
        self.stats.on_game_start();
        // A grid the head alone fills is won before the first tick
        if self.game.phase().is_over() {
            self.record_result();
        }
        Ok(())
    }

    fn record_result(&mut self) {
        let phase = self.game.phase();
        let score = self.game.score();
        info!(?phase, food = score.food_eaten, speed = score.speed_level, "game finished");
        self.stats.on_game_over(phase, score);
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
