use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{Cell, GameObserver, Score};
use crate::metrics::SessionStats;

/// Latest state pushed by the game controller, ready to draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameModel {
    pub field: String,
    pub score: Score,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl GameObserver for FrameModel {
    fn on_render(&mut self, field: &str) {
        self.field.clear();
        self.field.push_str(field);
    }

    fn on_score(&mut self, score: Score) {
        self.score = score;
    }

    fn on_message(&mut self, message: Option<&str>) {
        // A cleared message means a new game; stale errors go with it
        if message.is_none() {
            self.error = None;
        }
        self.message = message.map(str::to_string);
    }

    fn on_error(&mut self, error: &str) {
        self.error = Some(error.to_string());
    }
}

fn cell_style(symbol: char) -> Style {
    if symbol == Cell::Snake.symbol() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if symbol == Cell::Food.symbol() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if symbol == Cell::Wall.symbol() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

/// Colour each run of identical symbols in one rendered row.
fn styled_row(row: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = row.char_indices().collect();
    for (i, &(offset, symbol)) in chars.iter().enumerate() {
        let run_ends = chars.get(i + 1).map_or(true, |&(_, next)| next != symbol);
        if run_ends {
            let end = offset + symbol.len_utf8();
            spans.push(Span::styled(&row[start..end], cell_style(symbol)));
            start = end;
        }
    }
    Line::from(spans)
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, model: &FrameModel, stats: &SessionStats) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(0),    // Field
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(model, stats), chunks[0]);
        frame.render_widget(self.render_field(model), chunks[1]);

        if let Some(message) = &model.message {
            let popup = centered(chunks[1], 40, 7);
            frame.render_widget(Clear, popup);
            frame.render_widget(self.render_message(message, model.score), popup);
        }

        frame.render_widget(self.render_footer(model), chunks[2]);
    }

    fn render_field<'a>(&self, model: &'a FrameModel) -> Paragraph<'a> {
        let lines: Vec<Line> = model.field.lines().map(styled_row).collect();
        Paragraph::new(lines).alignment(Alignment::Center)
    }

    fn render_stats(&self, model: &FrameModel, stats: &SessionStats) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let text = Line::from(vec![
            Span::styled("Food: ", label),
            Span::styled(model.score.food_eaten.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(model.score.speed_level.to_string(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(stats.best_food.to_string(), value),
            Span::raw("    "),
            Span::styled("Games: ", label),
            Span::styled(stats.games_played.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(stats.format_time(), value),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_message(&self, message: &str, score: Score) -> Paragraph<'_> {
        let text = vec![
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Food eaten: {}", score.food_eaten)),
            Line::from(""),
            Line::from(vec![
                Span::styled("R", Style::default().fg(Color::Green)),
                Span::raw(" to restart, "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double),
        )
    }

    fn render_footer<'a>(&self, model: &'a FrameModel) -> Paragraph<'a> {
        let line = match &model.error {
            Some(error) => Line::from(Span::styled(
                format!("Error: {error}"),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]),
        };
        Paragraph::new(line).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
