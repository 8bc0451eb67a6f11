use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Direction;

/// What a key press asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Turn(Direction),
    Restart,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };

        match code {
            KeyCode::Up | KeyCode::Char('w') => KeyAction::Turn(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') => KeyAction::Turn(Direction::Down),
            KeyCode::Left | KeyCode::Char('a') => KeyAction::Turn(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') => KeyAction::Turn(Direction::Right),

            KeyCode::Enter | KeyCode::Char('r') => KeyAction::Restart,
            KeyCode::Esc | KeyCode::Char('q') => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
