//! Raw host events to game commands.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};

/// Input sources the game understands, independent of the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Key(KeyCode),
    PointerPress,
    TouchStart,
}

/// What the game is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start, flap or restart depending on the session phase.
    Tap,
    Restart,
    CloseModal,
    Quit,
}

/// Key bindings. Any tap key, a pointer press or a touch all mean [`Command::Tap`].
#[derive(Debug, Clone)]
pub struct InputMap {
    pub tap_keys: Vec<KeyCode>,
    pub restart_key: KeyCode,
    pub close_key: KeyCode,
    pub quit_keys: Vec<KeyCode>,
}

impl Default for InputMap {
    fn default() -> Self {
        Self {
            tap_keys: vec![KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('x')],
            restart_key: KeyCode::Char('r'),
            close_key: KeyCode::Char('c'),
            quit_keys: vec![KeyCode::Char('q'), KeyCode::Esc],
        }
    }
}

impl InputMap {
    pub fn translate(&self, input: RawInput) -> Option<Command> {
        match input {
            RawInput::PointerPress | RawInput::TouchStart => Some(Command::Tap),
            RawInput::Key(code) => {
                let code = normalize(code);
                if self.tap_keys.contains(&code) {
                    Some(Command::Tap)
                } else if self.quit_keys.contains(&code) {
                    Some(Command::Quit)
                } else if code == self.restart_key {
                    Some(Command::Restart)
                } else if code == self.close_key {
                    Some(Command::CloseModal)
                } else {
                    None
                }
            }
        }
    }

    /// Presses only; releases, repeats and other mouse buttons are dropped.
    pub fn from_event(event: &Event) -> Option<RawInput> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => Some(RawInput::Key(*code)),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(RawInput::PointerPress),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn command_for(&self, event: &Event) -> Option<Command> {
        Self::from_event(event).and_then(|raw| self.translate(raw))
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers, MouseEvent};

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn every_source_becomes_a_tap() {
        let map = InputMap::default();
        for raw in [
            RawInput::Key(KeyCode::Char(' ')),
            RawInput::Key(KeyCode::Up),
            RawInput::Key(KeyCode::Char('x')),
            RawInput::Key(KeyCode::Char('X')),
            RawInput::PointerPress,
            RawInput::TouchStart,
        ] {
            assert_eq!(map.translate(raw), Some(Command::Tap), "{raw:?}");
        }
    }

    #[test]
    fn control_keys() {
        let map = InputMap::default();
        assert_eq!(map.translate(RawInput::Key(KeyCode::Char('r'))), Some(Command::Restart));
        assert_eq!(map.translate(RawInput::Key(KeyCode::Char('c'))), Some(Command::CloseModal));
        assert_eq!(map.translate(RawInput::Key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(map.translate(RawInput::Key(KeyCode::Char('k'))), None);
    }

    #[test]
    fn only_presses_count() {
        let map = InputMap::default();
        assert_eq!(
            map.command_for(&key(KeyCode::Char(' '), KeyEventKind::Press)),
            Some(Command::Tap)
        );
        assert_eq!(map.command_for(&key(KeyCode::Char(' '), KeyEventKind::Release)), None);
        assert_eq!(
            map.command_for(&mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Command::Tap)
        );
        assert_eq!(map.command_for(&mouse(MouseEventKind::Up(MouseButton::Left))), None);
        assert_eq!(map.command_for(&mouse(MouseEventKind::Down(MouseButton::Right))), None);
        assert_eq!(map.command_for(&Event::Resize(80, 24)), None);
    }
}
