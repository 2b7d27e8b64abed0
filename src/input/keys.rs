//! Logical key commands and the escape-chord decoder.
//!
//! Raw terminal input collapses into a small closed set of commands; an
//! unrecognized key is [`Command::Other`], never an error. Quitting takes
//! two Escapes in a row, so a stray Escape followed by anything else is
//! absorbed.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Everything a keystroke can mean to the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Step along the current heading.
    Forward,
    /// Step against the current heading.
    Backward,
    /// Rotate counterclockwise by the configured step.
    TurnLeft,
    /// Rotate clockwise by the configured step.
    TurnRight,
    /// Snap 90 degrees counterclockwise.
    SnapLeft,
    /// Snap 90 degrees clockwise.
    SnapRight,
    /// Leave the program.
    Quit,
    /// Any other key; a silent no-op.
    Other,
}

/// Stateful decoder for the Escape-Escape quit chord.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    escape_armed: bool,
}

impl KeyDecoder {
    /// Decodes one key event. `None` means the chord is still open (a
    /// single Escape has been seen and nothing follows it yet).
    pub fn decode(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        // Raw mode delivers Ctrl+C and Ctrl+Z as ordinary key events; they
        // quit no matter what state the chord is in.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('z'))
        {
            self.escape_armed = false;
            return Some(Command::Quit);
        }
        if self.escape_armed {
            self.escape_armed = false;
            return Some(match key.code {
                KeyCode::Esc => Command::Quit,
                _ => Command::Other,
            });
        }
        Some(match key.code {
            KeyCode::Esc => {
                self.escape_armed = true;
                return None;
            }
            KeyCode::Up | KeyCode::Char('w' | 'W') => Command::Forward,
            KeyCode::Down | KeyCode::Char('s' | 'S') => Command::Backward,
            KeyCode::Left | KeyCode::Char('a' | 'A') => Command::TurnLeft,
            KeyCode::Right | KeyCode::Char('d' | 'D') => Command::TurnRight,
            KeyCode::Char(',') => Command::SnapLeft,
            KeyCode::Char('.') => Command::SnapRight,
            _ => Command::Other,
        })
    }
}
