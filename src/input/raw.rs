use std::io;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tracing::{debug, error, trace};

use super::{CharacterSource, InputError, Keystroke};

/// Holds the terminal in raw mode for as long as it lives: no line buffering, no echo and ^C
/// arrives as a key instead of a signal. The mode that was active before is restored on drop,
/// which also covers errors and panics in the input loop.
pub struct RawTerminal {
    _private: (),
}

impl RawTerminal {
    pub fn open() -> io::Result<Self> {
        debug!("Switching terminal to raw mode");
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl CharacterSource for RawTerminal {
    fn read_char(&mut self) -> Result<Keystroke, InputError> {
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(keystroke) = translate(key)? {
                        return Ok(keystroke);
                    }
                }
                other => trace!("Skipping terminal event {other:?}"),
            }
        }
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        match disable_raw_mode() {
            Ok(()) => debug!("Old settings have been restored"),
            Err(e) => error!("Failed to restore terminal settings {e:?}"),
        }
    }
}

/// Maps a key event onto a [Keystroke]. Releases and repeats reported by some consoles are
/// skipped, so only presses produce keystrokes.
pub fn translate(key: KeyEvent) -> Result<Option<Keystroke>, InputError> {
    if key.kind != KeyEventKind::Press {
        return Ok(None);
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let keystroke = match key.code {
        KeyCode::Char('c') if control => return Err(InputError::Interrupted),
        KeyCode::Char('d') if control => return Err(InputError::EndOfInput),
        KeyCode::Char(ch) if control && ch.is_ascii_alphabetic() => {
            Keystroke::Control(ch.to_ascii_lowercase() as u8 - b'a' + 1)
        }
        KeyCode::Char(ch) => Keystroke::Char(ch),
        KeyCode::Tab => Keystroke::Char('\t'),
        KeyCode::Enter => Keystroke::Enter,
        KeyCode::Backspace => Keystroke::Backspace,
        KeyCode::Null => Keystroke::Control(0),
        other => Keystroke::Escape(format!("{other:?}")),
    };
    Ok(Some(keystroke))
}
