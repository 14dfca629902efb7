//! Contains logic for reading single keystrokes from the terminal.
//! [InputBackend] is the main artifact of this module: it is probed once at startup and then
//! opens a [CharacterSource] for every interactive mode.

pub mod decode;
pub mod fallback;
pub mod raw;

use std::io::IsTerminal;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

/// One logical key press. Escape sequences and multi-byte characters are already fully consumed
/// when a keystroke is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Enter,
    Backspace,
    /// A complete escape sequence or named key, e.g. an arrow key. Carries a printable form of it
    /// for diagnostics.
    Escape(String),
    /// A control byte with no meaning for the tracker.
    Control(u8),
    /// Bytes that don't form valid UTF-8.
    Invalid(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("interrupt received")]
    Interrupted,
    #[error("end of input")]
    EndOfInput,
    #[error("failed to read from terminal: {0}")]
    Io(#[from] std::io::Error),
}

/// Intended to serve as a contract every keystroke reader must implement.
#[cfg_attr(test, mockall::automock)]
pub trait CharacterSource: Send {
    /// Blocks until exactly one keystroke is available.
    fn read_char(&mut self) -> Result<Keystroke, InputError>;
}

/// Available ways to read keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBackend {
    /// Standard input is a terminal, it is switched to raw mode (termios on unix, the console
    /// mode on windows).
    PosixRawTerminal,
    /// Anything else: keystrokes are decoded straight from the byte stream.
    FallbackBufferedReader,
}

impl InputBackend {
    pub fn detect() -> Self {
        if std::io::stdin().is_terminal() {
            debug!("Standard input is a terminal, using raw mode");
            InputBackend::PosixRawTerminal
        } else {
            debug!("Standard input isn't a terminal, using the fallback reader");
            InputBackend::FallbackBufferedReader
        }
    }

    /// Takes over standard input. The previous terminal configuration is restored when the
    /// returned source is dropped.
    pub fn open_raw_mode(self) -> Result<Box<dyn CharacterSource>> {
        match self {
            InputBackend::PosixRawTerminal => Ok(Box::new(raw::RawTerminal::open()?)),
            InputBackend::FallbackBufferedReader => {
                Ok(Box::new(fallback::FallbackReader::new(std::io::stdin())))
            }
        }
    }
}
