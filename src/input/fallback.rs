use std::io::Read;

use tracing::trace;

use super::{decode::KeyDecoder, CharacterSource, InputError, Keystroke};

/// Reads keystrokes from any byte stream without touching terminal settings. Used when standard
/// input isn't a terminal that supports raw mode.
pub struct FallbackReader<R> {
    decoder: KeyDecoder<R>,
}

impl<R: Read> FallbackReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            decoder: KeyDecoder::new(reader),
        }
    }
}

impl<R: Read + Send> CharacterSource for FallbackReader<R> {
    fn read_char(&mut self) -> Result<Keystroke, InputError> {
        let key = self.decoder.next_key();
        trace!("Fallback reader produced {key:?}");
        key
    }
}
