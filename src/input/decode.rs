use std::io::{self, Read};

use super::{InputError, Keystroke};

const ESC: u8 = 0x1b;
const CONSOLE_PREFIX: u8 = 0x00;
/// Upper bound for parameters of a single CSI sequence. Anything longer is cut off.
const MAX_SEQUENCE_LEN: usize = 32;

/// Turns a byte stream into [Keystroke]s. A keystroke is only produced once all of its bytes were
/// read, so callers never see half of an escape sequence or of a UTF-8 character.
///
/// `\r`, `\n` and `\r\n` each count as a single Enter.
pub struct KeyDecoder<R> {
    reader: R,
    after_carriage_return: bool,
}

impl<R: Read> KeyDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            after_carriage_return: false,
        }
    }

    pub fn next_key(&mut self) -> Result<Keystroke, InputError> {
        let mut byte = self.required_byte()?;
        if byte == b'\n' && self.after_carriage_return {
            byte = self.required_byte()?;
        }
        self.after_carriage_return = byte == b'\r';

        match byte {
            b'\r' | b'\n' => Ok(Keystroke::Enter),
            0x7f | 0x08 => Ok(Keystroke::Backspace),
            0x03 => Err(InputError::Interrupted),
            0x04 => Err(InputError::EndOfInput),
            ESC => self.escape_sequence(),
            CONSOLE_PREFIX => {
                // Console scan codes come as a zero byte followed by the key code.
                let code = self.required_byte()?;
                Ok(Keystroke::Escape([CONSOLE_PREFIX, code].escape_ascii().to_string()))
            }
            b if b.is_ascii() => {
                let ch = char::from(b);
                if ch.is_ascii_control() && !ch.is_whitespace() {
                    Ok(Keystroke::Control(b))
                } else {
                    Ok(Keystroke::Char(ch))
                }
            }
            lead => self.multi_byte(lead),
        }
    }

    fn escape_sequence(&mut self) -> Result<Keystroke, InputError> {
        let kind = self.required_byte()?;
        let mut sequence = vec![kind];
        match kind {
            b'[' => loop {
                let byte = self.required_byte()?;
                sequence.push(byte);
                if (0x40..=0x7e).contains(&byte) || sequence.len() >= MAX_SEQUENCE_LEN {
                    break;
                }
            },
            b'O' => sequence.push(self.required_byte()?),
            _ => {}
        }
        Ok(Keystroke::Escape(sequence.escape_ascii().to_string()))
    }

    fn multi_byte(&mut self, lead: u8) -> Result<Keystroke, InputError> {
        let len = match lead {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Ok(Keystroke::Invalid(vec![lead])),
        };
        let mut bytes = vec![lead];
        for _ in 1..len {
            bytes.push(self.required_byte()?);
        }
        match std::str::from_utf8(&bytes).ok().and_then(|s| s.chars().next()) {
            Some(ch) => Ok(Keystroke::Char(ch)),
            None => Ok(Keystroke::Invalid(bytes)),
        }
    }

    fn required_byte(&mut self) -> Result<u8, InputError> {
        self.next_byte()?.ok_or(InputError::EndOfInput)
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buffer = [0u8; 1];
        loop {
            match self.reader.read(&mut buffer) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buffer[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
