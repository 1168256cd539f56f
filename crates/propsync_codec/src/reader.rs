//! Pull-style CBOR reader.

use crate::error::{CodecError, CodecResult};
use crate::{MajorType, BREAK};

/// Maximum container nesting accepted by [`CborReader::skip_value`].
pub const MAX_SKIP_DEPTH: usize = 16;

/// A pull reader over untrusted CBOR bytes.
///
/// Unlike a tree decoder, the reader hands out one item at a time so the
/// caller can drive its own state machine. Definite and indefinite-length
/// arrays and maps are accepted; integer arguments need not be shortest form.
pub struct CborReader<'a> {
    data: &'a [u8],
    pos: usize,
}

/// Length of a container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Definite number of items (pairs for maps).
    Definite(u64),
    /// Terminated by a break byte.
    Indefinite,
}

enum Frame {
    Items(u64),
    Indefinite,
}

impl<'a> CborReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Major type of the next item, without consuming it.
    pub fn peek_type(&self) -> CodecResult<MajorType> {
        Ok(MajorType::from_initial_byte(self.peek_byte()?))
    }

    /// Returns true if the next byte is a break.
    pub fn at_break(&self) -> CodecResult<bool> {
        Ok(self.peek_byte()? == BREAK)
    }

    /// Consume a break byte.
    pub fn read_break(&mut self) -> CodecResult<()> {
        match self.read_byte()? {
            BREAK => Ok(()),
            other => Err(CodecError::unexpected_type(
                "break",
                MajorType::from_initial_byte(other).name(),
            )),
        }
    }

    /// Read an array header.
    pub fn read_array_start(&mut self) -> CodecResult<Length> {
        self.read_container_start(MajorType::Array)
    }

    /// Read a map header.
    pub fn read_map_start(&mut self) -> CodecResult<Length> {
        self.read_container_start(MajorType::Map)
    }

    /// Read an unsigned integer.
    pub fn read_unsigned(&mut self) -> CodecResult<u64> {
        let (major, info) = self.read_initial()?;
        if major != MajorType::Unsigned {
            return Err(CodecError::unexpected_type("unsigned", major.name()));
        }
        self.read_argument(info)
    }

    /// Read a signed or unsigned integer.
    pub fn read_int(&mut self) -> CodecResult<i64> {
        let (major, info) = self.read_initial()?;
        match major {
            MajorType::Unsigned => {
                i64::try_from(self.read_argument(info)?).map_err(|_| CodecError::IntegerOverflow)
            }
            MajorType::Negative => {
                let n = self.read_argument(info)?;
                let n = i64::try_from(n).map_err(|_| CodecError::IntegerOverflow)?;
                Ok(-1 - n)
            }
            other => Err(CodecError::unexpected_type("integer", other.name())),
        }
    }

    /// Read any numeric item as `f64`.
    ///
    /// Accepts unsigned and negative integers plus half, single and
    /// double precision floats.
    #[allow(clippy::cast_precision_loss)]
    pub fn read_number(&mut self) -> CodecResult<f64> {
        let (major, info) = self.read_initial()?;
        match (major, info) {
            (MajorType::Unsigned, _) => Ok(self.read_argument(info)? as f64),
            (MajorType::Negative, _) => Ok(-1.0 - self.read_argument(info)? as f64),
            (MajorType::Simple, 25) => {
                let b = self.read_bytes(2)?;
                Ok(half_to_f64(u16::from_be_bytes([b[0], b[1]])))
            }
            (MajorType::Simple, 26) => {
                let b = self.read_bytes(4)?;
                Ok(f64::from(f32::from_bits(u32::from_be_bytes([
                    b[0], b[1], b[2], b[3],
                ]))))
            }
            (MajorType::Simple, 27) => {
                let b = self.read_bytes(8)?;
                Ok(f64::from_bits(u64::from_be_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ])))
            }
            (other, _) => Err(CodecError::unexpected_type("number", other.name())),
        }
    }

    /// Read a boolean.
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        match self.read_byte()? {
            0xf4 => Ok(false),
            0xf5 => Ok(true),
            other => Err(CodecError::unexpected_type(
                "bool",
                MajorType::from_initial_byte(other).name(),
            )),
        }
    }

    /// Read a definite-length text string of at most `max_len` bytes.
    ///
    /// The declared length is checked before anything is allocated.
    pub fn read_text(&mut self, max_len: usize) -> CodecResult<String> {
        let (major, info) = self.read_initial()?;
        if major != MajorType::Text {
            return Err(CodecError::unexpected_type("text", major.name()));
        }
        if info == 31 {
            return Err(CodecError::IndefiniteLength);
        }
        let claimed = self.read_argument(info)?;
        if claimed > max_len as u64 {
            return Err(CodecError::SizeLimitExceeded {
                claimed,
                max_allowed: max_len as u64,
            });
        }
        let bytes = self.read_bytes(to_usize(claimed)?)?;
        let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
        Ok(text.to_string())
    }

    /// Skip the next complete item, including nested containers.
    pub fn skip_value(&mut self) -> CodecResult<()> {
        let mut frames: Vec<Frame> = Vec::new();
        loop {
            let (major, info) = self.read_initial()?;
            match major {
                MajorType::Unsigned | MajorType::Negative => {
                    self.read_argument(info)?;
                }
                MajorType::Bytes | MajorType::Text if info == 31 => {
                    push_frame(&mut frames, Frame::Indefinite)?;
                    continue;
                }
                MajorType::Bytes | MajorType::Text => {
                    let len = self.read_argument(info)?;
                    self.read_bytes(to_usize(len)?)?;
                }
                MajorType::Array | MajorType::Map if info == 31 => {
                    push_frame(&mut frames, Frame::Indefinite)?;
                    continue;
                }
                MajorType::Array | MajorType::Map => {
                    let len = self.read_argument(info)?;
                    let items = if major == MajorType::Map {
                        len.checked_mul(2).ok_or(CodecError::IntegerOverflow)?
                    } else {
                        len
                    };
                    if items > 0 {
                        push_frame(&mut frames, Frame::Items(items))?;
                        continue;
                    }
                }
                MajorType::Tag => {
                    // The tagged item follows.
                    self.read_argument(info)?;
                    continue;
                }
                MajorType::Simple => match info {
                    0..=23 => {}
                    24 => {
                        self.read_bytes(1)?;
                    }
                    25 => {
                        self.read_bytes(2)?;
                    }
                    26 => {
                        self.read_bytes(4)?;
                    }
                    27 => {
                        self.read_bytes(8)?;
                    }
                    31 => match frames.pop() {
                        Some(Frame::Indefinite) => {}
                        _ => return Err(CodecError::invalid_structure("unexpected break")),
                    },
                    _ => return Err(CodecError::invalid_structure("reserved additional info")),
                },
            }

            // One item finished; close every container it completes.
            loop {
                match frames.last_mut() {
                    None => return Ok(()),
                    Some(Frame::Indefinite) => break,
                    Some(Frame::Items(n)) => {
                        *n -= 1;
                        if *n > 0 {
                            break;
                        }
                        frames.pop();
                    }
                }
            }
        }
    }

    fn read_container_start(&mut self, expected: MajorType) -> CodecResult<Length> {
        let (major, info) = self.read_initial()?;
        if major != expected {
            return Err(CodecError::unexpected_type(expected.name(), major.name()));
        }
        if info == 31 {
            return Ok(Length::Indefinite);
        }
        Ok(Length::Definite(self.read_argument(info)?))
    }

    fn read_initial(&mut self) -> CodecResult<(MajorType, u8)> {
        let byte = self.read_byte()?;
        Ok((MajorType::from_initial_byte(byte), byte & 0x1f))
    }

    fn read_argument(&mut self, info: u8) -> CodecResult<u64> {
        match info {
            0..=23 => Ok(u64::from(info)),
            24 => Ok(u64::from(self.read_byte()?)),
            25 => {
                let b = self.read_bytes(2)?;
                Ok(u64::from(u16::from_be_bytes([b[0], b[1]])))
            }
            26 => {
                let b = self.read_bytes(4)?;
                Ok(u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]])))
            }
            27 => {
                let b = self.read_bytes(8)?;
                Ok(u64::from_be_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ]))
            }
            31 => Err(CodecError::IndefiniteLength),
            _ => Err(CodecError::invalid_structure("reserved additional info")),
        }
    }

    fn peek_byte(&self) -> CodecResult<u8> {
        self.data.get(self.pos).copied().ok_or(CodecError::UnexpectedEof)
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(CodecError::UnexpectedEof)?;
        if end > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

fn push_frame(frames: &mut Vec<Frame>, frame: Frame) -> CodecResult<()> {
    if frames.len() >= MAX_SKIP_DEPTH {
        return Err(CodecError::NestingTooDeep);
    }
    frames.push(frame);
    Ok(())
}

fn to_usize(len: u64) -> CodecResult<usize> {
    usize::try_from(len).map_err(|_| CodecError::IntegerOverflow)
}

/// Convert an IEEE 754 half-precision bit pattern to `f64`.
///
/// Follows RFC 7049 Appendix D: subnormals, infinities and NaN included.
pub fn half_to_f64(half: u16) -> f64 {
    let exp = i32::from((half >> 10) & 0x1f);
    let mant = f64::from(half & 0x3ff);
    let val = match exp {
        0 => mant * 2f64.powi(-24),
        31 if mant == 0.0 => f64::INFINITY,
        31 => f64::NAN,
        _ => (mant + 1024.0) * 2f64.powi(exp - 25),
    };
    if half & 0x8000 != 0 {
        -val
    } else {
        val
    }
}
