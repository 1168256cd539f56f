//! Buffer-bounded CBOR writer.

use crate::error::{CodecError, CodecResult};
use crate::{MajorType, BREAK};

/// A CBOR writer over a caller-owned byte buffer.
///
/// Every `write_*` call either writes its whole item or fails with
/// [`CodecError::OutOfMemory`] and leaves the buffer untouched. Callers that
/// need to discard a group of items use [`position`](Self::position) and
/// [`truncate`](Self::truncate).
pub struct CborWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> CborWriter<'a> {
    /// Create a writer that fills `buf` from the start.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total size of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Discard everything written after `pos`.
    pub fn truncate(&mut self, pos: usize) {
        if pos < self.pos {
            self.pos = pos;
        }
    }

    /// Discard everything written.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Open an indefinite-length array (`0x9F`).
    pub fn begin_indefinite_array(&mut self) -> CodecResult<()> {
        self.put(&[MajorType::Array.initial_byte(31)])
    }

    /// Close the innermost indefinite-length container (`0xFF`).
    pub fn end_indefinite(&mut self) -> CodecResult<()> {
        self.put(&[BREAK])
    }

    /// Open a definite-length array with `len` items.
    pub fn begin_array(&mut self, len: u64) -> CodecResult<()> {
        self.write_head(MajorType::Array, len)
    }

    /// Open a definite-length map with `len` pairs.
    pub fn begin_map(&mut self, len: u64) -> CodecResult<()> {
        self.write_head(MajorType::Map, len)
    }

    /// Write an unsigned integer.
    pub fn write_unsigned(&mut self, value: u64) -> CodecResult<()> {
        self.write_head(MajorType::Unsigned, value)
    }

    /// Write a signed integer, choosing the major type by sign.
    #[allow(clippy::cast_sign_loss)]
    pub fn write_int(&mut self, value: i64) -> CodecResult<()> {
        if value >= 0 {
            self.write_head(MajorType::Unsigned, value as u64)
        } else {
            // -1 encodes as 0, -2 as 1, ...
            self.write_head(MajorType::Negative, (-(value + 1)) as u64)
        }
    }

    /// Write a boolean simple value.
    pub fn write_bool(&mut self, value: bool) -> CodecResult<()> {
        self.put(&[if value { 0xf5 } else { 0xf4 }])
    }

    /// Write a single-precision float (`0xFA`).
    pub fn write_f32(&mut self, value: f32) -> CodecResult<()> {
        let bits = value.to_bits().to_be_bytes();
        self.put(&[0xfa, bits[0], bits[1], bits[2], bits[3]])
    }

    /// Write a double-precision float (`0xFB`).
    pub fn write_f64(&mut self, value: f64) -> CodecResult<()> {
        let mut item = [0u8; 9];
        item[0] = 0xfb;
        item[1..].copy_from_slice(&value.to_bits().to_be_bytes());
        self.put(&item)
    }

    /// Write a UTF-8 text string.
    pub fn write_text(&mut self, text: &str) -> CodecResult<()> {
        let (head, head_len) = encode_head(MajorType::Text, text.len() as u64);
        self.ensure(head_len + text.len())?;
        self.put(&head[..head_len])?;
        self.put(text.as_bytes())
    }

    fn write_head(&mut self, major: MajorType, value: u64) -> CodecResult<()> {
        let (head, len) = encode_head(major, value);
        self.put(&head[..len])
    }

    fn ensure(&self, needed: usize) -> CodecResult<()> {
        let available = self.remaining();
        if needed > available {
            return Err(CodecError::OutOfMemory { needed, available });
        }
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.ensure(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}

/// Shortest-form head for `major` with argument `value`.
#[allow(clippy::cast_possible_truncation)]
fn encode_head(major: MajorType, value: u64) -> ([u8; 9], usize) {
    let mut head = [0u8; 9];
    if value < 24 {
        head[0] = major.initial_byte(value as u8);
        (head, 1)
    } else if u8::try_from(value).is_ok() {
        head[0] = major.initial_byte(24);
        head[1] = value as u8;
        (head, 2)
    } else if u16::try_from(value).is_ok() {
        head[0] = major.initial_byte(25);
        head[1..3].copy_from_slice(&(value as u16).to_be_bytes());
        (head, 3)
    } else if u32::try_from(value).is_ok() {
        head[0] = major.initial_byte(26);
        head[1..5].copy_from_slice(&(value as u32).to_be_bytes());
        (head, 5)
    } else {
        head[0] = major.initial_byte(27);
        head[1..9].copy_from_slice(&value.to_be_bytes());
        (head, 9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut CborWriter<'_>)) -> Vec<u8> {
        let mut buf = [0u8; 64];
        let mut w = CborWriter::new(&mut buf);
        f(&mut w);
        w.as_bytes().to_vec()
    }

    #[test]
    fn encode_small_unsigned() {
        assert_eq!(written(|w| w.write_unsigned(0).unwrap()), vec![0x00]);
        assert_eq!(written(|w| w.write_unsigned(23).unwrap()), vec![0x17]);
        assert_eq!(written(|w| w.write_unsigned(24).unwrap()), vec![0x18, 24]);
        assert_eq!(written(|w| w.write_unsigned(123).unwrap()), vec![0x18, 0x7b]);
    }

    #[test]
    fn encode_wide_unsigned() {
        assert_eq!(
            written(|w| w.write_unsigned(256).unwrap()),
            vec![0x19, 0x01, 0x00]
        );
        assert_eq!(
            written(|w| w.write_unsigned(65536).unwrap()),
            vec![0x1a, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            written(|w| w.write_unsigned(u64::from(u32::MAX) + 1).unwrap()),
            vec![0x1b, 0, 0, 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn encode_negative_integers() {
        assert_eq!(written(|w| w.write_int(-1).unwrap()), vec![0x20]);
        assert_eq!(written(|w| w.write_int(-7).unwrap()), vec![0x26]);
        assert_eq!(written(|w| w.write_int(-100).unwrap()), vec![0x38, 0x63]);
        assert_eq!(
            written(|w| w.write_int(i64::MIN).unwrap()),
            vec![0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn encode_float_single_precision() {
        assert_eq!(
            written(|w| w.write_f32(3.14159).unwrap()),
            vec![0xfa, 0x40, 0x49, 0x0f, 0xd0]
        );
        assert_eq!(
            written(|w| w.write_f32(2.0).unwrap()),
            vec![0xfa, 0x40, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn encode_text_and_bool() {
        assert_eq!(
            written(|w| w.write_text("test").unwrap()),
            vec![0x64, 0x74, 0x65, 0x73, 0x74]
        );
        assert_eq!(written(|w| w.write_bool(true).unwrap()), vec![0xf5]);
        assert_eq!(written(|w| w.write_bool(false).unwrap()), vec![0xf4]);
    }

    #[test]
    fn encode_indefinite_array_of_map() {
        let bytes = written(|w| {
            w.begin_indefinite_array().unwrap();
            w.begin_map(2).unwrap();
            w.write_unsigned(0).unwrap();
            w.write_text("test").unwrap();
            w.write_unsigned(4).unwrap();
            w.write_bool(true).unwrap();
            w.end_indefinite().unwrap();
        });
        assert_eq!(
            bytes,
            vec![0x9f, 0xa2, 0x00, 0x64, 0x74, 0x65, 0x73, 0x74, 0x04, 0xf5, 0xff]
        );
    }

    #[test]
    fn out_of_memory_leaves_buffer_untouched() {
        let mut buf = [0u8; 4];
        let mut w = CborWriter::new(&mut buf);
        w.write_unsigned(1).unwrap();

        let err = w.write_text("long").unwrap_err();
        assert_eq!(
            err,
            CodecError::OutOfMemory {
                needed: 5,
                available: 3
            }
        );
        assert_eq!(w.position(), 1);

        let err = w.write_f32(1.0).unwrap_err();
        assert!(err.is_out_of_memory());
        assert_eq!(w.as_bytes(), &[0x01]);
    }

    #[test]
    fn truncate_rolls_back() {
        let mut buf = [0u8; 16];
        let mut w = CborWriter::new(&mut buf);
        w.begin_indefinite_array().unwrap();
        let mark = w.position();
        w.write_text("abc").unwrap();
        w.truncate(mark);
        assert_eq!(w.as_bytes(), &[0x9f]);
        assert_eq!(w.remaining(), 15);

        // Truncating forward is a no-op.
        w.truncate(10);
        assert_eq!(w.position(), 1);
    }

    #[test]
    fn output_parses_as_cbor() {
        let bytes = written(|w| {
            w.begin_indefinite_array().unwrap();
            w.begin_map(2).unwrap();
            w.write_unsigned(0).unwrap();
            w.write_text("t").unwrap();
            w.write_unsigned(2).unwrap();
            w.write_f64(123.456).unwrap();
            w.end_indefinite().unwrap();
        });
        let value: ciborium::value::Value = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        let map = array[0].as_map().unwrap();
        assert_eq!(map[1].1.as_float(), Some(123.456));
    }
}
