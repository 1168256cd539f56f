//! # PropSync Codec
//!
//! Buffer-bounded CBOR primitives for PropSync.
//!
//! Devices encode into fixed buffers and decode messages from an untrusted
//! remote side, so this crate provides:
//! - [`CborWriter`]: writes into a caller-owned `&mut [u8]`; an item that does
//!   not fit fails with [`CodecError::OutOfMemory`] and writes nothing
//! - [`CborReader`]: a pull reader that accepts definite and indefinite
//!   containers, bounds text lengths and skips unknown items without recursion
//!
//! ## Usage
//!
//! ```
//! use propsync_codec::{CborReader, CborWriter};
//!
//! let mut buf = [0u8; 16];
//! let mut writer = CborWriter::new(&mut buf);
//! writer.begin_indefinite_array().unwrap();
//! writer.write_int(-7).unwrap();
//! writer.end_indefinite().unwrap();
//! assert_eq!(writer.as_bytes(), &[0x9f, 0x26, 0xff]);
//!
//! let mut reader = CborReader::new(&[0x26]);
//! assert_eq!(reader.read_number().unwrap(), -7.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod reader;
mod writer;

pub use error::{CodecError, CodecResult};
pub use reader::{half_to_f64, CborReader, Length, MAX_SKIP_DEPTH};
pub use writer::CborWriter;

/// The break byte closing an indefinite-length container.
pub const BREAK: u8 = 0xff;

/// CBOR major types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorType {
    /// Major type 0.
    Unsigned,
    /// Major type 1.
    Negative,
    /// Major type 2.
    Bytes,
    /// Major type 3.
    Text,
    /// Major type 4.
    Array,
    /// Major type 5.
    Map,
    /// Major type 6.
    Tag,
    /// Major type 7: floats, booleans, null and break.
    Simple,
}

impl MajorType {
    /// Decode the major type from an initial byte.
    pub fn from_initial_byte(byte: u8) -> Self {
        match byte >> 5 {
            0 => Self::Unsigned,
            1 => Self::Negative,
            2 => Self::Bytes,
            3 => Self::Text,
            4 => Self::Array,
            5 => Self::Map,
            6 => Self::Tag,
            _ => Self::Simple,
        }
    }

    /// Build an initial byte from this major type and additional info.
    pub fn initial_byte(self, info: u8) -> u8 {
        let code = match self {
            Self::Unsigned => 0,
            Self::Negative => 1,
            Self::Bytes => 2,
            Self::Text => 3,
            Self::Array => 4,
            Self::Map => 5,
            Self::Tag => 6,
            Self::Simple => 7,
        };
        (code << 5) | (info & 0x1f)
    }

    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::Negative => "negative",
            Self::Bytes => "bytes",
            Self::Text => "text",
            Self::Array => "array",
            Self::Map => "map",
            Self::Tag => "tag",
            Self::Simple => "simple",
        }
    }

    /// Returns true for major types 0 and 1.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Unsigned | Self::Negative)
    }
}
