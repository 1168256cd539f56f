//! Error types for message decoding.

use propsync_codec::CodecError;
use thiserror::Error;

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons a received message was rejected.
///
/// Groups applied before the error was detected stay applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not valid CBOR, is truncated or exceeds a limit.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The top-level item is not an array.
    #[error("message is not an array")]
    NotAnArray,

    /// An array element is not a map.
    #[error("record is not a map")]
    NotAMap,

    /// A map key is not an integer.
    #[error("record key is not an integer")]
    NonIntegerKey,

    /// A known key carries a value of the wrong type.
    #[error("malformed value for key {key}")]
    MalformedField {
        /// The SenML key.
        key: i64,
    },
}
