//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The output buffer cannot hold the next item.
    #[error("out of memory: needed {needed} bytes, {available} available")]
    OutOfMemory {
        /// Bytes required by the rejected item.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The next item has a different CBOR type than requested.
    #[error("unexpected CBOR type: expected {expected}, found {found}")]
    UnexpectedType {
        /// The type the caller asked for.
        expected: String,
        /// The type present in the input.
        found: String,
    },

    /// Indefinite-length item where only definite length is supported.
    #[error("indefinite-length item not supported here")]
    IndefiniteLength,

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Declared size exceeds the configured limit.
    #[error("size limit exceeded: claimed {claimed}, max allowed {max_allowed}")]
    SizeLimitExceeded {
        /// The size declared by the input.
        claimed: u64,
        /// The limit in force.
        max_allowed: u64,
    },

    /// Integer overflow during decoding.
    #[error("integer overflow")]
    IntegerOverflow,

    /// Nested containers exceed the skip depth.
    #[error("nesting too deep")]
    NestingTooDeep,

    /// Invalid CBOR structure.
    #[error("invalid CBOR structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },
}

impl CodecError {
    /// Create an unexpected type error.
    pub fn unexpected_type(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedType {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Returns true if this error means the output buffer is full.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}
