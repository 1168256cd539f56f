//! Error types for PropSync core.

use propsync_codec::CodecError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the property model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A value of one kind was assigned to a property of another.
    #[error("property {name} holds {expected}, got {found}")]
    KindMismatch {
        /// Property name.
        name: String,
        /// Kind the property was registered with.
        expected: &'static str,
        /// Kind of the rejected value.
        found: &'static str,
    },
}

/// Errors from appending one property to an outbound message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Not even the first record of the property fit in the buffer.
    #[error("property does not fit in the remaining buffer")]
    OutOfMemory,

    /// Some but not all records of a composite property fit.
    #[error("composite property split across the buffer boundary")]
    SplitItems,

    /// Any other codec failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
