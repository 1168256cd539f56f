//! Encoder and decoder configuration.

use serde::{Deserialize, Serialize};

/// Default upper bound on decoded string lengths, in bytes.
pub const DEFAULT_MAX_STRING_LEN: usize = 256;

/// Configuration for [`MessageEncoder`](crate::MessageEncoder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Emit integer identifiers instead of names.
    pub use_identifier: bool,

    /// Upper bound on properties per message (`None` = as many as fit).
    pub max_properties_per_message: Option<usize>,
}

impl EncoderConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether light payloads are produced.
    #[must_use]
    pub const fn use_identifier(mut self, value: bool) -> Self {
        self.use_identifier = value;
        self
    }

    /// Sets the per-message property limit.
    #[must_use]
    pub const fn max_properties_per_message(mut self, limit: usize) -> Self {
        self.max_properties_per_message = Some(limit);
        self
    }
}

/// Configuration for [`MessageDecoder`](crate::MessageDecoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Longest text string accepted, in bytes.
    pub max_string_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl DecoderConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the longest accepted text string.
    #[must_use]
    pub const fn max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }
}
