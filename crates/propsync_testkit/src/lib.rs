//! # PropSync Testkit
//!
//! Test utilities for PropSync.
//!
//! This crate provides:
//! - A simulated device with a manual clock
//! - Property-based test generators using proptest
//! - Wire vectors shared with other implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use propsync_testkit::prelude::*;
//!
//! #[test]
//! fn vector_encodes() {
//!     for vector in all_vectors() {
//!         let mut device = TestDevice::sending(&vector);
//!         assert_eq!(hex_encode(&device.encode(256)), hex_encode(&hex_decode(&vector.message_hex)));
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
