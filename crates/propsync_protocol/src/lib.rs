//! # PropSync Protocol
//!
//! SenML-over-CBOR framing for PropSync.
//!
//! This crate provides:
//! - [`MessageEncoder`]: fills a fixed buffer with the properties that are
//!   due and resumes where it stopped on the next call
//! - [`MessageDecoder`]: parses a received message and applies it to the
//!   container one property at a time
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use propsync_core::{ManualClock, Permission, PropertyContainer, Value};
//! use propsync_protocol::{MessageDecoder, MessageEncoder};
//!
//! let mut device = PropertyContainer::new(Arc::new(ManualClock::new(0, 0)));
//! device.add("test", Permission::ReadWrite, true);
//!
//! let mut buf = [0u8; 64];
//! let n = MessageEncoder::new().encode(&mut device, &mut buf);
//! assert_eq!(&buf[..n], &[0x9f, 0xa2, 0x00, 0x64, b't', b'e', b's', b't', 0x04, 0xf5, 0xff]);
//!
//! // [{0: "test", 4: false}]
//! let msg = [0x81, 0xa2, 0x00, 0x64, b't', b'e', b's', b't', 0x04, 0xf4];
//! MessageDecoder::new().decode(&mut device, &msg, false).unwrap();
//! assert_eq!(device.get("test").unwrap().value(), &Value::Bool(false));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod decoder;
mod encoder;
mod error;

pub use config::{DecoderConfig, EncoderConfig, DEFAULT_MAX_STRING_LEN};
pub use decoder::MessageDecoder;
pub use encoder::MessageEncoder;
pub use error::{DecodeError, DecodeResult};
pub use propsync_core::SenmlKey;
