//! # PropSync Core
//!
//! Property model for devices that mirror local state to a remote side.
//!
//! This crate provides:
//! - [`Property`]: a named value with a local copy, a shadow of the last
//!   exchanged value and the send policy deciding when it goes out
//! - [`Value`] and the [`CloudValue`] trait: scalar and composite value kinds
//! - [`PropertyContainer`]: the ordered registry the encoder and decoder work on
//! - [`SyncPolicy`]: conflict resolution for the initial value fetch
//! - [`MapData`]: one decoded SenML record
//!
//! Wire framing lives in `propsync_protocol`.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use propsync_core::{ManualClock, Permission, PropertyContainer, SyncPolicy, Value};
//!
//! let clock = Arc::new(ManualClock::new(0, 1_700_000_000));
//! let mut container = PropertyContainer::new(clock);
//! container
//!     .add("temperature", Permission::Read, 21.5f32)
//!     .publish_on_change(0.5);
//! container
//!     .add("switch", Permission::ReadWrite, false)
//!     .sync_policy(SyncPolicy::CloudWins);
//!
//! let temperature = container.get_mut("temperature").unwrap();
//! temperature.set_value(22.5f32).unwrap();
//! assert_eq!(temperature.value(), &Value::Float(22.5));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

mod clock;
mod config;
mod container;
mod error;
mod policy;
mod property;
mod record;
pub mod types;
mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ContainerConfig;
pub use container::{PropertyContainer, MAX_LIGHT_IDENTIFIER};
pub use error::{CoreError, CoreResult, EncodeError};
pub use policy::SyncPolicy;
pub use property::{
    light_identifier, Permission, Property, PropertyCallback, UpdatePolicy, WritePolicy,
    DEFAULT_MIN_INTERVAL_MS,
};
pub use record::{MapData, SenmlKey};
pub use types::{
    Color, ColoredLight, DimmedLight, InputValue, Location, PlaybackCommand, Schedule,
    ScheduleType, ScheduleUnit, Television,
};
pub use value::{float_differs, Attribute, CloudValue, Value};
