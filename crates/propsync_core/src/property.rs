//! A single synchronized property.

use std::fmt;
use std::sync::Arc;

use propsync_codec::{CborWriter, CodecResult};
use tracing::trace;

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult, EncodeError};
use crate::policy::SyncPolicy;
use crate::record::{MapData, SenmlKey};
use crate::value::{write_key, CloudValue, Value};

/// Default minimum time between two sends of an on-change property.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 500;

/// Callback attached to a property.
pub type PropertyCallback = Box<dyn FnMut(&mut Property)>;

/// What the remote side may do with a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The remote side reads; the device writes.
    Read,
    /// The remote side writes; the device reads.
    Write,
    /// Both directions.
    ReadWrite,
}

impl Permission {
    /// Returns true if the property is sent to the remote side.
    pub fn is_readable_by_cloud(self) -> bool {
        matches!(self, Permission::Read | Permission::ReadWrite)
    }

    /// Returns true if the remote side may change the property.
    pub fn is_writable_by_cloud(self) -> bool {
        matches!(self, Permission::Write | Permission::ReadWrite)
    }
}

/// When a property is sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdatePolicy {
    /// When the value moves by at least `min_delta`, at most once per interval.
    OnChange {
        /// Smallest change worth sending.
        min_delta: f32,
        /// Minimum milliseconds between sends.
        min_interval_ms: u64,
    },
    /// Periodically.
    TimeInterval {
        /// Milliseconds between sends.
        interval_ms: u64,
    },
    /// Only after [`Property::request_update`].
    OnDemand,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        UpdatePolicy::OnChange {
            min_delta: 0.0,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

/// How remote writes reach the local value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Remote writes are copied to the local value and echoed back.
    #[default]
    Auto,
    /// Remote writes only update the shadow; the application pulls them.
    Manual,
}

/// Light-payload identifier for attribute `attribute_index` of `property_id`.
///
/// Both parts are limited to one byte.
pub fn light_identifier(property_id: u32, attribute_index: u32) -> u32 {
    (property_id & 0xff) | ((attribute_index & 0xff) << 8)
}

/// A named value kept in sync with the remote side.
///
/// Each property holds the local value owned by the application and a
/// shadow of the value last exchanged with the remote side. The shadow is
/// only written by [`append`](Self::append) and
/// [`set_attributes_from_cloud`](Self::set_attributes_from_cloud).
pub struct Property {
    name: String,
    identifier: u32,
    permission: Permission,
    update_policy: UpdatePolicy,
    write_policy: WritePolicy,
    local: Value,
    cloud: Value,
    observed: Value,
    on_update: Option<PropertyCallback>,
    on_sync: Option<PropertyCallback>,
    has_been_updated_once: bool,
    pending_retransmit: bool,
    modified_in_update_callback: bool,
    update_requested: bool,
    echo_requested: bool,
    last_local_change: u64,
    last_cloud_change: u64,
    last_sent_at: u64,
    encode_timestamp: bool,
    timestamp: u64,
    clock: Arc<dyn Clock>,
}

impl Property {
    /// Creates a property holding `initial` on both sides.
    pub fn new(
        name: impl Into<String>,
        permission: Permission,
        initial: impl Into<Value>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let initial = initial.into();
        Self {
            name: name.into(),
            identifier: 0,
            permission,
            update_policy: UpdatePolicy::default(),
            write_policy: WritePolicy::default(),
            cloud: initial.clone(),
            observed: initial.clone(),
            local: initial,
            on_update: None,
            on_sync: None,
            has_been_updated_once: false,
            pending_retransmit: false,
            modified_in_update_callback: false,
            update_requested: false,
            echo_requested: false,
            last_local_change: 0,
            last_cloud_change: 0,
            last_sent_at: 0,
            encode_timestamp: false,
            timestamp: 0,
            clock,
        }
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier used in light payloads.
    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    pub(crate) fn set_identifier(&mut self, identifier: u32) {
        self.identifier = identifier;
    }

    /// Access permission.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Returns true if the property is sent to the remote side.
    pub fn is_readable_by_cloud(&self) -> bool {
        self.permission.is_readable_by_cloud()
    }

    /// Returns true if the remote side may change the property.
    pub fn is_writable_by_cloud(&self) -> bool {
        self.permission.is_writable_by_cloud()
    }

    /// Current send policy.
    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    /// Current write policy.
    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    // Configuration

    /// Sets the callback fired when the remote side changes the value.
    pub fn on_update(&mut self, callback: impl FnMut(&mut Property) + 'static) -> &mut Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Sets the callback fired for values received in a sync message.
    pub fn on_sync(&mut self, callback: impl FnMut(&mut Property) + 'static) -> &mut Self {
        self.on_sync = Some(Box::new(callback));
        self
    }

    /// Resolves sync messages with `policy`.
    pub fn sync_policy(&mut self, policy: SyncPolicy) -> &mut Self {
        self.on_sync(move |property| policy.resolve(property))
    }

    /// Sends whenever the value changes by at least `min_delta`.
    pub fn publish_on_change(&mut self, min_delta: f32) -> &mut Self {
        self.publish_on_change_every(min_delta, 0)
    }

    /// Sends when the value changes by `min_delta`, at most every `min_interval_ms`.
    pub fn publish_on_change_every(&mut self, min_delta: f32, min_interval_ms: u64) -> &mut Self {
        self.update_policy = UpdatePolicy::OnChange {
            min_delta,
            min_interval_ms,
        };
        self
    }

    /// Sends every `seconds` seconds.
    pub fn publish_every(&mut self, seconds: u64) -> &mut Self {
        self.update_policy = UpdatePolicy::TimeInterval {
            interval_ms: seconds.saturating_mul(1000),
        };
        self
    }

    /// Sends only on request.
    pub fn publish_on_demand(&mut self) -> &mut Self {
        self.update_policy = UpdatePolicy::OnDemand;
        self
    }

    /// Remote writes are applied to the local value immediately.
    pub fn write_on_change(&mut self) -> &mut Self {
        self.write_policy = WritePolicy::Auto;
        self
    }

    /// Remote writes wait in the shadow until [`from_cloud_to_local`](Self::from_cloud_to_local).
    pub fn write_on_demand(&mut self) -> &mut Self {
        self.write_policy = WritePolicy::Manual;
        self
    }

    /// Adds a `t` entry carrying [`set_timestamp`](Self::set_timestamp) to every record.
    pub fn encode_timestamp(&mut self) -> &mut Self {
        self.encode_timestamp = true;
        self
    }

    /// Timestamp sent when timestamp encoding is enabled.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    // Values

    /// The local value.
    pub fn value(&self) -> &Value {
        &self.local
    }

    /// The shadow of the remote value.
    pub fn cloud_value(&self) -> &Value {
        &self.cloud
    }

    /// The local value as `T`, if the property holds that kind.
    pub fn get<T: CloudValue>(&self) -> Option<&T> {
        T::from_value(&self.local)
    }

    /// Mutable access to the local value as `T`.
    ///
    /// Changes made here are picked up by the container's timestamp pass.
    pub fn get_mut<T: CloudValue>(&mut self) -> Option<&mut T> {
        T::from_value_mut(&mut self.local)
    }

    /// Replaces the local value and stamps the local change time.
    pub fn set_value(&mut self, value: impl Into<Value>) -> CoreResult<()> {
        let value = value.into();
        if value.kind() != self.local.kind() {
            return Err(CoreError::KindMismatch {
                name: self.name.clone(),
                expected: self.local.kind(),
                found: value.kind(),
            });
        }
        self.local = value;
        self.observed = self.local.clone();
        self.update_local_timestamp();
        Ok(())
    }

    /// Copies the shadow into the local value.
    pub fn from_cloud_to_local(&mut self) {
        self.local = self.cloud.clone();
        self.observed = self.local.clone();
    }

    /// Copies the local value into the shadow.
    pub fn from_local_to_cloud(&mut self) {
        self.cloud = self.local.clone();
    }

    /// Returns true if the local value differs from the shadow enough to send.
    pub fn is_different_from_cloud(&self) -> bool {
        let min_delta = match self.update_policy {
            UpdatePolicy::OnChange { min_delta, .. } => min_delta,
            _ => 0.0,
        };
        self.local.differs_from(&self.cloud, min_delta)
    }

    /// Returns true if the local value moved since the last timestamp pass.
    pub fn is_changed_locally(&self) -> bool {
        self.local.differs_from(&self.observed, 0.0)
    }

    // Timestamps

    /// Wall-clock time of the last local change.
    pub fn last_local_change(&self) -> u64 {
        self.last_local_change
    }

    /// Overrides the local change time.
    pub fn set_last_local_change(&mut self, timestamp: u64) {
        self.last_local_change = timestamp;
    }

    /// Wall-clock time of the last remote change.
    pub fn last_cloud_change(&self) -> u64 {
        self.last_cloud_change
    }

    /// Sets the remote change time.
    pub fn set_last_cloud_change(&mut self, timestamp: u64) {
        self.last_cloud_change = timestamp;
    }

    /// Monotonic time of the last append, in milliseconds.
    pub fn last_sent_at(&self) -> u64 {
        self.last_sent_at
    }

    /// Stamps the local change time from the clock, for readable properties.
    pub fn update_local_timestamp(&mut self) {
        if self.is_readable_by_cloud() {
            self.last_local_change = self.clock.unix_time();
        }
    }

    /// Stamps the local change time if the value moved since the last pass.
    ///
    /// Returns true if a change was recorded.
    pub(crate) fn track_local_change(&mut self) -> bool {
        if !self.is_readable_by_cloud() || !self.is_changed_locally() {
            return false;
        }
        self.update_local_timestamp();
        self.observed = self.local.clone();
        true
    }

    // Send state

    /// Returns true if the property has ever been appended.
    pub fn has_been_updated_once(&self) -> bool {
        self.has_been_updated_once
    }

    /// Returns true if the last append was not confirmed.
    pub fn is_pending_retransmit(&self) -> bool {
        self.pending_retransmit
    }

    /// Returns true if an echo is owed to the remote side.
    pub fn is_echo_requested(&self) -> bool {
        self.echo_requested
    }

    /// Returns true if the update callback changed the value.
    pub fn is_modified_in_update_callback(&self) -> bool {
        self.modified_in_update_callback
    }

    /// Forces the next send for on-demand properties.
    pub fn request_update(&mut self) {
        self.update_requested = true;
    }

    /// Returns true if an on-demand send was requested.
    pub fn is_update_requested(&self) -> bool {
        self.update_requested
    }

    /// Schedules a retransmission so the remote side sees its own write.
    pub fn provide_echo(&mut self) {
        self.echo_requested = true;
    }

    /// Confirms that the last append left the device.
    pub fn append_completed(&mut self) {
        self.pending_retransmit = false;
    }

    /// Returns true if the property should go into the next message.
    ///
    /// Pure query: flags are only consumed by [`append`](Self::append).
    pub fn should_be_updated(&self) -> bool {
        if !self.has_been_updated_once
            || self.pending_retransmit
            || self.modified_in_update_callback
            || self.echo_requested
        {
            return true;
        }

        let elapsed = self.clock.millis().saturating_sub(self.last_sent_at);
        match self.update_policy {
            UpdatePolicy::OnChange {
                min_interval_ms, ..
            } => self.is_different_from_cloud() && elapsed >= min_interval_ms,
            UpdatePolicy::TimeInterval { interval_ms } => elapsed >= interval_ms,
            UpdatePolicy::OnDemand => self.update_requested,
        }
    }

    // Wire

    /// Appends one record per attribute to `writer`.
    ///
    /// On success the shadow absorbs the local value and the property is
    /// marked sent but unconfirmed. On error nothing is written.
    pub fn append(&mut self, writer: &mut CborWriter<'_>, use_identifier: bool) -> Result<(), EncodeError> {
        let mark = writer.position();
        for slot in 0..self.local.slot_count() {
            if let Err(err) = self.append_attribute(writer, slot, use_identifier) {
                writer.truncate(mark);
                return Err(match err {
                    e if e.is_out_of_memory() && slot == 0 => EncodeError::OutOfMemory,
                    e if e.is_out_of_memory() => EncodeError::SplitItems,
                    e => EncodeError::Codec(e),
                });
            }
        }

        self.from_local_to_cloud();
        self.has_been_updated_once = true;
        self.modified_in_update_callback = false;
        self.update_requested = false;
        self.echo_requested = false;
        self.pending_retransmit = true;
        self.last_sent_at = self.clock.millis();
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn append_attribute(
        &self,
        writer: &mut CborWriter<'_>,
        slot: usize,
        use_identifier: bool,
    ) -> CodecResult<()> {
        let Some(attribute) = self.local.attribute(slot) else {
            return Ok(());
        };

        writer.begin_map(if self.encode_timestamp { 3 } else { 2 })?;
        write_key(writer, SenmlKey::Name)?;
        if use_identifier {
            let index = if self.local.is_primitive() { 0 } else { slot as u32 + 1 };
            writer.write_unsigned(u64::from(light_identifier(self.identifier, index)))?;
        } else if self.local.is_primitive() {
            writer.write_text(&self.name)?;
        } else {
            let attribute_name = self.local.attributes()[slot];
            writer.write_text(&format!("{}:{}", self.name, attribute_name))?;
        }
        attribute.write(writer)?;
        if self.encode_timestamp {
            write_key(writer, SenmlKey::Time)?;
            writer.write_unsigned(self.timestamp)?;
        }
        Ok(())
    }

    /// Applies received records to the shadow.
    ///
    /// Records are matched to attributes by light-payload index when present,
    /// otherwise by the attribute part of their name.
    pub fn set_attributes_from_cloud(&mut self, records: &[MapData]) {
        for record in records {
            let slot = match record.attribute_id {
                Some(index) => self.cloud.slot_for_index(index),
                None => self.cloud.slot_for_name(record.attribute_name()),
            };
            match slot {
                Some(slot) => self.cloud.set_attribute(slot, record),
                None => trace!(property = %self.name, ?record, "record matches no attribute"),
            }
        }
    }

    // Callbacks

    /// Runs the update callback, then flags a resend if the callback left
    /// the local value different from the shadow.
    pub fn exec_callback_on_change(&mut self) {
        if let Some(mut callback) = self.on_update.take() {
            callback(self);
            if self.on_update.is_none() {
                self.on_update = Some(callback);
            }
        }
        if self.is_different_from_cloud() {
            self.modified_in_update_callback = true;
        }
    }

    /// Runs the sync callback, if any.
    pub fn exec_callback_on_sync(&mut self) {
        if let Some(mut callback) = self.on_sync.take() {
            callback(self);
            if self.on_sync.is_none() {
                self.on_sync = Some(callback);
            }
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("permission", &self.permission)
            .field("update_policy", &self.update_policy)
            .field("write_policy", &self.write_policy)
            .field("local", &self.local)
            .field("cloud", &self.cloud)
            .field("pending_retransmit", &self.pending_retransmit)
            .field("echo_requested", &self.echo_requested)
            .finish_non_exhaustive()
    }
}
