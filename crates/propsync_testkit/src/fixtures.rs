//! Test fixtures and device helpers.
//!
//! Provides a simulated device with a manual clock and convenience
//! builders for common container layouts.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use propsync_core::{ManualClock, Permission, PropertyContainer};
use propsync_protocol::{
    DecodeResult, DecoderConfig, EncoderConfig, MessageDecoder, MessageEncoder,
};

use crate::vectors::{hex_decode, TestVector};

/// Wall-clock time the fixture clock starts at (2024-01-01T00:00:00Z).
pub const FIXTURE_UNIX_TIME: u64 = 1_704_067_200;

/// Creates a manual clock at zero milliseconds and [`FIXTURE_UNIX_TIME`].
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(0, FIXTURE_UNIX_TIME))
}

/// A device under test: container, clock and codec state.
pub struct TestDevice {
    /// The device's properties.
    pub container: PropertyContainer,
    /// The clock shared with every property.
    pub clock: Arc<ManualClock>,
    encoder: MessageEncoder,
    decoder: MessageDecoder,
}

impl TestDevice {
    /// Creates an empty device with default codec configuration.
    pub fn new() -> Self {
        Self::with_configs(EncoderConfig::default(), DecoderConfig::default())
    }

    /// Creates an empty device with explicit codec configuration.
    pub fn with_configs(encoder: EncoderConfig, decoder: DecoderConfig) -> Self {
        let clock = manual_clock();
        Self {
            container: PropertyContainer::new(clock.clone()),
            clock,
            encoder: MessageEncoder::with_config(encoder),
            decoder: MessageDecoder::with_config(decoder),
        }
    }

    /// Creates a device holding the property of `vector` at its final value.
    pub fn sending(vector: &TestVector) -> Self {
        let mut device = Self::new_for(vector);
        device
            .container
            .add(&vector.property, Permission::ReadWrite, vector.value.to_value());
        device
    }

    /// Creates a device holding the property of `vector` at the kind's default.
    pub fn receiving(vector: &TestVector) -> Self {
        let mut device = Self::new_for(vector);
        device.container.add(
            &vector.property,
            Permission::ReadWrite,
            vector.value.default_value(),
        );
        device
    }

    fn new_for(vector: &TestVector) -> Self {
        Self::with_configs(
            EncoderConfig::new().use_identifier(vector.light_payload),
            DecoderConfig::default(),
        )
    }

    /// Encodes into a buffer of `capacity` bytes and returns the message.
    pub fn encode(&mut self, capacity: usize) -> Vec<u8> {
        let mut buf = vec![0u8; capacity];
        let n = self.encoder.encode(&mut self.container, &mut buf);
        buf.truncate(n);
        buf
    }

    /// Encodes until nothing is due, one message per call.
    ///
    /// Stops after `max_messages` to guard against a property that never fits.
    pub fn encode_all(&mut self, capacity: usize, max_messages: usize) -> Vec<Vec<u8>> {
        let mut messages = Vec::new();
        for _ in 0..max_messages {
            let message = self.encode(capacity);
            if message.is_empty() {
                break;
            }
            messages.push(message);
        }
        messages
    }

    /// Decodes a regular message.
    pub fn receive(&mut self, payload: &[u8]) -> DecodeResult<usize> {
        self.decoder.decode(&mut self.container, payload, false)
    }

    /// Decodes the answer to the initial value fetch.
    pub fn receive_sync(&mut self, payload: &[u8]) -> DecodeResult<usize> {
        self.decoder.decode(&mut self.container, payload, true)
    }

    /// Decodes a hex-encoded regular message.
    pub fn receive_hex(&mut self, hex: &str) -> DecodeResult<usize> {
        self.receive(&hex_decode(hex))
    }

    /// Moves the clock forward.
    pub fn advance(&self, ms: u64) {
        self.clock.advance(ms);
    }

    /// Cursor of the encoder.
    pub fn encoder_cursor(&self) -> usize {
        self.encoder.cursor()
    }
}

impl Default for TestDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestDevice {
    type Target = PropertyContainer;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

impl DerefMut for TestDevice {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.container
    }
}

/// Registers `count` read-only string properties `p0`, `p1`, ... each
/// holding `len` bytes of text.
pub fn add_string_properties(container: &mut PropertyContainer, count: usize, len: usize) {
    for i in 0..count {
        let value = char::from(b'a' + (i % 26) as u8).to_string().repeat(len);
        container.add(&format!("p{i}"), Permission::Read, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectors::scalar_vectors;

    #[test]
    fn device_deref() {
        let mut device = TestDevice::new();
        device.add("x", Permission::Read, 1i32);
        assert_eq!(device.len(), 1);
        assert!(!device.get("x").unwrap().has_been_updated_once());
    }

    #[test]
    fn string_properties() {
        let mut device = TestDevice::new();
        add_string_properties(&mut device, 3, 5);
        assert_eq!(device.len(), 3);
        assert_eq!(
            device.get("p2").unwrap().get::<String>().map(String::as_str),
            Some("ccccc")
        );
    }

    #[test]
    fn sending_and_receiving_devices() {
        let vector = &scalar_vectors()[0];
        let sender = TestDevice::sending(vector);
        let receiver = TestDevice::receiving(vector);
        assert_eq!(sender.get("test").unwrap().value(), &vector.value.to_value());
        assert_eq!(
            receiver.get("test").unwrap().value(),
            &vector.value.default_value()
        );
    }

    #[test]
    fn encode_all_stops_when_idle() {
        let mut device = TestDevice::new();
        device.add("x", Permission::Read, 1i32);
        assert_eq!(device.encode_all(64, 10).len(), 1);
    }
}
