//! Splitting the due properties across fixed-size buffers.

use propsync_core::{Location, Permission, Value};
use propsync_protocol::{DecoderConfig, EncoderConfig};
use propsync_testkit::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Serialized size of one `pN` string record with a 50-byte value: map
/// header, name key, three-byte name, value key, two-byte text header and the
/// text. Four of these plus the array framing (234 bytes) fit in a 256-byte
/// buffer and a fifth does not, so any record between 51 and 63 bytes gives
/// the same 4, 4, 2 split.
const STRING_RECORD: usize = 1 + 1 + 3 + 1 + 2 + 50;

#[test]
fn ten_strings_need_three_messages() {
    init_tracing();
    let mut device = TestDevice::new();
    add_string_properties(&mut device, 10, 50);

    let first = device.encode(256);
    assert_eq!(first.len(), 1 + 4 * STRING_RECORD + 1);
    assert_eq!(device.encoder_cursor(), 4);

    let second = device.encode(256);
    assert_eq!(second.len(), 1 + 4 * STRING_RECORD + 1);
    assert_eq!(device.encoder_cursor(), 8);

    let third = device.encode(256);
    assert_eq!(third.len(), 1 + 2 * STRING_RECORD + 1);

    assert!(device.encode(256).is_empty());
    for property in device.iter() {
        assert!(property.has_been_updated_once(), "{}", property.name());
        assert!(!property.should_be_updated(), "{}", property.name());
    }
}

#[test]
fn every_message_is_closed() {
    let mut device = TestDevice::new();
    add_string_properties(&mut device, 10, 50);
    for message in device.encode_all(256, 10) {
        assert_eq!(message.first(), Some(&0x9f));
        assert_eq!(message.last(), Some(&0xff));
        assert!(message.len() <= 256);
    }
}

#[test]
fn oversized_property_is_skipped_for_the_round() {
    init_tracing();
    let mut device = TestDevice::new();
    device.add("big", Permission::Read, "x".repeat(100));
    device.add("s", Permission::Read, 1i32);

    assert!(device.encode(64).is_empty());
    assert_eq!(device.encoder_cursor(), 1);
    assert!(!device.get("big").unwrap().has_been_updated_once());

    // [{0: "s", 2: 1}]
    assert_eq!(hex_encode(&device.encode(64)), "9fa20061730201ff");
    assert!(device.get("s").unwrap().has_been_updated_once());

    // The big property keeps failing and keeps being skipped.
    assert!(device.encode(64).is_empty());
    assert_eq!(device.encoder_cursor(), 1);
}

#[test]
fn composite_is_never_split_across_messages() {
    init_tracing();
    let mut device = TestDevice::new();
    device.add("test", Permission::Read, true);
    device.add("loc", Permission::Read, Location::new(2.0, 3.0));

    // 0x9f, nine bytes of "test" and one of the two 16-byte location
    // records fit in 36 bytes; the second location record does not.
    let first = device.encode(36);
    assert_eq!(hex_encode(&first), "9fa200647465737404f5ff");
    assert_eq!(device.encoder_cursor(), 1);
    assert!(!device.get("loc").unwrap().has_been_updated_once());

    let second = device.encode(36);
    assert_eq!(second.len(), 1 + 2 * 16 + 1);
    assert!(device.get("loc").unwrap().has_been_updated_once());
    assert!(device.encode(36).is_empty());
}

#[test]
fn closing_byte_is_reserved() {
    init_tracing();
    let mut device = TestDevice::new();
    device.add("aaaa", Permission::Read, true);
    device.add("bbbb", Permission::Read, true);

    // Both records fit exactly, leaving no room for 0xff.
    let first = device.encode(19);
    assert_eq!(hex_encode(&first), "9fa200646161616104f5ff");
    assert!(!device.get("bbbb").unwrap().has_been_updated_once());

    let second = device.encode(19);
    assert_eq!(hex_encode(&second), "9fa200646262626204f5ff");
}

#[test]
fn light_payload_records_are_shorter() {
    let mut named = TestDevice::new();
    let mut light = TestDevice::with_configs(
        EncoderConfig::new().use_identifier(true),
        DecoderConfig::default(),
    );
    for device in [&mut named, &mut light] {
        device.add("temperature", Permission::Read, 21.5f32);
    }
    let named_message = named.encode(64);
    let light_message = light.encode(64);
    assert_eq!(named_message.len() - light_message.len(), "temperature".len());
}

#[test]
fn changed_property_is_sent_after_min_interval() {
    let mut device = TestDevice::new();
    device.add("t", Permission::Read, 1i32);
    assert!(!device.encode(64).is_empty());

    device
        .get_mut("t")
        .unwrap()
        .set_value(Value::Int(2))
        .unwrap();
    assert!(device.encode(64).is_empty());

    device.advance(500);
    // [{0: "t", 2: 2}]
    assert_eq!(hex_encode(&device.encode(64)), "9fa20061740202ff");
}

#[test]
fn location_turning_nan_is_sent() {
    let mut device = TestDevice::new();
    device.add("loc", Permission::Read, Location::new(1.0, 2.0));
    assert!(!device.encode(64).is_empty());

    device
        .get_mut("loc")
        .unwrap()
        .set_value(Location::new(f32::NAN, 2.0))
        .unwrap();
    device.advance(1_000);
    let property = device.get("loc").unwrap();
    assert!(property.is_different_from_cloud());
    assert!(property.should_be_updated());

    let message = device.encode(64);
    assert_eq!(message.len(), 1 + 2 * 16 + 1);
    // "loc:lat" record: a2 00 67 <7 bytes> 02 fa <4 bytes>
    assert_eq!(message[12], 0xfa);
    let lat = f32::from_bits(u32::from_be_bytes([
        message[13],
        message[14],
        message[15],
        message[16],
    ]));
    assert!(lat.is_nan());
    assert!(device.encode(64).is_empty());
}
