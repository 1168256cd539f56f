//! Property-based test generators using proptest.
//!
//! Provides strategies for property names, values of every kind and
//! SenML payloads, well-formed or not.

use propsync_codec::CborWriter;
use propsync_core::{
    Color, ColoredLight, DimmedLight, InputValue, Location, PlaybackCommand, Schedule,
    SenmlKey, Television, Value,
};
use proptest::prelude::*;

/// Strategy for generating property names.
pub fn property_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for finite floats in a range sensors report.
pub fn float_strategy() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

/// Strategy for primitive values.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        any::<u32>().prop_map(Value::UnsignedInt),
        float_strategy().prop_map(Value::Float),
        prop::string::string_regex("[ -~]{0,32}")
            .expect("Invalid regex")
            .prop_map(Value::String),
    ]
}

/// Strategy for composite values.
pub fn composite_value_strategy() -> impl Strategy<Value = Value> {
    let f = float_strategy;
    prop_oneof![
        (f(), f()).prop_map(|(lat, lon)| Location::new(lat, lon).into()),
        (0.0f32..360.0, 0.0f32..100.0, 0.0f32..100.0)
            .prop_map(|(h, s, b)| Color::new(h, s, b).into()),
        (any::<bool>(), 0.0f32..360.0, 0.0f32..100.0, 0.0f32..100.0)
            .prop_map(|(swi, h, s, b)| ColoredLight::new(swi, h, s, b).into()),
        (any::<bool>(), 0.0f32..100.0).prop_map(|(swi, bri)| DimmedLight::new(swi, bri).into()),
        (any::<bool>(), 0i32..100, any::<bool>(), 0i32..16, any::<i32>())
            .prop_map(|(swi, vol, mut_, pbc, cha)| {
                Television {
                    swi,
                    vol,
                    mut_,
                    pbc: PlaybackCommand::from_code(pbc).unwrap_or_default(),
                    inp: InputValue::default(),
                    cha,
                }
                .into()
            }),
        (any::<u32>(), any::<u32>(), any::<u32>(), any::<u32>())
            .prop_map(|(frm, to, len, msk)| Schedule::new(frm, to, len, msk).into()),
    ]
}

/// Strategy for values of any kind.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![scalar_value_strategy(), composite_value_strategy()]
}

/// One map entry of a generated payload.
#[derive(Debug, Clone)]
pub enum RecordField {
    /// Text under a known or unknown key.
    Text(i64, String),
    /// Integer under a known or unknown key.
    Int(i64, i64),
    /// Float under a known or unknown key.
    Float(i64, f64),
    /// Boolean under a known or unknown key.
    Bool(i64, bool),
}

fn key_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        3 => prop::sample::select(vec![
            SenmlKey::BaseName.to_code(),
            SenmlKey::BaseTime.to_code(),
            SenmlKey::Name.to_code(),
            SenmlKey::Value.to_code(),
            SenmlKey::StringValue.to_code(),
            SenmlKey::BooleanValue.to_code(),
            SenmlKey::Time.to_code(),
        ]),
        1 => -10i64..200,
    ]
}

fn field_strategy() -> impl Strategy<Value = RecordField> {
    prop_oneof![
        (key_strategy(), property_name_strategy()).prop_map(|(k, v)| RecordField::Text(k, v)),
        (key_strategy(), any::<i64>()).prop_map(|(k, v)| RecordField::Int(k, v)),
        (key_strategy(), any::<f64>()).prop_map(|(k, v)| RecordField::Float(k, v)),
        (key_strategy(), any::<bool>()).prop_map(|(k, v)| RecordField::Bool(k, v)),
    ]
}

/// Strategy for structurally valid SenML payloads with random fields.
///
/// Keys are drawn mostly from the known SenML labels, sometimes from
/// unknown ones; values may not match the type the key expects.
pub fn senml_payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::collection::vec(field_strategy(), 0..6), 0..6)
        .prop_map(|records| encode_records(&records))
}

/// Encodes records as a definite-length SenML array.
pub fn encode_records(records: &[Vec<RecordField>]) -> Vec<u8> {
    let mut buf = vec![0u8; 4096];
    let mut writer = CborWriter::new(&mut buf);
    let written = write_records(&mut writer, records).map(|()| writer.position());
    match written {
        Ok(n) => {
            buf.truncate(n);
            buf
        }
        Err(_) => Vec::new(),
    }
}

fn write_records(
    writer: &mut CborWriter<'_>,
    records: &[Vec<RecordField>],
) -> propsync_codec::CodecResult<()> {
    writer.begin_array(records.len() as u64)?;
    for fields in records {
        writer.begin_map(fields.len() as u64)?;
        for field in fields {
            match field {
                RecordField::Text(k, v) => {
                    writer.write_int(*k)?;
                    writer.write_text(v)?;
                }
                RecordField::Int(k, v) => {
                    writer.write_int(*k)?;
                    writer.write_int(*v)?;
                }
                RecordField::Float(k, v) => {
                    writer.write_int(*k)?;
                    writer.write_f64(*v)?;
                }
                RecordField::Bool(k, v) => {
                    writer.write_int(*k)?;
                    writer.write_bool(*v)?;
                }
            }
        }
    }
    Ok(())
}

/// Strategy for arbitrary bytes.
pub fn raw_payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn names_are_not_empty(name in property_name_strategy()) {
            prop_assert!(!name.is_empty());
        }

        #[test]
        fn payloads_start_with_an_array(payload in senml_payload_strategy()) {
            prop_assert!(!payload.is_empty());
            prop_assert_eq!(payload[0] >> 5, 4);
        }

        #[test]
        fn composites_are_not_primitive(value in composite_value_strategy()) {
            prop_assert!(!value.is_primitive());
        }
    }
}
