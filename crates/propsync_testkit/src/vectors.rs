//! Wire test vectors for PropSync.
//!
//! Every vector holds one property and the exact message the encoder emits
//! for it. The same bytes, fed to the decoder of a device holding the
//! kind's default value, must reproduce the value.

use propsync_core::{
    Color, ColoredLight, DimmedLight, InputValue, Location, PlaybackCommand, Schedule,
    Television, Value,
};
use serde::{Deserialize, Serialize};

/// Property value in a serializable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum VectorValue {
    Bool { value: bool },
    Int { value: i32 },
    UnsignedInt { value: u32 },
    Float { value: f32 },
    String { value: String },
    Location { lat: f32, lon: f32 },
    Color { hue: f32, sat: f32, bri: f32 },
    ColoredLight { swi: bool, hue: f32, sat: f32, bri: f32 },
    DimmedLight { swi: bool, bri: f32 },
    Television { swi: bool, vol: i32, mute: bool, pbc: i32, inp: i32, cha: i32 },
    Schedule { frm: u32, to: u32, len: u32, msk: u32 },
}

impl VectorValue {
    /// Converts to a property value.
    ///
    /// Unknown television codes fall back to the defaults.
    pub fn to_value(&self) -> Value {
        match self {
            VectorValue::Bool { value } => Value::Bool(*value),
            VectorValue::Int { value } => Value::Int(*value),
            VectorValue::UnsignedInt { value } => Value::UnsignedInt(*value),
            VectorValue::Float { value } => Value::Float(*value),
            VectorValue::String { value } => Value::String(value.clone()),
            VectorValue::Location { lat, lon } => Location::new(*lat, *lon).into(),
            VectorValue::Color { hue, sat, bri } => Color::new(*hue, *sat, *bri).into(),
            VectorValue::ColoredLight { swi, hue, sat, bri } => {
                ColoredLight::new(*swi, *hue, *sat, *bri).into()
            }
            VectorValue::DimmedLight { swi, bri } => DimmedLight::new(*swi, *bri).into(),
            VectorValue::Television {
                swi,
                vol,
                mute,
                pbc,
                inp,
                cha,
            } => Television {
                swi: *swi,
                vol: *vol,
                mut_: *mute,
                pbc: PlaybackCommand::from_code(*pbc).unwrap_or_default(),
                inp: InputValue::from_code(*inp).unwrap_or_default(),
                cha: *cha,
            }
            .into(),
            VectorValue::Schedule { frm, to, len, msk } => {
                Schedule::new(*frm, *to, *len, *msk).into()
            }
        }
    }

    /// Default value of the same kind.
    pub fn default_value(&self) -> Value {
        match self {
            VectorValue::Bool { .. } => Value::Bool(false),
            VectorValue::Int { .. } => Value::Int(0),
            VectorValue::UnsignedInt { .. } => Value::UnsignedInt(0),
            VectorValue::Float { .. } => Value::Float(0.0),
            VectorValue::String { .. } => Value::String(String::new()),
            VectorValue::Location { .. } => Location::default().into(),
            VectorValue::Color { .. } => Color::default().into(),
            VectorValue::ColoredLight { .. } => ColoredLight::default().into(),
            VectorValue::DimmedLight { .. } => DimmedLight::default().into(),
            VectorValue::Television { .. } => Television::default().into(),
            VectorValue::Schedule { .. } => Schedule::default().into(),
        }
    }
}

/// A message vector shared with other implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Property name.
    pub property: String,
    /// Whether the message uses integer identifiers (property identifier 1).
    pub light_payload: bool,
    /// Property value.
    pub value: VectorValue,
    /// Complete message (hex-encoded).
    pub message_hex: String,
}

fn vector(
    id: &str,
    description: &str,
    property: &str,
    light_payload: bool,
    value: VectorValue,
    message_hex: &str,
) -> TestVector {
    TestVector {
        id: id.into(),
        description: description.into(),
        property: property.into(),
        light_payload,
        value,
        message_hex: message_hex.into(),
    }
}

/// Scalar property vectors.
pub fn scalar_vectors() -> Vec<TestVector> {
    vec![
        vector(
            "bool_true",
            "Boolean under vb",
            "test",
            false,
            VectorValue::Bool { value: true },
            "9f a2 00 64 74657374 04 f5 ff",
        ),
        vector(
            "int_small",
            "Integer in the initial byte",
            "test",
            false,
            VectorValue::Int { value: 7 },
            "9f a2 00 64 74657374 02 07 ff",
        ),
        vector(
            "int_negative",
            "Negative integer",
            "test",
            false,
            VectorValue::Int { value: -7 },
            "9f a2 00 64 74657374 02 26 ff",
        ),
        vector(
            "int_one_byte",
            "Integer needing one argument byte",
            "test",
            false,
            VectorValue::Int { value: 123 },
            "9f a2 00 64 74657374 02 187b ff",
        ),
        vector(
            "unsigned_two_bytes",
            "Unsigned integer needing two argument bytes",
            "test",
            false,
            VectorValue::UnsignedInt { value: 300 },
            "9f a2 00 64 74657374 02 19012c ff",
        ),
        vector(
            "float",
            "Float as single precision",
            "test",
            false,
            VectorValue::Float { value: 21.5 },
            "9f a2 00 64 74657374 02 fa41ac0000 ff",
        ),
        vector(
            "string",
            "Text under vs",
            "test",
            false,
            VectorValue::String {
                value: "test".into(),
            },
            "9f a2 00 64 74657374 03 6474657374 ff",
        ),
        vector(
            "light_bool",
            "Boolean addressed by identifier",
            "test",
            true,
            VectorValue::Bool { value: true },
            "9f a2 00 01 04 f5 ff",
        ),
        vector(
            "light_int",
            "Integer addressed by identifier",
            "test",
            true,
            VectorValue::Int { value: 7 },
            "9f a2 00 01 02 07 ff",
        ),
    ]
}

/// Composite property vectors.
pub fn composite_vectors() -> Vec<TestVector> {
    vec![
        vector(
            "location",
            "Location, one record per attribute",
            "test",
            false,
            VectorValue::Location { lat: 2.0, lon: 3.0 },
            "9f a2 00 68 746573743a6c6174 02 fa40000000 \
                a2 00 68 746573743a6c6f6e 02 fa40400000 ff",
        ),
        vector(
            "light_location",
            "Location addressed by identifier and attribute index",
            "test",
            true,
            VectorValue::Location { lat: 2.0, lon: 3.0 },
            "9f a2 00 190101 02 fa40000000 a2 00 190201 02 fa40400000 ff",
        ),
        vector(
            "color",
            "Color in hue, saturation and brightness",
            "test",
            false,
            VectorValue::Color {
                hue: 120.0,
                sat: 50.0,
                bri: 100.0,
            },
            "9f a2 00 68 746573743a687565 02 fa42f00000 \
                a2 00 68 746573743a736174 02 fa42480000 \
                a2 00 68 746573743a627269 02 fa42c80000 ff",
        ),
        vector(
            "colored_light",
            "Colored light, switch first",
            "cl",
            false,
            VectorValue::ColoredLight {
                swi: true,
                hue: 10.0,
                sat: 20.0,
                bri: 30.0,
            },
            "9f a2 00 66 636c3a737769 04 f5 \
                a2 00 66 636c3a687565 02 fa41200000 \
                a2 00 66 636c3a736174 02 fa41a00000 \
                a2 00 66 636c3a627269 02 fa41f00000 ff",
        ),
        vector(
            "dimmed_light",
            "Dimmed light",
            "test",
            false,
            VectorValue::DimmedLight {
                swi: true,
                bri: 40.0,
            },
            "9f a2 00 68 746573743a737769 04 f5 \
                a2 00 68 746573743a627269 02 fa42200000 ff",
        ),
        vector(
            "television",
            "Television with enums as integers",
            "tv",
            false,
            VectorValue::Television {
                swi: true,
                vol: 30,
                mute: false,
                pbc: 3,
                inp: 16,
                cha: 7,
            },
            "9f a2 00 66 74763a737769 04 f5 \
                a2 00 66 74763a766f6c 02 181e \
                a2 00 66 74763a6d7574 04 f4 \
                a2 00 66 74763a706263 02 03 \
                a2 00 66 74763a696e70 02 10 \
                a2 00 66 74763a636861 02 07 ff",
        ),
        vector(
            "schedule",
            "Schedule as unsigned integers",
            "test",
            false,
            VectorValue::Schedule {
                frm: 1,
                to: 2,
                len: 3,
                msk: 4,
            },
            "9f a2 00 68 746573743a66726d 02 01 \
                a2 00 67 746573743a746f 02 02 \
                a2 00 68 746573743a6c656e 02 03 \
                a2 00 68 746573743a6d736b 02 04 ff",
        ),
    ]
}

/// Every vector.
pub fn all_vectors() -> Vec<TestVector> {
    let mut vectors = scalar_vectors();
    vectors.extend(composite_vectors());
    vectors
}

/// All vectors as JSON for other implementations.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        scalar: scalar_vectors(),
        composite: composite_vectors(),
    };
    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    scalar: Vec<TestVector>,
    composite: Vec<TestVector>,
}

/// Encodes bytes as lowercase hexadecimal.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes hexadecimal, ignoring whitespace.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("Invalid hex"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_helpers() {
        assert_eq!(hex_decode("9f a2\n00"), vec![0x9f, 0xa2, 0x00]);
        assert_eq!(hex_encode(&[0x9f, 0x0a]), "9f0a");
    }

    #[test]
    fn vectors_are_well_formed() {
        for vector in all_vectors() {
            let bytes = hex_decode(&vector.message_hex);
            assert_eq!(bytes.first(), Some(&0x9f), "{}", vector.id);
            assert_eq!(bytes.last(), Some(&0xff), "{}", vector.id);
            assert_eq!(
                vector.value.to_value().kind(),
                vector.value.default_value().kind(),
                "{}",
                vector.id
            );
        }
    }

    #[test]
    fn json_round_trip() {
        let json = all_vectors_json();
        let parsed: AllTestVectors = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.scalar.len(), scalar_vectors().len());
        assert_eq!(parsed.composite[0].value, composite_vectors()[0].value);
    }
}
