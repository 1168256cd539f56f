//! Value kinds a property can hold.

use std::fmt;

use propsync_codec::{CborWriter, CodecResult};

use crate::record::{MapData, SenmlKey};
use crate::types::{Color, ColoredLight, DimmedLight, Location, Schedule, Television};

/// Float comparison used for change detection.
///
/// Two floats differ when their bit patterns differ and either one of them
/// is not a normal number or zero, or they are at least `delta` apart.
pub fn float_differs(a: f32, b: f32, delta: f32) -> bool {
    let plain = |x: f32| x.is_normal() || x == 0.0;
    a.to_bits() != b.to_bits() && (!plain(a) || !plain(b) || (a - b).abs() >= delta)
}

/// One attribute value on its way to the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attribute<'a> {
    /// Encoded under `vb`.
    Bool(bool),
    /// Encoded under `v` as a CBOR integer.
    Int(i64),
    /// Encoded under `v` as a CBOR unsigned integer.
    Unsigned(u64),
    /// Encoded under `v` as a single-precision float.
    Float(f32),
    /// Encoded under `vs`.
    Text(&'a str),
}

impl Attribute<'_> {
    /// Writes the value key and the value.
    pub fn write(&self, writer: &mut CborWriter<'_>) -> CodecResult<()> {
        match *self {
            Attribute::Bool(b) => {
                write_key(writer, SenmlKey::BooleanValue)?;
                writer.write_bool(b)
            }
            Attribute::Int(n) => {
                write_key(writer, SenmlKey::Value)?;
                writer.write_int(n)
            }
            Attribute::Unsigned(n) => {
                write_key(writer, SenmlKey::Value)?;
                writer.write_unsigned(n)
            }
            Attribute::Float(f) => {
                write_key(writer, SenmlKey::Value)?;
                writer.write_f32(f)
            }
            Attribute::Text(s) => {
                write_key(writer, SenmlKey::StringValue)?;
                writer.write_text(s)
            }
        }
    }
}

pub(crate) fn write_key(writer: &mut CborWriter<'_>, key: SenmlKey) -> CodecResult<()> {
    writer.write_int(key.to_code())
}

/// Capabilities every value kind provides to a property.
///
/// Scalars have a single unnamed attribute at slot 0. Composites list their
/// attribute names in wire order; slot `i` is `ATTRIBUTES[i]`.
pub trait CloudValue: Clone + PartialEq + fmt::Debug + Into<Value> {
    /// Kind name used in diagnostics.
    const KIND: &'static str;

    /// Attribute names in wire order; empty for scalars.
    const ATTRIBUTES: &'static [&'static str] = &[];

    /// Value of the attribute in `slot`.
    fn attribute(&self, slot: usize) -> Option<Attribute<'_>>;

    /// Assigns the attribute in `slot` from a received record.
    ///
    /// Records without a usable value leave the attribute unchanged.
    fn set_attribute(&mut self, slot: usize, record: &MapData);

    /// Returns true if `self` and `other` differ enough to be sent.
    fn differs_from(&self, other: &Self, min_delta: f32) -> bool;

    /// Borrows the inner value if `value` is of this kind.
    fn from_value(value: &Value) -> Option<&Self>;

    /// Mutably borrows the inner value if `value` is of this kind.
    fn from_value_mut(value: &mut Value) -> Option<&mut Self>;
}

/// Closed set of value kinds held by a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i32),
    /// Unsigned integer.
    UnsignedInt(u32),
    /// Single-precision float.
    Float(f32),
    /// Text.
    String(String),
    /// Latitude and longitude.
    Location(Location),
    /// Hue, saturation and brightness.
    Color(Color),
    /// Switch plus color.
    ColoredLight(ColoredLight),
    /// Switch plus brightness.
    DimmedLight(DimmedLight),
    /// Television state.
    Television(Television),
    /// Recurring time window.
    Schedule(Schedule),
}

macro_rules! dispatch {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Value::Bool($inner) => $body,
            Value::Int($inner) => $body,
            Value::UnsignedInt($inner) => $body,
            Value::Float($inner) => $body,
            Value::String($inner) => $body,
            Value::Location($inner) => $body,
            Value::Color($inner) => $body,
            Value::ColoredLight($inner) => $body,
            Value::DimmedLight($inner) => $body,
            Value::Television($inner) => $body,
            Value::Schedule($inner) => $body,
        }
    };
}

fn kind_of<T: CloudValue>(_: &T) -> &'static str {
    T::KIND
}

fn attributes_of<T: CloudValue>(_: &T) -> &'static [&'static str] {
    T::ATTRIBUTES
}

impl Value {
    /// Kind name of the held value.
    pub fn kind(&self) -> &'static str {
        dispatch!(self, v => kind_of(v))
    }

    /// Attribute names; empty for scalars.
    pub fn attributes(&self) -> &'static [&'static str] {
        dispatch!(self, v => attributes_of(v))
    }

    /// Number of wire records this value produces.
    pub fn slot_count(&self) -> usize {
        self.attributes().len().max(1)
    }

    /// Returns true if this value is a single scalar.
    pub fn is_primitive(&self) -> bool {
        self.attributes().is_empty()
    }

    /// Value of the attribute in `slot`.
    pub fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
        dispatch!(self, v => v.attribute(slot))
    }

    /// Assigns the attribute in `slot` from a received record.
    pub fn set_attribute(&mut self, slot: usize, record: &MapData) {
        dispatch!(self, v => v.set_attribute(slot, record))
    }

    /// Slot addressed by a light-payload attribute index.
    pub fn slot_for_index(&self, index: u32) -> Option<usize> {
        let index = usize::try_from(index).ok()?;
        if self.is_primitive() {
            (index == 0).then_some(0)
        } else {
            (1..=self.attributes().len()).contains(&index).then(|| index - 1)
        }
    }

    /// Slot addressed by an attribute name.
    pub fn slot_for_name(&self, name: &str) -> Option<usize> {
        if self.is_primitive() {
            name.is_empty().then_some(0)
        } else {
            self.attributes().iter().position(|a| *a == name)
        }
    }

    /// Returns true if `self` and `other` differ enough to be sent.
    ///
    /// Values of different kinds always differ.
    pub fn differs_from(&self, other: &Value, min_delta: f32) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.differs_from(b, min_delta),
            (Value::Int(a), Value::Int(b)) => a.differs_from(b, min_delta),
            (Value::UnsignedInt(a), Value::UnsignedInt(b)) => a.differs_from(b, min_delta),
            (Value::Float(a), Value::Float(b)) => a.differs_from(b, min_delta),
            (Value::String(a), Value::String(b)) => a.differs_from(b, min_delta),
            (Value::Location(a), Value::Location(b)) => a.differs_from(b, min_delta),
            (Value::Color(a), Value::Color(b)) => a.differs_from(b, min_delta),
            (Value::ColoredLight(a), Value::ColoredLight(b)) => a.differs_from(b, min_delta),
            (Value::DimmedLight(a), Value::DimmedLight(b)) => a.differs_from(b, min_delta),
            (Value::Television(a), Value::Television(b)) => a.differs_from(b, min_delta),
            (Value::Schedule(a), Value::Schedule(b)) => a.differs_from(b, min_delta),
            _ => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UnsignedInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            other => {
                f.write_str("{")?;
                for slot in 0..other.slot_count() {
                    if slot > 0 {
                        f.write_str(", ")?;
                    }
                    let name = other.attributes().get(slot).copied().unwrap_or("");
                    match other.attribute(slot) {
                        Some(Attribute::Bool(v)) => write!(f, "{name}: {v}")?,
                        Some(Attribute::Int(v)) => write!(f, "{name}: {v}")?,
                        Some(Attribute::Unsigned(v)) => write!(f, "{name}: {v}")?,
                        Some(Attribute::Float(v)) => write!(f, "{name}: {v}")?,
                        Some(Attribute::Text(v)) => write!(f, "{name}: {v:?}")?,
                        None => {}
                    }
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! scalar_value {
    ($ty:ty, $variant:ident, $kind:literal) => {
        into_value!($ty, $variant);

        impl CloudValue for $ty {
            const KIND: &'static str = $kind;

            fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
                (slot == 0).then(|| self.to_attribute())
            }

            fn set_attribute(&mut self, slot: usize, record: &MapData) {
                if slot == 0 {
                    if let Some(v) = Self::read_record(record) {
                        *self = v;
                    }
                }
            }

            fn differs_from(&self, other: &Self, min_delta: f32) -> bool {
                self.scalar_differs(other, min_delta)
            }

            value_accessors!($variant);
        }
    };
}

/// Per-scalar wire mapping used by `scalar_value!`.
trait Scalar: Sized {
    fn to_attribute(&self) -> Attribute<'_>;
    fn read_record(record: &MapData) -> Option<Self>;
    fn scalar_differs(&self, other: &Self, min_delta: f32) -> bool;
}

impl Scalar for bool {
    fn to_attribute(&self) -> Attribute<'_> {
        Attribute::Bool(*self)
    }

    fn read_record(record: &MapData) -> Option<Self> {
        record.as_bool()
    }

    fn scalar_differs(&self, other: &Self, _min_delta: f32) -> bool {
        self != other
    }
}

impl Scalar for i32 {
    fn to_attribute(&self) -> Attribute<'_> {
        Attribute::Int(i64::from(*self))
    }

    fn read_record(record: &MapData) -> Option<Self> {
        record.as_i32()
    }

    #[allow(clippy::cast_precision_loss)]
    fn scalar_differs(&self, other: &Self, min_delta: f32) -> bool {
        self != other && (i64::from(*self) - i64::from(*other)).abs() as f32 >= min_delta
    }
}

impl Scalar for u32 {
    fn to_attribute(&self) -> Attribute<'_> {
        Attribute::Unsigned(u64::from(*self))
    }

    fn read_record(record: &MapData) -> Option<Self> {
        record.as_u32()
    }

    #[allow(clippy::cast_precision_loss)]
    fn scalar_differs(&self, other: &Self, min_delta: f32) -> bool {
        self != other && self.abs_diff(*other) as f32 >= min_delta
    }
}

impl Scalar for f32 {
    fn to_attribute(&self) -> Attribute<'_> {
        Attribute::Float(*self)
    }

    fn read_record(record: &MapData) -> Option<Self> {
        record.as_f32()
    }

    fn scalar_differs(&self, other: &Self, min_delta: f32) -> bool {
        float_differs(*self, *other, min_delta)
    }
}

impl Scalar for String {
    fn to_attribute(&self) -> Attribute<'_> {
        Attribute::Text(self)
    }

    fn read_record(record: &MapData) -> Option<Self> {
        record.as_str().map(str::to_string)
    }

    fn scalar_differs(&self, other: &Self, _min_delta: f32) -> bool {
        self != other
    }
}

scalar_value!(bool, Bool, "bool");
scalar_value!(i32, Int, "int");
scalar_value!(u32, UnsignedInt, "unsigned int");
scalar_value!(f32, Float, "float");
scalar_value!(String, String, "string");

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
