//! SenML key space and the per-map record accumulator.

/// Integer map keys from RFC 8428 section 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenmlKey {
    /// `bver`
    BaseVersion,
    /// `bn`
    BaseName,
    /// `bt`
    BaseTime,
    /// `bu`
    BaseUnit,
    /// `bv`
    BaseValue,
    /// `bs`
    BaseSum,
    /// `n`
    Name,
    /// `u`
    Unit,
    /// `v`
    Value,
    /// `vs`
    StringValue,
    /// `vb`
    BooleanValue,
    /// `s`
    Sum,
    /// `t`
    Time,
    /// `ut`
    UpdateTime,
    /// `vd`
    DataValue,
}

impl SenmlKey {
    /// Returns the integer used on the wire.
    pub fn to_code(self) -> i64 {
        match self {
            SenmlKey::BaseVersion => -1,
            SenmlKey::BaseName => -2,
            SenmlKey::BaseTime => -3,
            SenmlKey::BaseUnit => -4,
            SenmlKey::BaseValue => -5,
            SenmlKey::BaseSum => -6,
            SenmlKey::Name => 0,
            SenmlKey::Unit => 1,
            SenmlKey::Value => 2,
            SenmlKey::StringValue => 3,
            SenmlKey::BooleanValue => 4,
            SenmlKey::Sum => 5,
            SenmlKey::Time => 6,
            SenmlKey::UpdateTime => 7,
            SenmlKey::DataValue => 8,
        }
    }

    /// Creates a key from its wire integer.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(SenmlKey::BaseVersion),
            -2 => Some(SenmlKey::BaseName),
            -3 => Some(SenmlKey::BaseTime),
            -4 => Some(SenmlKey::BaseUnit),
            -5 => Some(SenmlKey::BaseValue),
            -6 => Some(SenmlKey::BaseSum),
            0 => Some(SenmlKey::Name),
            1 => Some(SenmlKey::Unit),
            2 => Some(SenmlKey::Value),
            3 => Some(SenmlKey::StringValue),
            4 => Some(SenmlKey::BooleanValue),
            5 => Some(SenmlKey::Sum),
            6 => Some(SenmlKey::Time),
            7 => Some(SenmlKey::UpdateTime),
            8 => Some(SenmlKey::DataValue),
            _ => None,
        }
    }
}

/// One decoded SenML record.
///
/// Base fields are carried from one map to the next within a message;
/// everything else is specific to the map it was read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    /// `bver`
    pub base_version: Option<i64>,
    /// `bn`
    pub base_name: Option<String>,
    /// `bt`
    pub base_time: Option<f64>,
    /// Full record name, `property` or `property:attribute`.
    pub name: Option<String>,
    /// Property identifier from a light payload.
    pub property_id: Option<u32>,
    /// Attribute index from a light payload.
    pub attribute_id: Option<u32>,
    /// `v`
    pub value: Option<f64>,
    /// `vs`
    pub string_value: Option<String>,
    /// `vb`
    pub bool_value: Option<bool>,
    /// `t`
    pub time: Option<f64>,
}

impl MapData {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record inheriting the base fields of `previous`.
    pub fn carrying_base(previous: &MapData) -> Self {
        Self {
            base_version: previous.base_version,
            base_name: previous.base_name.clone(),
            base_time: previous.base_time,
            ..Self::default()
        }
    }

    /// Creates a record addressed to `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the numeric value.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the string value.
    #[must_use]
    pub fn with_string(mut self, value: impl Into<String>) -> Self {
        self.string_value = Some(value.into());
        self
    }

    /// Sets the boolean value.
    #[must_use]
    pub fn with_bool(mut self, value: bool) -> Self {
        self.bool_value = Some(value);
        self
    }

    /// Sets the record time.
    #[must_use]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    /// The property part of the name.
    pub fn property_name(&self) -> Option<&str> {
        let name = self.name.as_deref()?;
        Some(name.split_once(':').map_or(name, |(property, _)| property))
    }

    /// The attribute part of the name, empty for scalar records.
    pub fn attribute_name(&self) -> &str {
        self.name
            .as_deref()
            .and_then(|name| name.split_once(':'))
            .map_or("", |(_, attribute)| attribute)
    }

    /// Numeric value narrowed to `f32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_f32(&self) -> Option<f32> {
        self.value.map(|v| v as f32)
    }

    /// Numeric value truncated to `i32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i32(&self) -> Option<i32> {
        self.value.map(|v| v as i32)
    }

    /// Numeric value truncated to `u32`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_u32(&self) -> Option<u32> {
        self.value.map(|v| v as u32)
    }

    /// Boolean value; numeric `0` and `1` are accepted too.
    pub fn as_bool(&self) -> Option<bool> {
        if let Some(b) = self.bool_value {
            return Some(b);
        }
        match self.value {
            Some(v) if v == 0.0 => Some(false),
            Some(v) if v == 1.0 => Some(true),
            _ => None,
        }
    }

    /// String value.
    pub fn as_str(&self) -> Option<&str> {
        self.string_value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_codes_round_trip() {
        for code in -6..=8 {
            let key = SenmlKey::from_code(code).unwrap();
            assert_eq!(key.to_code(), code);
        }
        assert_eq!(SenmlKey::from_code(123), None);
        assert_eq!(SenmlKey::from_code(-7), None);
    }

    #[test]
    fn name_split() {
        let record = MapData::named("test:lat");
        assert_eq!(record.property_name(), Some("test"));
        assert_eq!(record.attribute_name(), "lat");

        let record = MapData::named("test");
        assert_eq!(record.property_name(), Some("test"));
        assert_eq!(record.attribute_name(), "");

        assert_eq!(MapData::new().property_name(), None);
    }

    #[test]
    fn base_fields_carry_forward() {
        let mut first = MapData::named("a").with_value(1.0);
        first.base_time = Some(100.0);
        first.base_name = Some("dev".into());
        first.base_version = Some(1);

        let next = MapData::carrying_base(&first);
        assert_eq!(next.base_time, Some(100.0));
        assert_eq!(next.base_name.as_deref(), Some("dev"));
        assert_eq!(next.base_version, Some(1));
        assert_eq!(next.name, None);
        assert_eq!(next.value, None);
    }

    #[test]
    fn bool_coercion() {
        assert_eq!(MapData::new().with_bool(true).as_bool(), Some(true));
        assert_eq!(MapData::new().with_value(0.0).as_bool(), Some(false));
        assert_eq!(MapData::new().with_value(1.0).as_bool(), Some(true));
        assert_eq!(MapData::new().with_value(2.0).as_bool(), None);
        assert_eq!(MapData::new().as_bool(), None);
    }

    #[test]
    fn numeric_narrowing() {
        let record = MapData::new().with_value(-7.9);
        assert_eq!(record.as_i32(), Some(-7));
        assert_eq!(record.as_u32(), Some(0));
        assert_eq!(record.as_f32(), Some(-7.9f32));
    }
}
