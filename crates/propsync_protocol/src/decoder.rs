//! Inbound message decoder.
//!
//! Reads a SenML array record by record and hands each run of records that
//! address the same property to [`PropertyContainer::apply`] as one group.

use propsync_codec::{CborReader, CodecError, CodecResult, Length, MajorType};
use propsync_core::{MapData, PropertyContainer, SenmlKey};
use tracing::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::error::{DecodeError, DecodeResult};

/// Decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    EnterMap,
    MapKey,
    UndefinedKey,
    BaseVersion,
    BaseName,
    BaseTime,
    Name,
    Value,
    StringValue,
    BooleanValue,
    Time,
    LeaveMap,
    Complete,
    Error,
}

/// Records addressed to one property, waiting to be applied.
#[derive(Debug, Default)]
struct Group {
    name: String,
    base_time: f64,
    time: f64,
    records: Vec<MapData>,
}

impl Group {
    /// Event time of the group, whole seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn event_time(&self) -> u64 {
        let time = self.base_time + self.time;
        if time.is_finite() && time > 0.0 {
            time as u64
        } else {
            0
        }
    }
}

/// Working state of one `decode` call.
struct Context<'a> {
    reader: CborReader<'a>,
    array: Length,
    map: Length,
    record: MapData,
    group: Group,
    applied: usize,
    error: Option<DecodeError>,
}

/// Stateful decoder applying received messages to a [`PropertyContainer`].
#[derive(Debug, Default)]
pub struct MessageDecoder {
    config: DecoderConfig,
}

impl MessageDecoder {
    /// Creates a decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `payload` and applies it to `container`.
    ///
    /// `is_sync_message` routes every group through the property's sync
    /// callback instead of the regular write path. Returns the number of
    /// groups applied. On error the rest of the payload is ignored; groups
    /// completed before the error stay applied.
    pub fn decode(
        &mut self,
        container: &mut PropertyContainer,
        payload: &[u8],
        is_sync_message: bool,
    ) -> DecodeResult<usize> {
        let mut reader = CborReader::new(payload);
        if reader.peek_type()? != MajorType::Array {
            return Err(DecodeError::NotAnArray);
        }
        let array = reader.read_array_start()?;

        let mut ctx = Context {
            reader,
            array,
            map: Length::Definite(0),
            record: MapData::new(),
            group: Group::default(),
            applied: 0,
            error: None,
        };

        let mut state = DecoderState::EnterMap;
        loop {
            let next = match state {
                DecoderState::EnterMap => Self::handle_enter_map(&mut ctx),
                DecoderState::MapKey => Self::handle_map_key(&mut ctx),
                DecoderState::UndefinedKey => Self::handle_undefined_key(&mut ctx),
                DecoderState::BaseVersion => Self::handle_base_version(&mut ctx),
                DecoderState::BaseName => self.handle_base_name(&mut ctx),
                DecoderState::BaseTime => Self::handle_base_time(&mut ctx),
                DecoderState::Name => self.handle_name(&mut ctx, container),
                DecoderState::Value => Self::handle_value(&mut ctx),
                DecoderState::StringValue => self.handle_string_value(&mut ctx),
                DecoderState::BooleanValue => Self::handle_boolean_value(&mut ctx),
                DecoderState::Time => Self::handle_time(&mut ctx),
                DecoderState::LeaveMap => Self::handle_leave_map(&mut ctx, container, is_sync_message),
                DecoderState::Complete => {
                    Self::flush(&mut ctx, container, is_sync_message);
                    return Ok(ctx.applied);
                }
                DecoderState::Error => {
                    let error = ctx.error.take().unwrap_or(DecodeError::NotAMap);
                    warn!(%error, applied = ctx.applied, "decode aborted");
                    return Err(error);
                }
            };
            state = next.unwrap_or_else(|error| {
                ctx.error = Some(error);
                DecoderState::Error
            });
        }
    }

    fn handle_enter_map(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        if next_item(&mut ctx.reader, &mut ctx.array)? {
            return Ok(DecoderState::Complete);
        }
        if ctx.reader.peek_type()? != MajorType::Map {
            return Err(DecodeError::NotAMap);
        }
        ctx.map = ctx.reader.read_map_start()?;
        ctx.record = MapData::carrying_base(&ctx.record);
        Ok(DecoderState::MapKey)
    }

    fn handle_map_key(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        if next_item(&mut ctx.reader, &mut ctx.map)? {
            return Ok(DecoderState::LeaveMap);
        }
        if !ctx.reader.peek_type()?.is_integer() {
            return Err(DecodeError::NonIntegerKey);
        }
        // Keys outside the i64 range are consumed and treated as unknown.
        let key = match ctx.reader.read_int() {
            Ok(key) => Some(key),
            Err(CodecError::IntegerOverflow) => None,
            Err(error) => return Err(error.into()),
        };
        Ok(match key.and_then(SenmlKey::from_code) {
            Some(SenmlKey::BaseVersion) => DecoderState::BaseVersion,
            Some(SenmlKey::BaseName) => DecoderState::BaseName,
            Some(SenmlKey::BaseTime) => DecoderState::BaseTime,
            Some(SenmlKey::Name) => DecoderState::Name,
            Some(SenmlKey::Value) => DecoderState::Value,
            Some(SenmlKey::StringValue) => DecoderState::StringValue,
            Some(SenmlKey::BooleanValue) => DecoderState::BooleanValue,
            Some(SenmlKey::Time) => DecoderState::Time,
            _ => {
                trace!(?key, "unhandled key skipped");
                DecoderState::UndefinedKey
            }
        })
    }

    fn handle_undefined_key(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        ctx.reader.skip_value()?;
        Ok(DecoderState::MapKey)
    }

    fn handle_base_version(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        let version = field(SenmlKey::BaseVersion, ctx.reader.read_int())?;
        ctx.record.base_version = Some(version);
        Ok(DecoderState::MapKey)
    }

    fn handle_base_name(&self, ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        let name = field(SenmlKey::BaseName, ctx.reader.read_text(self.config.max_string_len))?;
        ctx.record.base_name = Some(name);
        Ok(DecoderState::MapKey)
    }

    fn handle_base_time(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        let time = field(SenmlKey::BaseTime, ctx.reader.read_number())?;
        ctx.record.base_time = Some(time);
        Ok(DecoderState::MapKey)
    }

    fn handle_name(
        &self,
        ctx: &mut Context<'_>,
        container: &PropertyContainer,
    ) -> DecodeResult<DecoderState> {
        match ctx.reader.peek_type()? {
            MajorType::Text => {
                let name = field(SenmlKey::Name, ctx.reader.read_text(self.config.max_string_len))?;
                ctx.record.name = Some(name);
            }
            MajorType::Unsigned => {
                let id = field(SenmlKey::Name, ctx.reader.read_unsigned())?;
                let id = u32::try_from(id).map_err(|_| DecodeError::MalformedField {
                    key: SenmlKey::Name.to_code(),
                })?;
                ctx.record.property_id = Some(id & 0xff);
                ctx.record.attribute_id = Some(id >> 8);
                ctx.record.name = container.name_of(id).map(str::to_string);
                if ctx.record.name.is_none() {
                    warn!(identifier = id, "record for unknown identifier dropped");
                }
            }
            _ => {
                return Err(DecodeError::MalformedField {
                    key: SenmlKey::Name.to_code(),
                })
            }
        }
        Ok(DecoderState::MapKey)
    }

    fn handle_value(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        let value = field(SenmlKey::Value, ctx.reader.read_number())?;
        ctx.record.value = Some(value);
        Ok(DecoderState::MapKey)
    }

    fn handle_string_value(&self, ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        let value = field(
            SenmlKey::StringValue,
            ctx.reader.read_text(self.config.max_string_len),
        )?;
        ctx.record.string_value = Some(value);
        Ok(DecoderState::MapKey)
    }

    fn handle_boolean_value(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        let value = field(SenmlKey::BooleanValue, ctx.reader.read_bool())?;
        ctx.record.bool_value = Some(value);
        Ok(DecoderState::MapKey)
    }

    fn handle_time(ctx: &mut Context<'_>) -> DecodeResult<DecoderState> {
        let time = field(SenmlKey::Time, ctx.reader.read_number())?;
        ctx.record.time = Some(time);
        Ok(DecoderState::MapKey)
    }

    fn handle_leave_map(
        ctx: &mut Context<'_>,
        container: &mut PropertyContainer,
        is_sync_message: bool,
    ) -> DecodeResult<DecoderState> {
        let Some(property) = ctx.record.property_name().map(str::to_string) else {
            trace!("nameless record dropped");
            return Ok(DecoderState::EnterMap);
        };

        if !ctx.group.records.is_empty() && ctx.group.name != property {
            Self::flush(ctx, container, is_sync_message);
        }
        if let Some(base_time) = ctx.record.base_time {
            ctx.group.base_time = base_time;
        }
        if let Some(time) = ctx.record.time {
            ctx.group.time = ctx.group.time.max(time);
        }
        ctx.group.name = property;
        ctx.group.records.push(ctx.record.clone());
        Ok(DecoderState::EnterMap)
    }

    fn flush(ctx: &mut Context<'_>, container: &mut PropertyContainer, is_sync_message: bool) {
        let group = std::mem::take(&mut ctx.group);
        if group.records.is_empty() {
            return;
        }
        let event_time = group.event_time();
        debug!(
            property = %group.name,
            records = group.records.len(),
            event_time,
            "applying group"
        );
        if container.apply(&group.name, event_time, is_sync_message, &group.records) {
            ctx.applied += 1;
        }
    }
}

/// Advances past the end of a container if it is reached.
///
/// Returns true when the container is exhausted; otherwise accounts for the
/// item about to be read.
fn next_item(reader: &mut CborReader<'_>, remaining: &mut Length) -> CodecResult<bool> {
    match remaining {
        Length::Definite(0) => Ok(true),
        Length::Definite(n) => {
            *n -= 1;
            Ok(false)
        }
        Length::Indefinite => {
            if reader.at_break()? {
                reader.read_break()?;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}

/// Maps a type mismatch on a known key to [`DecodeError::MalformedField`].
fn field<T>(key: SenmlKey, result: CodecResult<T>) -> DecodeResult<T> {
    result.map_err(|error| match error {
        CodecError::UnexpectedType { .. } | CodecError::IntegerOverflow => {
            DecodeError::MalformedField { key: key.to_code() }
        }
        other => DecodeError::Codec(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use propsync_core::{ManualClock, Permission, Value};
    use std::sync::Arc;

    fn container() -> PropertyContainer {
        let mut c = PropertyContainer::new(Arc::new(ManualClock::new(0, 0)));
        c.add("test", Permission::ReadWrite, 0i32);
        c
    }

    #[test]
    fn single_int() {
        let mut c = container();
        // [{0: "test", 2: 7}]
        let payload = [0x81, 0xa2, 0x00, 0x64, b't', b'e', b's', b't', 0x02, 0x07];
        assert_eq!(MessageDecoder::new().decode(&mut c, &payload, false), Ok(1));
        assert_eq!(c.get("test").unwrap().value(), &Value::Int(7));
    }

    #[test]
    fn top_level_must_be_array() {
        let mut c = container();
        assert_eq!(
            MessageDecoder::new().decode(&mut c, &[0xa0], false),
            Err(DecodeError::NotAnArray)
        );
        assert_eq!(
            MessageDecoder::new().decode(&mut c, &[0x81, 0x01], false),
            Err(DecodeError::NotAMap)
        );
        assert!(matches!(
            MessageDecoder::new().decode(&mut c, &[], false),
            Err(DecodeError::Codec(CodecError::UnexpectedEof))
        ));
    }

    #[test]
    fn text_key_is_rejected() {
        let mut c = container();
        // [{"n": "test"}]
        let payload = [0x81, 0xa1, 0x61, b'n', 0x64, b't', b'e', b's', b't'];
        assert_eq!(
            MessageDecoder::new().decode(&mut c, &payload, false),
            Err(DecodeError::NonIntegerKey)
        );
    }

    #[test]
    fn wrong_value_type_is_malformed() {
        let mut c = container();
        // [{0: "test", 2: "x"}]
        let payload = [0x81, 0xa2, 0x00, 0x64, b't', b'e', b's', b't', 0x02, 0x61, b'x'];
        assert_eq!(
            MessageDecoder::new().decode(&mut c, &payload, false),
            Err(DecodeError::MalformedField { key: 2 })
        );
        assert_eq!(c.get("test").unwrap().value(), &Value::Int(0));
    }

    #[test]
    fn key_beyond_i64_is_skipped() {
        let mut c = container();
        // [{0: "test", 2: 7, 2^63: 1, -2^64: 2}]
        let payload = [
            0x81, 0xa4, 0x00, 0x64, b't', b'e', b's', b't', 0x02, 0x07, 0x1b, 0x80, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0x02,
        ];
        assert_eq!(MessageDecoder::new().decode(&mut c, &payload, false), Ok(1));
        assert_eq!(c.get("test").unwrap().value(), &Value::Int(7));
    }

    #[test]
    fn empty_arrays() {
        let mut c = container();
        assert_eq!(MessageDecoder::new().decode(&mut c, &[0x80], false), Ok(0));
        assert_eq!(MessageDecoder::new().decode(&mut c, &[0x9f, 0xff], false), Ok(0));
    }

    #[test]
    fn group_event_time() {
        let group = Group {
            base_time: 1_000.0,
            time: 5.9,
            ..Group::default()
        };
        assert_eq!(group.event_time(), 1_005);
        let negative = Group {
            base_time: -10.0,
            ..Group::default()
        };
        assert_eq!(negative.event_time(), 0);
    }
}
