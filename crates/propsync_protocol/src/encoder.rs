//! Outbound message encoder.
//!
//! A message is one indefinite-length CBOR array holding the records of every
//! property that is due, as many as fit in the caller's buffer. Properties
//! that do not fit are picked up by the next call: the encoder remembers
//! where it stopped and resumes from there.

use propsync_codec::CborWriter;
use propsync_core::{EncodeError, PropertyContainer};
use tracing::{debug, trace, warn};

use crate::config::EncoderConfig;

/// Encoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderState {
    Init,
    OpenContainer,
    TryAppend,
    OutOfMemory,
    SkipProperty,
    TrimAppend,
    Close,
    TrimClose,
    FinishAppend,
    Error,
    Done,
}

/// Bookkeeping for one attempt at filling the buffer.
#[derive(Debug, Default)]
struct Pass {
    /// Most properties this attempt may include.
    cap: Option<usize>,
    /// Container indices appended so far.
    included: Vec<usize>,
    /// Properties visited before the attempt stopped.
    scanned: usize,
    /// Container index of the property that did not fit.
    failed: Option<usize>,
    /// Bytes of the finished message.
    length: usize,
}

impl Pass {
    fn cap_reached(&self) -> bool {
        self.cap.is_some_and(|cap| self.included.len() >= cap)
    }
}

/// Stateful encoder producing messages from a [`PropertyContainer`].
#[derive(Debug, Default)]
pub struct MessageEncoder {
    cursor: usize,
    config: EncoderConfig,
}

impl MessageEncoder {
    /// Creates an encoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder with explicit configuration.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self { cursor: 0, config }
    }

    /// Container index the next message starts from.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Active configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encodes the properties that are due into `buf`.
    ///
    /// Returns the number of bytes written; `buf[..n]` is always a complete
    /// CBOR array. Returns 0 if nothing was due, if the property at the
    /// cursor cannot fit even alone (it is skipped for this round) or if
    /// encoding failed.
    pub fn encode(&mut self, container: &mut PropertyContainer, buf: &mut [u8]) -> usize {
        let mut writer = CborWriter::new(buf);
        let mut pass = Pass {
            cap: self.config.max_properties_per_message,
            ..Pass::default()
        };

        let mut state = EncoderState::Init;
        loop {
            state = match state {
                EncoderState::Init => Self::handle_init(&mut writer, &mut pass),
                EncoderState::OpenContainer => Self::handle_open_container(&mut writer),
                EncoderState::TryAppend => self.handle_try_append(container, &mut writer, &mut pass),
                EncoderState::OutOfMemory => Self::handle_out_of_memory(&pass),
                EncoderState::SkipProperty => self.handle_skip_property(container, &pass),
                EncoderState::TrimAppend => Self::handle_trim_append(&mut pass),
                EncoderState::Close => Self::handle_close(&mut writer, &mut pass),
                EncoderState::TrimClose => Self::handle_trim_close(&mut pass),
                EncoderState::FinishAppend => self.handle_finish_append(container, &pass),
                EncoderState::Error => return 0,
                EncoderState::Done => return pass.length,
            };
        }
    }

    fn handle_init(writer: &mut CborWriter<'_>, pass: &mut Pass) -> EncoderState {
        writer.reset();
        pass.included.clear();
        pass.scanned = 0;
        pass.failed = None;
        pass.length = 0;
        EncoderState::OpenContainer
    }

    fn handle_open_container(writer: &mut CborWriter<'_>) -> EncoderState {
        match writer.begin_indefinite_array() {
            Ok(()) => EncoderState::TryAppend,
            Err(error) => {
                warn!(%error, capacity = writer.capacity(), "buffer cannot hold a message");
                EncoderState::Error
            }
        }
    }

    fn handle_try_append(
        &self,
        container: &mut PropertyContainer,
        writer: &mut CborWriter<'_>,
        pass: &mut Pass,
    ) -> EncoderState {
        let len = container.len();
        for offset in 0..len {
            let index = (self.cursor + offset) % len;
            let Some(property) = container.at_mut(index) else {
                break;
            };
            if !property.is_readable_by_cloud() || !property.should_be_updated() {
                continue;
            }
            if pass.cap_reached() {
                pass.scanned = offset;
                return EncoderState::Close;
            }

            match property.append(writer, self.config.use_identifier) {
                Ok(()) => {
                    trace!(property = property.name(), position = writer.position(), "appended");
                    pass.included.push(index);
                }
                Err(EncodeError::OutOfMemory) => {
                    pass.scanned = offset;
                    pass.failed = Some(index);
                    return EncoderState::OutOfMemory;
                }
                Err(EncodeError::SplitItems) => {
                    pass.scanned = offset;
                    pass.failed = Some(index);
                    return EncoderState::TrimAppend;
                }
                Err(EncodeError::Codec(error)) => {
                    warn!(property = property.name(), %error, "property could not be encoded");
                    return EncoderState::Error;
                }
            }
        }
        pass.scanned = len;
        EncoderState::Close
    }

    fn handle_out_of_memory(pass: &Pass) -> EncoderState {
        if pass.included.is_empty() {
            EncoderState::SkipProperty
        } else {
            debug!(included = pass.included.len(), "buffer full, closing message");
            EncoderState::Close
        }
    }

    fn handle_skip_property(&mut self, container: &PropertyContainer, pass: &Pass) -> EncoderState {
        if let Some(index) = pass.failed {
            if let Some(property) = container.at(index) {
                warn!(
                    property = property.name(),
                    "property does not fit in an empty message, skipped"
                );
            }
            self.cursor = (index + 1) % container.len().max(1);
        }
        EncoderState::Done
    }

    fn handle_trim_append(pass: &mut Pass) -> EncoderState {
        if pass.included.is_empty() {
            return EncoderState::SkipProperty;
        }
        debug!(cap = pass.included.len(), "composite property split, retrying without it");
        pass.cap = Some(pass.included.len());
        EncoderState::Init
    }

    fn handle_close(writer: &mut CborWriter<'_>, pass: &mut Pass) -> EncoderState {
        if pass.included.is_empty() {
            return EncoderState::FinishAppend;
        }
        match writer.end_indefinite() {
            Ok(()) => {
                pass.length = writer.position();
                EncoderState::FinishAppend
            }
            Err(error) if error.is_out_of_memory() => EncoderState::TrimClose,
            Err(error) => {
                warn!(%error, "message could not be closed");
                EncoderState::Error
            }
        }
    }

    fn handle_trim_close(pass: &mut Pass) -> EncoderState {
        let cap = pass.included.len().saturating_sub(1);
        if cap == 0 {
            pass.failed = pass.included.first().copied();
            return EncoderState::SkipProperty;
        }
        debug!(cap, "no room for the closing byte, retrying with fewer properties");
        pass.cap = Some(cap);
        EncoderState::Init
    }

    fn handle_finish_append(
        &mut self,
        container: &mut PropertyContainer,
        pass: &Pass,
    ) -> EncoderState {
        for &index in &pass.included {
            if let Some(property) = container.at_mut(index) {
                property.append_completed();
            }
        }
        let len = container.len();
        if len > 0 {
            self.cursor = (self.cursor + pass.scanned) % len;
        }
        if !pass.included.is_empty() {
            debug!(
                properties = pass.included.len(),
                bytes = pass.length,
                cursor = self.cursor,
                "message encoded"
            );
        }
        EncoderState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propsync_core::{ManualClock, Permission};
    use std::sync::Arc;

    fn container() -> PropertyContainer {
        PropertyContainer::new(Arc::new(ManualClock::new(0, 0)))
    }

    #[test]
    fn single_bool() {
        let mut c = container();
        c.add("test", Permission::ReadWrite, true);
        let mut buf = [0u8; 64];
        let n = MessageEncoder::new().encode(&mut c, &mut buf);
        assert_eq!(
            &buf[..n],
            &[0x9f, 0xa2, 0x00, 0x64, 0x74, 0x65, 0x73, 0x74, 0x04, 0xf5, 0xff]
        );
        assert!(!c.get("test").unwrap().is_pending_retransmit());
    }

    #[test]
    fn nothing_due_gives_zero() {
        let mut c = container();
        c.add("test", Permission::ReadWrite, 1i32);
        let mut encoder = MessageEncoder::new();
        let mut buf = [0u8; 64];
        assert!(encoder.encode(&mut c, &mut buf) > 0);
        assert_eq!(encoder.encode(&mut c, &mut buf), 0);
        assert_eq!(encoder.cursor(), 0);
    }

    #[test]
    fn write_only_properties_are_not_sent() {
        let mut c = container();
        c.add("w", Permission::Write, 1i32);
        let mut buf = [0u8; 64];
        assert_eq!(MessageEncoder::new().encode(&mut c, &mut buf), 0);
    }

    #[test]
    fn buffer_without_room_for_framing() {
        let mut c = container();
        c.add("test", Permission::Read, true);
        let mut buf = [0u8; 0];
        assert_eq!(MessageEncoder::new().encode(&mut c, &mut buf), 0);
        assert!(!c.get("test").unwrap().has_been_updated_once());
    }

    #[test]
    fn only_closing_byte_missing_skips_lone_property() {
        let mut c = container();
        c.add("test", Permission::Read, true);
        c.add("x", Permission::Read, true);
        // 0x9f plus the nine-byte record of "test": no room left for 0xff.
        let mut buf = [0u8; 10];
        let mut encoder = MessageEncoder::new();
        assert_eq!(encoder.encode(&mut c, &mut buf), 0);
        assert_eq!(encoder.cursor(), 1);
    }

    #[test]
    fn config_limit_caps_message() {
        let mut c = container();
        for name in ["a", "b", "c"] {
            c.add(name, Permission::Read, 1i32);
        }
        let mut encoder = MessageEncoder::with_config(EncoderConfig::new().max_properties_per_message(2));
        let mut buf = [0u8; 64];
        let n = encoder.encode(&mut c, &mut buf);
        assert_eq!(n, 1 + 2 * 6 + 1);
        assert_eq!(encoder.cursor(), 2);
        let n = encoder.encode(&mut c, &mut buf);
        assert_eq!(n, 1 + 6 + 1);
        // A full lap ends where it started.
        assert_eq!(encoder.cursor(), 2);
    }
}
