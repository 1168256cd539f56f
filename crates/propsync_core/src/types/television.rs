//! Television remote state.

use crate::record::MapData;
use crate::value::{Attribute, CloudValue};

/// Playback command sent to a television.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum PlaybackCommand {
    FastForward,
    Next,
    Pause,
    Play,
    Previous,
    Rewind,
    StartOver,
    Stop,
    #[default]
    None,
}

impl PlaybackCommand {
    /// Returns the wire integer.
    pub fn to_code(self) -> i32 {
        match self {
            PlaybackCommand::FastForward => 0,
            PlaybackCommand::Next => 1,
            PlaybackCommand::Pause => 2,
            PlaybackCommand::Play => 3,
            PlaybackCommand::Previous => 4,
            PlaybackCommand::Rewind => 5,
            PlaybackCommand::StartOver => 6,
            PlaybackCommand::Stop => 7,
            PlaybackCommand::None => 255,
        }
    }

    /// Creates a command from its wire integer.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PlaybackCommand::FastForward),
            1 => Some(PlaybackCommand::Next),
            2 => Some(PlaybackCommand::Pause),
            3 => Some(PlaybackCommand::Play),
            4 => Some(PlaybackCommand::Previous),
            5 => Some(PlaybackCommand::Rewind),
            6 => Some(PlaybackCommand::StartOver),
            7 => Some(PlaybackCommand::Stop),
            255 => Some(PlaybackCommand::None),
            _ => None,
        }
    }
}

/// Input source selected on a television.
///
/// Discriminants are the wire integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs, clippy::upper_case_acronyms)]
#[repr(u8)]
pub enum InputValue {
    #[default]
    AUX1 = 0,
    AUX2,
    AUX3,
    AUX4,
    AUX5,
    AUX6,
    AUX7,
    BLURAY,
    CABLE,
    CD,
    COAX1,
    COAX2,
    COMPOSITE1,
    DVD,
    GAME,
    HDRADIO,
    HDMI1,
    HDMI2,
    HDMI3,
    HDMI4,
    HDMI5,
    HDMI6,
    HDMI7,
    HDMI8,
    HDMI9,
    HDMI10,
    HDMIARC,
    INPUT1,
    INPUT2,
    INPUT3,
    INPUT4,
    INPUT5,
    INPUT6,
    INPUT7,
    INPUT8,
    INPUT9,
    INPUT10,
    IPOD,
    LINE1,
    LINE2,
    LINE3,
    LINE4,
    LINE5,
    LINE6,
    LINE7,
    MEDIAPLAYER,
    OPTICAL1,
    OPTICAL2,
    PHONO,
    PLAYSTATION,
    PLAYSTATION3,
    PLAYSTATION4,
    SATELLITE,
    SMARTCAST,
    TUNER,
    TV,
    USBDAC,
    VIDEO1,
    VIDEO2,
    VIDEO3,
    XBOX = 60,
}

impl InputValue {
    const ALL: [InputValue; 61] = [
        InputValue::AUX1,
        InputValue::AUX2,
        InputValue::AUX3,
        InputValue::AUX4,
        InputValue::AUX5,
        InputValue::AUX6,
        InputValue::AUX7,
        InputValue::BLURAY,
        InputValue::CABLE,
        InputValue::CD,
        InputValue::COAX1,
        InputValue::COAX2,
        InputValue::COMPOSITE1,
        InputValue::DVD,
        InputValue::GAME,
        InputValue::HDRADIO,
        InputValue::HDMI1,
        InputValue::HDMI2,
        InputValue::HDMI3,
        InputValue::HDMI4,
        InputValue::HDMI5,
        InputValue::HDMI6,
        InputValue::HDMI7,
        InputValue::HDMI8,
        InputValue::HDMI9,
        InputValue::HDMI10,
        InputValue::HDMIARC,
        InputValue::INPUT1,
        InputValue::INPUT2,
        InputValue::INPUT3,
        InputValue::INPUT4,
        InputValue::INPUT5,
        InputValue::INPUT6,
        InputValue::INPUT7,
        InputValue::INPUT8,
        InputValue::INPUT9,
        InputValue::INPUT10,
        InputValue::IPOD,
        InputValue::LINE1,
        InputValue::LINE2,
        InputValue::LINE3,
        InputValue::LINE4,
        InputValue::LINE5,
        InputValue::LINE6,
        InputValue::LINE7,
        InputValue::MEDIAPLAYER,
        InputValue::OPTICAL1,
        InputValue::OPTICAL2,
        InputValue::PHONO,
        InputValue::PLAYSTATION,
        InputValue::PLAYSTATION3,
        InputValue::PLAYSTATION4,
        InputValue::SATELLITE,
        InputValue::SMARTCAST,
        InputValue::TUNER,
        InputValue::TV,
        InputValue::USBDAC,
        InputValue::VIDEO1,
        InputValue::VIDEO2,
        InputValue::VIDEO3,
        InputValue::XBOX,
    ];

    /// Returns the wire integer.
    pub fn to_code(self) -> i32 {
        i32::from(self as u8)
    }

    /// Creates an input from its wire integer.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Television state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Television {
    /// Power.
    pub swi: bool,
    /// Volume.
    pub vol: i32,
    /// Mute.
    pub mut_: bool,
    /// Last playback command.
    pub pbc: PlaybackCommand,
    /// Selected input.
    pub inp: InputValue,
    /// Channel.
    pub cha: i32,
}

into_value!(Television, Television);

impl CloudValue for Television {
    const KIND: &'static str = "television";
    const ATTRIBUTES: &'static [&'static str] = &["swi", "vol", "mut", "pbc", "inp", "cha"];

    fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
        match slot {
            0 => Some(Attribute::Bool(self.swi)),
            1 => Some(Attribute::Int(i64::from(self.vol))),
            2 => Some(Attribute::Bool(self.mut_)),
            3 => Some(Attribute::Int(i64::from(self.pbc.to_code()))),
            4 => Some(Attribute::Int(i64::from(self.inp.to_code()))),
            5 => Some(Attribute::Int(i64::from(self.cha))),
            _ => None,
        }
    }

    fn set_attribute(&mut self, slot: usize, record: &MapData) {
        match slot {
            0 => self.swi = record.as_bool().unwrap_or(self.swi),
            1 => self.vol = record.as_i32().unwrap_or(self.vol),
            2 => self.mut_ = record.as_bool().unwrap_or(self.mut_),
            3 => {
                if let Some(pbc) = record.as_i32().and_then(PlaybackCommand::from_code) {
                    self.pbc = pbc;
                }
            }
            4 => {
                if let Some(inp) = record.as_i32().and_then(InputValue::from_code) {
                    self.inp = inp;
                }
            }
            5 => self.cha = record.as_i32().unwrap_or(self.cha),
            _ => {}
        }
    }

    fn differs_from(&self, other: &Self, _min_delta: f32) -> bool {
        self != other
    }

    value_accessors!(Television);
}
