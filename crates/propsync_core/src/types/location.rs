//! Geographic position.

use crate::record::MapData;
use crate::value::{float_differs, Attribute, CloudValue};

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    /// Latitude.
    pub lat: f32,
    /// Longitude.
    pub lon: f32,
}

impl Location {
    /// Creates a location.
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Planar distance between two locations, in degrees.
    pub fn distance(&self, other: &Location) -> f32 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

into_value!(Location, Location);

impl CloudValue for Location {
    const KIND: &'static str = "location";
    const ATTRIBUTES: &'static [&'static str] = &["lat", "lon"];

    fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
        match slot {
            0 => Some(Attribute::Float(self.lat)),
            1 => Some(Attribute::Float(self.lon)),
            _ => None,
        }
    }

    fn set_attribute(&mut self, slot: usize, record: &MapData) {
        let Some(v) = record.as_f32() else { return };
        match slot {
            0 => self.lat = v,
            1 => self.lon = v,
            _ => {}
        }
    }

    fn differs_from(&self, other: &Self, min_delta: f32) -> bool {
        let non_finite_change = [(self.lat, other.lat), (self.lon, other.lon)]
            .into_iter()
            .any(|(a, b)| (!a.is_finite() || !b.is_finite()) && float_differs(a, b, 0.0));
        non_finite_change || (self != other && self.distance(other) >= min_delta)
    }

    value_accessors!(Location);
}
