//! Light switches with color or brightness.

use crate::record::MapData;
use crate::value::{float_differs, Attribute, CloudValue};

use super::Color;

/// A switchable light with full color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColoredLight {
    /// On/off.
    pub swi: bool,
    /// Color while on.
    pub color: Color,
}

impl ColoredLight {
    /// Creates a colored light.
    pub fn new(swi: bool, hue: f32, sat: f32, bri: f32) -> Self {
        Self {
            swi,
            color: Color::new(hue, sat, bri),
        }
    }
}

into_value!(ColoredLight, ColoredLight);

impl CloudValue for ColoredLight {
    const KIND: &'static str = "colored light";
    const ATTRIBUTES: &'static [&'static str] = &["swi", "hue", "sat", "bri"];

    fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
        match slot {
            0 => Some(Attribute::Bool(self.swi)),
            n => self.color.attribute(n - 1),
        }
    }

    fn set_attribute(&mut self, slot: usize, record: &MapData) {
        match slot {
            0 => {
                if let Some(b) = record.as_bool() {
                    self.swi = b;
                }
            }
            n => self.color.set_attribute(n - 1, record),
        }
    }

    fn differs_from(&self, other: &Self, min_delta: f32) -> bool {
        self.swi != other.swi || self.color.differs_with_delta(&other.color, min_delta)
    }

    value_accessors!(ColoredLight);
}

/// A switchable light with brightness only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DimmedLight {
    /// On/off.
    pub swi: bool,
    /// Brightness in percent.
    pub bri: f32,
}

impl DimmedLight {
    /// Creates a dimmed light.
    pub fn new(swi: bool, bri: f32) -> Self {
        Self { swi, bri }
    }
}

into_value!(DimmedLight, DimmedLight);

impl CloudValue for DimmedLight {
    const KIND: &'static str = "dimmed light";
    const ATTRIBUTES: &'static [&'static str] = &["swi", "bri"];

    fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
        match slot {
            0 => Some(Attribute::Bool(self.swi)),
            1 => Some(Attribute::Float(self.bri)),
            _ => None,
        }
    }

    fn set_attribute(&mut self, slot: usize, record: &MapData) {
        match slot {
            0 => {
                if let Some(b) = record.as_bool() {
                    self.swi = b;
                }
            }
            1 => {
                if let Some(v) = record.as_f32() {
                    self.bri = v;
                }
            }
            _ => {}
        }
    }

    fn differs_from(&self, other: &Self, min_delta: f32) -> bool {
        self.swi != other.swi || float_differs(self.bri, other.bri, min_delta)
    }

    value_accessors!(DimmedLight);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colored_light_slots() {
        let mut light = ColoredLight::new(true, 10.0, 20.0, 30.0);
        assert_eq!(light.attribute(0), Some(Attribute::Bool(true)));
        assert_eq!(light.attribute(3), Some(Attribute::Float(30.0)));
        assert_eq!(light.attribute(4), None);

        light.set_attribute(0, &MapData::named("l:swi").with_value(0.0));
        light.set_attribute(2, &MapData::named("l:sat").with_value(55.0));
        assert!(!light.swi);
        assert_eq!(light.color.sat, 55.0);
    }

    #[test]
    fn switch_alone_makes_a_difference() {
        let on = ColoredLight::new(true, 1.0, 1.0, 1.0);
        let off = ColoredLight::new(false, 1.0, 1.0, 1.0);
        assert!(on.differs_from(&off, 100.0));

        let dim_on = DimmedLight::new(true, 40.0);
        assert!(dim_on.differs_from(&DimmedLight::new(false, 40.0), 100.0));
        assert!(!dim_on.differs_from(&DimmedLight::new(true, 41.0), 5.0));
    }

    #[test]
    fn dimmed_light_ignores_unusable_records() {
        let mut light = DimmedLight::new(true, 40.0);
        light.set_attribute(0, &MapData::named("d:swi").with_value(7.0));
        light.set_attribute(1, &MapData::named("d:bri").with_string("bright"));
        assert_eq!(light, DimmedLight::new(true, 40.0));
    }
}
