//! HSB color.

use crate::record::MapData;
use crate::value::{float_differs, Attribute, CloudValue};

/// Color in hue (0-360), saturation (0-100) and brightness (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    /// Hue in degrees.
    pub hue: f32,
    /// Saturation in percent.
    pub sat: f32,
    /// Brightness in percent.
    pub bri: f32,
}

impl Color {
    /// Creates a color, or black if any component is out of range.
    pub fn new(hue: f32, sat: f32, bri: f32) -> Self {
        let mut color = Self::default();
        color.set_hsb(hue, sat, bri);
        color
    }

    /// Creates a color from 8-bit RGB components.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let mut color = Self::default();
        color.set_rgb(r, g, b);
        color
    }

    /// Sets all three components.
    ///
    /// Out-of-range input resets the color to black and returns false.
    pub fn set_hsb(&mut self, hue: f32, sat: f32, bri: f32) -> bool {
        let valid = (0.0..=360.0).contains(&hue)
            && (0.0..=100.0).contains(&sat)
            && (0.0..=100.0).contains(&bri);
        if valid {
            *self = Self { hue, sat, bri };
        } else {
            *self = Self::default();
        }
        valid
    }

    /// Sets the color from 8-bit RGB components.
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        let rgb = [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        ];
        let (mut max, mut imax, mut min) = (rgb[0], 0, rgb[0]);
        for (j, &c) in rgb.iter().enumerate() {
            if c >= max {
                max = c;
                imax = j;
            }
            if c <= min {
                min = c;
            }
        }

        let delta = max - min;
        self.hue = if delta == 0.0 {
            0.0
        } else {
            match imax {
                0 => 60.0 * (((rgb[1] - rgb[2]) / delta) % 6.0),
                1 => 60.0 * (((rgb[2] - rgb[0]) / delta) + 2.0),
                _ => 60.0 * (((rgb[0] - rgb[1]) / delta) + 4.0),
            }
        };
        self.sat = if max == 0.0 { 0.0 } else { delta / max * 100.0 };
        self.bri = max * 100.0;
    }

    /// Converts to 8-bit RGB components.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let c = (self.bri / 100.0) * (self.sat / 100.0);
        let h = (self.hue / 60.0) % 6.0;
        let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
        let m = (self.bri / 100.0) - c;

        let (r, g, b) = if (0.0..1.0).contains(&h) {
            (c, x, 0.0)
        } else if (1.0..2.0).contains(&h) {
            (x, c, 0.0)
        } else if (2.0..3.0).contains(&h) {
            (0.0, c, x)
        } else if (3.0..4.0).contains(&h) {
            (0.0, x, c)
        } else if (4.0..5.0).contains(&h) {
            (x, 0.0, c)
        } else if (5.0..6.0).contains(&h) {
            (c, 0.0, x)
        } else {
            (0.0, 0.0, 0.0)
        };

        let to_byte = |v: f32| ((v + m) * 255.0).round() as u8;
        (to_byte(r), to_byte(g), to_byte(b))
    }

    pub(crate) fn differs_with_delta(&self, other: &Color, min_delta: f32) -> bool {
        float_differs(self.hue, other.hue, min_delta)
            || float_differs(self.sat, other.sat, min_delta)
            || float_differs(self.bri, other.bri, min_delta)
    }
}

into_value!(Color, Color);

impl CloudValue for Color {
    const KIND: &'static str = "color";
    const ATTRIBUTES: &'static [&'static str] = &["hue", "sat", "bri"];

    fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
        match slot {
            0 => Some(Attribute::Float(self.hue)),
            1 => Some(Attribute::Float(self.sat)),
            2 => Some(Attribute::Float(self.bri)),
            _ => None,
        }
    }

    fn set_attribute(&mut self, slot: usize, record: &MapData) {
        let Some(v) = record.as_f32() else { return };
        match slot {
            0 => self.hue = v,
            1 => self.sat = v,
            2 => self.bri = v,
            _ => {}
        }
    }

    fn differs_from(&self, other: &Self, min_delta: f32) -> bool {
        self.differs_with_delta(other, min_delta)
    }

    value_accessors!(Color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_black() {
        assert_eq!(Color::new(400.0, 50.0, 50.0), Color::default());
        assert_eq!(Color::new(10.0, -1.0, 50.0), Color::default());
        let c = Color::new(360.0, 100.0, 0.0);
        assert_eq!((c.hue, c.sat, c.bri), (360.0, 100.0, 0.0));
    }

    #[test]
    fn rgb_primaries() {
        let red = Color::from_rgb(255, 0, 0);
        assert_eq!((red.hue, red.sat, red.bri), (0.0, 100.0, 100.0));
        assert_eq!(red.to_rgb(), (255, 0, 0));

        let green = Color::from_rgb(0, 255, 0);
        assert_eq!(green.hue, 120.0);
        assert_eq!(green.to_rgb(), (0, 255, 0));

        let blue = Color::from_rgb(0, 0, 255);
        assert_eq!(blue.hue, 240.0);
        assert_eq!(blue.to_rgb(), (0, 0, 255));
    }

    #[test]
    fn rgb_greys_have_no_hue() {
        let white = Color::from_rgb(255, 255, 255);
        assert_eq!((white.hue, white.sat, white.bri), (0.0, 0.0, 100.0));
        assert_eq!(white.to_rgb(), (255, 255, 255));

        let black = Color::from_rgb(0, 0, 0);
        assert_eq!(black, Color::default());
        assert_eq!(black.to_rgb(), (0, 0, 0));
    }

    #[test]
    fn rgb_round_trip_is_close() {
        for (r, g, b) in [(12, 200, 99), (250, 128, 3), (77, 77, 200)] {
            let (r2, g2, b2) = Color::from_rgb(r, g, b).to_rgb();
            assert!(r.abs_diff(r2) <= 1 && g.abs_diff(g2) <= 1 && b.abs_diff(b2) <= 1);
        }
    }

    #[test]
    fn any_component_change_differs() {
        let a = Color::new(10.0, 20.0, 30.0);
        assert!(!a.differs_from(&a, 0.0));
        assert!(a.differs_from(&Color::new(10.0, 20.0, 31.0), 0.0));
        assert!(!a.differs_from(&Color::new(10.5, 20.0, 30.0), 1.0));
    }
}
