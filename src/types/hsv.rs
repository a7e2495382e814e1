// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HSV color representation with encoder-style stepping.

use crate::error::ValueError;

use super::HexColor;

/// HSV color (Hue, Saturation, Value).
///
/// This is the working color space of the remote-encoder control: the
/// encoder rotates the hue around the color wheel (wrapping in both
/// directions) or slides the saturation within its range (clamping at the
/// ends), and the result is rendered to an RGB hex string for the device.
///
/// # Examples
///
/// ```
/// use casita_lib::types::HsvColor;
///
/// let red = HsvColor::new(0, 100, 100).unwrap();
/// assert_eq!(red.to_hex().as_str(), "#ff0000");
///
/// // Hue wraps around the wheel
/// let wrapped = HsvColor::new(350, 100, 100).unwrap().rotate_hue(20);
/// assert_eq!(wrapped.hue(), 10);
///
/// // Saturation clamps at its bounds
/// let clamped = HsvColor::new(0, 95, 100).unwrap().adjust_saturation(15);
/// assert_eq!(clamped.saturation(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HsvColor {
    hue: u16,
    saturation: u8,
    value: u8,
}

impl HsvColor {
    /// Creates a new HSV color.
    ///
    /// # Arguments
    ///
    /// * `hue` - Hue in degrees (0-359)
    /// * `saturation` - Saturation percentage (0-100)
    /// * `value` - Value percentage (0-100)
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] if any component is out of range.
    pub fn new(hue: u16, saturation: u8, value: u8) -> Result<Self, ValueError> {
        if hue >= 360 {
            return Err(ValueError::InvalidHue(hue));
        }
        if saturation > 100 {
            return Err(ValueError::InvalidSaturation(saturation));
        }
        if value > 100 {
            return Err(ValueError::InvalidValue(value));
        }
        Ok(Self {
            hue,
            saturation,
            value,
        })
    }

    /// Returns the hue component in degrees (0-359).
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }

    /// Returns the saturation component (0-100).
    #[must_use]
    pub const fn saturation(&self) -> u8 {
        self.saturation
    }

    /// Returns the value component (0-100).
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Rotates the hue by the given number of degrees, wrapping modulo 360
    /// in both directions.
    #[must_use]
    pub fn rotate_hue(self, degrees: i32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hue = (i32::from(self.hue) + degrees).rem_euclid(360) as u16;
        Self { hue, ..self }
    }

    /// Shifts the saturation by the given delta, clamping to [0, 100].
    #[must_use]
    pub fn adjust_saturation(self, delta: i32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let saturation = (i32::from(self.saturation) + delta).clamp(0, 100) as u8;
        Self { saturation, ..self }
    }

    /// Converts this color to RGB channels (0-255 each).
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::many_single_char_names
    )]
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = f32::from(self.saturation) / 100.0;
        let v = f32::from(self.value) / 100.0;
        let h = f32::from(self.hue);

        let c = v * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        (
            ((r + m) * 255.0).round() as u8,
            ((g + m) * 255.0).round() as u8,
            ((b + m) * 255.0).round() as u8,
        )
    }

    /// Renders this color as a lowercase 6-digit hex string.
    ///
    /// This is the wire format sent to RGB lights.
    #[must_use]
    pub fn to_hex(self) -> HexColor {
        let (r, g, b) = self.to_rgb();
        // Always matches #RRGGBB, so the validation cannot fail.
        HexColor::new(format!("#{r:02x}{g:02x}{b:02x}"))
            .expect("formatted hex color is always valid")
    }
}

impl Default for HsvColor {
    /// The encoder starting point: pure red at full saturation and value.
    fn default() -> Self {
        Self {
            hue: 0,
            saturation: 100,
            value: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_components() {
        assert!(HsvColor::new(359, 100, 100).is_ok());
        assert!(matches!(
            HsvColor::new(360, 100, 100),
            Err(ValueError::InvalidHue(360))
        ));
        assert!(matches!(
            HsvColor::new(0, 101, 100),
            Err(ValueError::InvalidSaturation(101))
        ));
        assert!(matches!(
            HsvColor::new(0, 100, 101),
            Err(ValueError::InvalidValue(101))
        ));
    }

    #[test]
    fn default_is_red() {
        let hsv = HsvColor::default();
        assert_eq!(hsv.hue(), 0);
        assert_eq!(hsv.saturation(), 100);
        assert_eq!(hsv.value(), 100);
    }

    #[test]
    fn rotate_hue_wraps_forward() {
        let hsv = HsvColor::new(350, 100, 100).unwrap().rotate_hue(20);
        assert_eq!(hsv.hue(), 10);
    }

    #[test]
    fn rotate_hue_wraps_backward() {
        let hsv = HsvColor::new(10, 100, 100).unwrap().rotate_hue(-30);
        assert_eq!(hsv.hue(), 340);
    }

    #[test]
    fn rotate_hue_leaves_other_components() {
        let hsv = HsvColor::new(0, 50, 75).unwrap().rotate_hue(90);
        assert_eq!(hsv.saturation(), 50);
        assert_eq!(hsv.value(), 75);
    }

    #[test]
    fn adjust_saturation_clamps_high() {
        let hsv = HsvColor::new(0, 95, 100).unwrap().adjust_saturation(15);
        assert_eq!(hsv.saturation(), 100);
    }

    #[test]
    fn adjust_saturation_clamps_low() {
        let hsv = HsvColor::new(0, 5, 100).unwrap().adjust_saturation(-25);
        assert_eq!(hsv.saturation(), 0);
    }

    #[test]
    fn to_rgb_primaries() {
        assert_eq!(HsvColor::new(0, 100, 100).unwrap().to_rgb(), (255, 0, 0));
        assert_eq!(HsvColor::new(120, 100, 100).unwrap().to_rgb(), (0, 255, 0));
        assert_eq!(HsvColor::new(240, 100, 100).unwrap().to_rgb(), (0, 0, 255));
    }

    #[test]
    fn to_rgb_white_and_black() {
        assert_eq!(HsvColor::new(0, 0, 100).unwrap().to_rgb(), (255, 255, 255));
        assert_eq!(HsvColor::new(0, 100, 0).unwrap().to_rgb(), (0, 0, 0));
    }

    #[test]
    fn to_hex_is_lowercase_full_form() {
        let hex = HsvColor::new(0, 100, 100).unwrap().to_hex();
        assert_eq!(hex.as_str(), "#ff0000");
        let hex = HsvColor::new(0, 0, 100).unwrap().to_hex();
        assert_eq!(hex.as_str(), "#ffffff");
    }
}
