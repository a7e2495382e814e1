// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device model: lights, RGB lights and sensors.
//!
//! A [`Device`] couples the capability record shared by every variant
//! (name, address, on/off status, last-seen timestamp) with a
//! [`DeviceKind`] payload holding the variant-specific fields. Operations
//! dispatch on the kind tag.
//!
//! The model performs no I/O of its own: callers are responsible for
//! persisting changes and for notifying the physical device.

use chrono::{DateTime, Local};
use serde_json::json;

use crate::error::ValueError;
use crate::types::{DeviceAddress, DeviceType, HexColor, HsvColor};

/// Timestamp format used in presentation snapshots.
const LAST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which HSV axis the remote encoder currently adjusts on an RGB light.
///
/// The mode lives only in memory; it is not persisted, so every restart
/// begins in [`EncoderMode::Hue`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderMode {
    /// The encoder rotates the hue.
    #[default]
    Hue,
    /// The encoder slides the saturation.
    Saturation,
}

impl EncoderMode {
    /// Returns the other mode.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Hue => Self::Saturation,
            Self::Saturation => Self::Hue,
        }
    }
}

/// Variant-specific payload of a device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceKind {
    /// Plain on/off light.
    Light {
        /// Brightness carried over from a persisted record, if any.
        /// No control operation sets this; it exists so records that
        /// carry the field survive a save/load round trip.
        brightness: Option<u8>,
    },
    /// RGB light with color control.
    RgbLight {
        /// Current color in hex form.
        color: HexColor,
        /// Encoder working color, initialized on first remote interaction.
        hsv: Option<HsvColor>,
        /// Current encoder axis.
        mode: EncoderMode,
    },
    /// Read-only sensor.
    Sensor {
        /// Last-read value. Starts at a numeric placeholder and is
        /// overwritten with the raw response text by the poller.
        value: serde_json::Value,
    },
}

/// A device registered with the controller.
///
/// # Examples
///
/// ```
/// use casita_lib::device::Device;
///
/// let mut lamp = Device::light("desk", "192.168.1.20");
/// assert!(!lamp.status());
/// assert!(lamp.toggle());
/// assert!(!lamp.toggle());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    name: String,
    address: DeviceAddress,
    status: bool,
    last_seen: Option<DateTime<Local>>,
    kind: DeviceKind,
}

impl Device {
    /// Creates a plain on/off light, initially off.
    #[must_use]
    pub fn light(name: impl Into<String>, address: impl Into<DeviceAddress>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            status: false,
            last_seen: None,
            kind: DeviceKind::Light { brightness: None },
        }
    }

    /// Creates an RGB light.
    ///
    /// RGB lights report `status: true` in every snapshot regardless of
    /// the internal flag, and start out white.
    #[must_use]
    pub fn rgb_light(name: impl Into<String>, address: impl Into<DeviceAddress>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            status: true,
            last_seen: None,
            kind: DeviceKind::RgbLight {
                color: HexColor::white(),
                hsv: None,
                mode: EncoderMode::default(),
            },
        }
    }

    /// Creates a sensor with the numeric placeholder value.
    #[must_use]
    pub fn sensor(name: impl Into<String>, address: impl Into<DeviceAddress>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            status: false,
            last_seen: None,
            kind: DeviceKind::Sensor { value: json!(21.5) },
        }
    }

    // =========================================================================
    // Record restoration helpers
    // =========================================================================

    /// Sets the on/off status, for restoring persisted records.
    #[must_use]
    pub fn with_status(mut self, status: bool) -> Self {
        self.status = status;
        self
    }

    /// Sets the brightness, for restoring persisted light records.
    ///
    /// Has no effect on other variants.
    #[must_use]
    pub fn with_brightness(mut self, value: Option<u8>) -> Self {
        if let DeviceKind::Light { brightness } = &mut self.kind {
            *brightness = value;
        }
        self
    }

    /// Sets the color, for restoring persisted RGB light records.
    ///
    /// Has no effect on other variants.
    #[must_use]
    pub fn with_color(mut self, new_color: HexColor) -> Self {
        if let DeviceKind::RgbLight { color, .. } = &mut self.kind {
            *color = new_color;
        }
        self
    }

    /// Sets the sensor value, for restoring persisted sensor records.
    ///
    /// Has no effect on other variants.
    #[must_use]
    pub fn with_value(mut self, new_value: serde_json::Value) -> Self {
        if let DeviceKind::Sensor { value } = &mut self.kind {
            *value = new_value;
        }
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the network address.
    #[must_use]
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// Returns the raw on/off flag.
    ///
    /// Note that snapshots of RGB lights always present `true` instead.
    #[must_use]
    pub const fn status(&self) -> bool {
        self.status
    }

    /// Returns when the poller last reached this device, if ever.
    #[must_use]
    pub const fn last_seen(&self) -> Option<DateTime<Local>> {
        self.last_seen
    }

    /// Returns the variant payload.
    #[must_use]
    pub const fn kind(&self) -> &DeviceKind {
        &self.kind
    }

    /// Returns the type tag of this device.
    #[must_use]
    pub const fn device_type(&self) -> DeviceType {
        match self.kind {
            DeviceKind::Light { .. } => DeviceType::Light,
            DeviceKind::RgbLight { .. } => DeviceType::RgbLight,
            DeviceKind::Sensor { .. } => DeviceType::Sensor,
        }
    }

    /// Returns the current color of an RGB light.
    #[must_use]
    pub const fn color(&self) -> Option<&HexColor> {
        match &self.kind {
            DeviceKind::RgbLight { color, .. } => Some(color),
            _ => None,
        }
    }

    /// Returns the current encoder axis of an RGB light.
    #[must_use]
    pub const fn mode(&self) -> Option<EncoderMode> {
        match &self.kind {
            DeviceKind::RgbLight { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    /// Returns the encoder working color of an RGB light, if initialized.
    #[must_use]
    pub const fn hsv(&self) -> Option<HsvColor> {
        match &self.kind {
            DeviceKind::RgbLight { hsv: Some(hsv), .. } => Some(*hsv),
            _ => None,
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Flips the on/off status and returns the new value.
    ///
    /// RGB lights flip their internal flag too, but their snapshots keep
    /// presenting `status: true`.
    pub fn toggle(&mut self) -> bool {
        self.status = !self.status;
        self.status
    }

    /// Sets the color of an RGB light.
    ///
    /// On any failure the stored color is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidHexColor`] for strings not matching
    /// `#RGB` / `#RRGGBB`, and [`ValueError::InvalidDeviceType`] when the
    /// device is not an RGB light.
    pub fn set_color(&mut self, color: &str) -> Result<(), ValueError> {
        let DeviceKind::RgbLight { color: current, .. } = &mut self.kind else {
            return Err(ValueError::InvalidDeviceType(
                self.device_type().as_str().to_string(),
            ));
        };
        *current = HexColor::new(color)?;
        Ok(())
    }

    /// Ensures the encoder working color of an RGB light is initialized
    /// and returns it.
    ///
    /// Returns `None` for other variants.
    pub fn hsv_or_init(&mut self) -> Option<HsvColor> {
        match &mut self.kind {
            DeviceKind::RgbLight { hsv, .. } => Some(*hsv.get_or_insert_with(HsvColor::default)),
            _ => None,
        }
    }

    /// Replaces the encoder working color of an RGB light.
    ///
    /// Has no effect on other variants.
    pub fn set_hsv(&mut self, new_hsv: HsvColor) {
        if let DeviceKind::RgbLight { hsv, .. } = &mut self.kind {
            *hsv = Some(new_hsv);
        }
    }

    /// Flips the encoder axis of an RGB light between hue and saturation.
    ///
    /// Has no effect on other variants.
    pub fn flip_mode(&mut self) {
        if let DeviceKind::RgbLight { mode, .. } = &mut self.kind {
            *mode = mode.flipped();
        }
    }

    /// Records a successful poller contact.
    pub fn mark_seen(&mut self, when: DateTime<Local>) {
        self.last_seen = Some(when);
    }

    /// Overwrites a sensor's value.
    ///
    /// Has no effect on other variants.
    pub fn set_sensor_value(&mut self, new_value: serde_json::Value) {
        if let DeviceKind::Sensor { value } = &mut self.kind {
            *value = new_value;
        }
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// Produces the presentation snapshot of this device.
    ///
    /// RGB lights force `status: true` here regardless of the internal
    /// flag and include their color; sensors include their last value.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        let mut snapshot = DeviceSnapshot {
            name: self.name.clone(),
            device_type: self.device_type(),
            address: self.address.clone(),
            status: self.status,
            last_seen: self
                .last_seen
                .map(|seen| seen.format(LAST_SEEN_FORMAT).to_string()),
            color: None,
            value: None,
        };
        match &self.kind {
            DeviceKind::Light { .. } => {}
            DeviceKind::RgbLight { color, .. } => {
                snapshot.status = true;
                snapshot.color = Some(color.clone());
            }
            DeviceKind::Sensor { value } => {
                snapshot.value = Some(value.clone());
            }
        }
        snapshot
    }

    /// Returns the minimal variant-specific fields a device contributes
    /// to persistence on its own behalf.
    ///
    /// Only RGB lights report anything here (`{"color": …}`). The state
    /// file builder captures the remaining extra fields ad hoc instead of
    /// going through this contract; see the persistence module.
    #[must_use]
    pub fn additional_state(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut state = serde_json::Map::new();
        if let DeviceKind::RgbLight { color, .. } = &self.kind {
            state.insert("color".to_string(), json!(color.as_str()));
        }
        state
    }
}

/// Presentation snapshot of a device.
///
/// This is what listing and control operations return to callers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceSnapshot {
    /// Device name.
    pub name: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Network address.
    pub address: DeviceAddress,
    /// Presented on/off status (always `true` for RGB lights).
    pub status: bool,
    /// Last successful poller contact, formatted `YYYY-MM-DD HH:MM:SS`.
    pub last_seen: Option<String>,
    /// Current color (RGB lights only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
    /// Last-read value (sensors only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_starts_off() {
        let lamp = Device::light("desk", "192.168.1.20");
        assert!(!lamp.status());
        assert_eq!(lamp.device_type(), DeviceType::Light);
        assert!(lamp.last_seen().is_none());
    }

    #[test]
    fn toggle_twice_is_idempotent() {
        let mut lamp = Device::light("desk", "192.168.1.20");
        let original = lamp.status();
        assert!(lamp.toggle());
        assert!(!lamp.toggle());
        assert_eq!(lamp.status(), original);
    }

    #[test]
    fn rgb_light_starts_on_and_white() {
        let strip = Device::rgb_light("strip", "192.168.1.30");
        assert!(strip.status());
        assert_eq!(strip.color().unwrap().as_str(), "#ffffff");
        assert_eq!(strip.mode(), Some(EncoderMode::Hue));
        assert!(strip.hsv().is_none());
    }

    #[test]
    fn rgb_toggle_flips_internal_flag_but_snapshot_stays_on() {
        let mut strip = Device::rgb_light("strip", "192.168.1.30");
        strip.toggle();
        assert!(!strip.status());
        assert!(strip.snapshot().status);
    }

    #[test]
    fn set_color_accepts_valid_hex() {
        let mut strip = Device::rgb_light("strip", "192.168.1.30");
        strip.set_color("#AB12ef").unwrap();
        assert_eq!(strip.color().unwrap().as_str(), "#AB12ef");
        strip.set_color("#f00").unwrap();
        assert_eq!(strip.color().unwrap().as_str(), "#f00");
    }

    #[test]
    fn set_color_rejects_invalid_and_keeps_state() {
        let mut strip = Device::rgb_light("strip", "192.168.1.30");
        strip.set_color("#123456").unwrap();
        let err = strip.set_color("red").unwrap_err();
        assert!(matches!(err, ValueError::InvalidHexColor(_)));
        assert_eq!(strip.color().unwrap().as_str(), "#123456");
    }

    #[test]
    fn set_color_on_plain_light_fails() {
        let mut lamp = Device::light("desk", "192.168.1.20");
        let err = lamp.set_color("#ffffff").unwrap_err();
        assert!(matches!(err, ValueError::InvalidDeviceType(_)));
    }

    #[test]
    fn sensor_starts_with_placeholder_value() {
        let sensor = Device::sensor("temp", "192.168.1.40");
        assert_eq!(sensor.snapshot().value, Some(json!(21.5)));
    }

    #[test]
    fn sensor_value_overwrite() {
        let mut sensor = Device::sensor("temp", "192.168.1.40");
        sensor.set_sensor_value(json!("23.1"));
        assert_eq!(sensor.snapshot().value, Some(json!("23.1")));
    }

    #[test]
    fn hsv_initializes_lazily() {
        let mut strip = Device::rgb_light("strip", "192.168.1.30");
        assert!(strip.hsv().is_none());
        let hsv = strip.hsv_or_init().unwrap();
        assert_eq!((hsv.hue(), hsv.saturation(), hsv.value()), (0, 100, 100));
        assert!(strip.hsv().is_some());
    }

    #[test]
    fn hsv_or_init_keeps_existing() {
        let mut strip = Device::rgb_light("strip", "192.168.1.30");
        strip.set_hsv(HsvColor::new(42, 10, 20).unwrap());
        assert_eq!(strip.hsv_or_init().unwrap().hue(), 42);
    }

    #[test]
    fn flip_mode_alternates() {
        let mut strip = Device::rgb_light("strip", "192.168.1.30");
        strip.flip_mode();
        assert_eq!(strip.mode(), Some(EncoderMode::Saturation));
        strip.flip_mode();
        assert_eq!(strip.mode(), Some(EncoderMode::Hue));
    }

    #[test]
    fn snapshot_formats_last_seen() {
        use chrono::TimeZone;

        let mut sensor = Device::sensor("temp", "192.168.1.40");
        assert!(sensor.snapshot().last_seen.is_none());

        let when = Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 9).unwrap();
        sensor.mark_seen(when);
        assert_eq!(
            sensor.snapshot().last_seen.as_deref(),
            Some("2024-03-05 14:30:09")
        );
    }

    #[test]
    fn snapshot_serializes_with_type_tag() {
        let lamp = Device::light("desk", "192.168.1.20");
        let json = serde_json::to_value(lamp.snapshot()).unwrap();
        assert_eq!(json["type"], "light");
        assert_eq!(json["status"], false);
        assert_eq!(json["last_seen"], serde_json::Value::Null);
        assert!(json.get("color").is_none());
        assert!(json.get("value").is_none());
    }

    #[test]
    fn additional_state_only_for_rgb() {
        let lamp = Device::light("desk", "192.168.1.20");
        assert!(lamp.additional_state().is_empty());

        let sensor = Device::sensor("temp", "192.168.1.40");
        assert!(sensor.additional_state().is_empty());

        let strip = Device::rgb_light("strip", "192.168.1.30");
        let state = strip.additional_state();
        assert_eq!(state.get("color"), Some(&json!("#ffffff")));
    }

    #[test]
    fn restoration_helpers_ignore_wrong_variant() {
        let lamp = Device::light("desk", "192.168.1.20")
            .with_color(HexColor::new("#ff0000").unwrap())
            .with_value(json!("ignored"))
            .with_brightness(Some(60));
        assert!(lamp.color().is_none());
        if let DeviceKind::Light { brightness } = lamp.kind() {
            assert_eq!(*brightness, Some(60));
        } else {
            panic!("expected a light");
        }
    }
}
