// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device type tags.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Tag distinguishing the three device variants.
///
/// The string form (`light`, `rgb_light`, `sensor`) is what appears in the
/// persisted state file and on the control surface.
///
/// # Examples
///
/// ```
/// use casita_lib::types::DeviceType;
///
/// let parsed: DeviceType = "rgb_light".parse().unwrap();
/// assert_eq!(parsed, DeviceType::RgbLight);
/// assert_eq!(parsed.as_str(), "rgb_light");
///
/// assert!("dishwasher".parse::<DeviceType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Plain on/off light.
    Light,
    /// RGB light with color control.
    RgbLight,
    /// Read-only sensor.
    Sensor,
}

impl DeviceType {
    /// All known device types, in catalog order.
    pub const ALL: [Self; 3] = [Self::Light, Self::RgbLight, Self::Sensor];

    /// Returns the wire-format tag for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::RgbLight => "rgb_light",
            Self::Sensor => "sensor",
        }
    }

    /// Returns the human-readable display name for this type.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Light => "Standard light",
            Self::RgbLight => "RGB light",
            Self::Sensor => "Sensor",
        }
    }

    /// Returns the fixed device-type catalog exposed on the control surface.
    #[must_use]
    pub fn catalog() -> Vec<DeviceTypeEntry> {
        Self::ALL
            .into_iter()
            .map(|value| DeviceTypeEntry {
                value,
                name: value.display_name(),
            })
            .collect()
    }
}

/// One entry of the device-type catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DeviceTypeEntry {
    /// The wire-format tag.
    pub value: DeviceType,
    /// The display name.
    pub name: &'static str,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "rgb_light" => Ok(Self::RgbLight),
            "sensor" => Ok(Self::Sensor),
            other => Err(ValueError::InvalidDeviceType(other.to_string())),
        }
    }
}
