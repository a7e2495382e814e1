// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote-encoder control.
//!
//! A rotary-encoder remote identifies its target by a numeric range code.
//! The [`RangeMappings`] table resolves a range code to a device address;
//! [`translate`] interprets an encoder/button event against the table and
//! the registry and produces the resulting state mutation.
//!
//! Translation itself performs no I/O: it returns a [`Translation`]
//! describing the outcome, the best-effort command to deliver (if any)
//! and whether the registry must be re-persisted. The controller acts on
//! those.

use indexmap::IndexMap;

use crate::command::DeviceCommand;
use crate::device::{DeviceSnapshot, EncoderMode};
use crate::error::Error;
use crate::home::Home;
use crate::types::{DeviceAddress, DeviceType, HexColor};

/// Degrees of hue added per encoder step.
pub const HUE_STEP_DEGREES: i32 = 10;

/// Saturation points added per encoder step.
pub const SATURATION_STEP: i32 = 5;

/// Persisted mapping from range code to device address.
///
/// The table is always read and replaced as a whole. Mappings are not
/// checked against the registry; a range may point at an address no
/// device carries, which surfaces as a lookup failure at use time.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RangeMappings(IndexMap<String, DeviceAddress>);

impl RangeMappings {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a range code to a device address.
    #[must_use]
    pub fn address_for(&self, range: &str) -> Option<&DeviceAddress> {
        self.0.get(range)
    }

    /// Returns the number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table has no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(range code, address)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DeviceAddress)> {
        self.0.iter()
    }
}

impl From<IndexMap<String, DeviceAddress>> for RangeMappings {
    fn from(map: IndexMap<String, DeviceAddress>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, DeviceAddress)> for RangeMappings {
    fn from_iter<T: IntoIterator<Item = (String, DeviceAddress)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An incoming event from the remote encoder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct RemoteEvent {
    /// Range code identifying the target device.
    pub range: String,
    /// Signed encoder rotation since the last event.
    pub encoder: i32,
    /// Whether the encoder button was pressed.
    pub button: bool,
}

impl RemoteEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(range: impl Into<String>, encoder: i32, button: bool) -> Self {
        Self {
            range: range.into(),
            encoder,
            button,
        }
    }

    /// Creates a pure button-press event.
    #[must_use]
    pub fn button_press(range: impl Into<String>) -> Self {
        Self::new(range, 0, true)
    }

    /// Creates a pure rotation event.
    #[must_use]
    pub fn rotation(range: impl Into<String>, encoder: i32) -> Self {
        Self::new(range, encoder, false)
    }
}

/// The externally visible result of a remote event.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoteOutcome {
    /// A plain light was toggled.
    Toggled {
        /// Snapshot of the device after the toggle.
        device: DeviceSnapshot,
    },
    /// An RGB light received a new color.
    ColorChanged {
        /// The applied color.
        color: HexColor,
        /// Snapshot of the device after the change.
        device: DeviceSnapshot,
    },
    /// Nothing happened. Mode flips without rotation land here too.
    NoAction,
}

/// The full result of translating one remote event.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// The outcome reported to the caller.
    pub outcome: RemoteOutcome,
    /// Best-effort command to deliver to the physical device, if any.
    pub command: Option<DeviceCommand>,
    /// Whether the registry changed and must be re-persisted.
    pub persist: bool,
}

impl Translation {
    fn no_action() -> Self {
        Self {
            outcome: RemoteOutcome::NoAction,
            command: None,
            persist: false,
        }
    }
}

/// Interprets a remote event against the mapping table and the registry.
///
/// Plain lights toggle on a button press and ignore rotation. RGB lights
/// flip their encoder axis on a button press and step hue (10°/step,
/// wrapping) or saturation (5/step, clamped) on rotation, re-rendering
/// the working HSV color to hex. Sensors never react.
///
/// A bare mode flip is not a persisted event: the axis lives only in
/// memory and resets to hue on restart.
///
/// # Errors
///
/// Returns [`Error::UnknownRange`] when the range code has no mapping and
/// [`Error::DeviceNotFound`] when no device carries the mapped address.
/// No device state is mutated in either case.
pub fn translate(
    home: &mut Home,
    mappings: &RangeMappings,
    event: &RemoteEvent,
) -> Result<Translation, Error> {
    let address = mappings
        .address_for(&event.range)
        .ok_or_else(|| Error::UnknownRange(event.range.clone()))?
        .clone();

    let device = home
        .find_by_address_mut(&address)
        .ok_or(Error::DeviceNotFound)?;

    match device.device_type() {
        DeviceType::Light => {
            if !event.button {
                return Ok(Translation::no_action());
            }
            device.toggle();
            tracing::info!(device = device.name(), "Remote toggled light");
            Ok(Translation {
                outcome: RemoteOutcome::Toggled {
                    device: device.snapshot(),
                },
                command: Some(DeviceCommand::Toggle { address }),
                persist: true,
            })
        }
        DeviceType::RgbLight => {
            let mut hsv = device
                .hsv_or_init()
                .unwrap_or_default();

            if event.button {
                device.flip_mode();
            }
            if event.encoder == 0 {
                return Ok(Translation::no_action());
            }

            hsv = match device.mode().unwrap_or_default() {
                EncoderMode::Hue => hsv.rotate_hue(event.encoder * HUE_STEP_DEGREES),
                EncoderMode::Saturation => {
                    hsv.adjust_saturation(event.encoder * SATURATION_STEP)
                }
            };
            device.set_hsv(hsv);

            let color = hsv.to_hex();
            device.set_color(color.as_str())?;
            tracing::info!(
                device = device.name(),
                color = color.as_str(),
                "Remote changed color"
            );

            Ok(Translation {
                outcome: RemoteOutcome::ColorChanged {
                    color: color.clone(),
                    device: device.snapshot(),
                },
                command: Some(DeviceCommand::SetColor { address, color }),
                persist: true,
            })
        }
        DeviceType::Sensor => Ok(Translation::no_action()),
    }
}
