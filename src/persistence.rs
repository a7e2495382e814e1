// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State persistence.
//!
//! Two independent JSON files back the controller:
//!
//! - the **state file** holds the whole home registry as a flat list of
//!   device records plus the known room names, rewritten wholesale after
//!   every mutation;
//! - the **mapping file** holds the remote range-code table, loaded once
//!   at startup and overwritten wholesale on each update.
//!
//! Saves are plain whole-file overwrites. A crash mid-write can corrupt
//! the file; callers accept this durability gap in exchange for keeping
//! the control plane available (write failures are logged by the
//! controller, the in-memory mutation stands).
//!
//! The record layout mirrors the historical wire format: `rooms` maps
//! every room name to an empty array (membership is reconstructed from
//! each record's `room` field, not from this array) and the extra fields
//! `brightness`/`color`/`value` are captured ad hoc per variant rather
//! than through [`Device::additional_state`]. The encoder `mode`/`hsv`
//! of RGB lights are not persisted at all, so the encoder axis resets to
//! hue on every restart.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::json;

use crate::device::{Device, DeviceKind};
use crate::error::PersistenceError;
use crate::home::Home;
use crate::remote::RangeMappings;
use crate::types::{DeviceAddress, DeviceType, HexColor};

/// One persisted device record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct DeviceRecord {
    name: String,
    #[serde(rename = "type")]
    device_type: String,
    address: DeviceAddress,
    room: String,
    #[serde(default)]
    status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
}

impl DeviceRecord {
    fn capture(room: &str, device: &Device) -> Self {
        let mut record = Self {
            name: device.name().to_string(),
            device_type: device.device_type().as_str().to_string(),
            address: device.address().clone(),
            room: room.to_string(),
            status: device.status(),
            brightness: None,
            color: None,
            value: None,
        };
        match device.kind() {
            DeviceKind::Light { brightness } => record.brightness = *brightness,
            DeviceKind::RgbLight { color, .. } => record.color = Some(color.as_str().to_string()),
            DeviceKind::Sensor { value } => record.value = Some(value.clone()),
        }
        record
    }

    /// Rebuilds a device from this record, dispatching on the type tag.
    ///
    /// Returns `None` (after logging) when the tag is unknown; missing
    /// optional fields fall back to the variant defaults.
    fn restore(&self) -> Option<Device> {
        let Ok(device_type) = self.device_type.parse::<DeviceType>() else {
            tracing::warn!(
                name = %self.name,
                device_type = %self.device_type,
                "Skipping device record with unknown type"
            );
            return None;
        };

        let device = match device_type {
            DeviceType::Light => {
                Device::light(&self.name, self.address.clone()).with_brightness(self.brightness)
            }
            DeviceType::RgbLight => {
                let color = match self.color.as_deref().map(HexColor::new) {
                    Some(Ok(color)) => color,
                    Some(Err(err)) => {
                        tracing::warn!(
                            name = %self.name,
                            error = %err,
                            "Persisted color is invalid, falling back to default"
                        );
                        HexColor::white()
                    }
                    None => HexColor::white(),
                };
                Device::rgb_light(&self.name, self.address.clone()).with_color(color)
            }
            DeviceType::Sensor => Device::sensor(&self.name, self.address.clone())
                .with_value(self.value.clone().unwrap_or(json!(21.5))),
        };

        Some(device.with_status(self.status))
    }
}

/// The on-disk shape of the state file.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PersistedState {
    /// Room names, each mapped to an always-empty array. The redundant
    /// shape is kept for compatibility with existing files.
    #[serde(default)]
    rooms: IndexMap<String, Vec<serde_json::Value>>,
    /// Flat list of device records; each knows its owning room.
    #[serde(default)]
    devices: Vec<serde_json::Value>,
}

/// Persists the home registry as a JSON file.
///
/// # Examples
///
/// ```no_run
/// use casita_lib::home::Home;
/// use casita_lib::persistence::StateFile;
///
/// let file = StateFile::new("smart_home_state.json");
/// let mut home = Home::new();
/// file.load(&mut home).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Creates a state file handle for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the full replacement content of the state file.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if serialization or the write
    /// fails. The registry itself is never touched.
    pub fn save(&self, home: &Home) -> Result<(), PersistenceError> {
        let mut state = PersistedState::default();
        for room in home.rooms() {
            state.rooms.insert(room.name().to_string(), Vec::new());
            for device in room.devices() {
                let record = DeviceRecord::capture(room.name(), device);
                state.devices.push(serde_json::to_value(record)?);
            }
        }

        let contents = serde_json::to_string_pretty(&state)?;
        fs::write(&self.path, contents)?;

        tracing::debug!(path = %self.path.display(), "Saved home state");
        Ok(())
    }

    /// Rebuilds the registry from the state file.
    ///
    /// An absent file leaves the registry empty. Otherwise the registry
    /// is cleared and rebuilt: rooms first, then each device record.
    /// Records with an unknown type tag or an undecodable shape are
    /// skipped with a warning; records naming an unknown room are
    /// silently skipped. No default devices are ever fabricated.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the file cannot be read or its
    /// top-level JSON is malformed. The registry is left in whatever
    /// state the load reached.
    pub fn load(&self, home: &mut Home) -> Result<(), PersistenceError> {
        if !self.path.exists() {
            tracing::info!(
                path = %self.path.display(),
                "No state file found, starting empty"
            );
            return Ok(());
        }

        let contents = fs::read_to_string(&self.path)?;
        let state: PersistedState = serde_json::from_str(&contents)?;

        home.clear();

        for room in state.rooms.keys() {
            if let Err(err) = home.add_room(room) {
                tracing::warn!(room = %room, error = %err, "Skipping duplicate room");
            }
        }

        for raw in state.devices {
            let record: DeviceRecord = match serde_json::from_value(raw) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping undecodable device record");
                    continue;
                }
            };
            if home.room(&record.room).is_none() {
                // Membership comes from the record itself; a record whose
                // room is not in the room list is dropped without noise.
                tracing::debug!(
                    name = %record.name,
                    room = %record.room,
                    "Skipping device record with unknown room"
                );
                continue;
            }
            let Some(device) = record.restore() else {
                continue;
            };
            if let Err(err) = home.add_device(&record.room, device) {
                tracing::warn!(name = %record.name, error = %err, "Skipping device record");
            }
        }

        tracing::info!(
            path = %self.path.display(),
            rooms = home.len(),
            "Loaded home state"
        );
        Ok(())
    }
}

/// Persists the remote range-mapping table as a JSON file.
#[derive(Debug, Clone)]
pub struct MappingFile {
    path: PathBuf,
}

impl MappingFile {
    /// Creates a mapping file handle for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the mapping file with the given table.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if serialization or the write
    /// fails.
    pub fn save(&self, mappings: &RangeMappings) -> Result<(), PersistenceError> {
        let contents = serde_json::to_string_pretty(mappings)?;
        fs::write(&self.path, contents)?;

        tracing::debug!(path = %self.path.display(), "Saved range mappings");
        Ok(())
    }

    /// Reads the mapping table.
    ///
    /// An absent file yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the file cannot be read or
    /// parsed.
    pub fn load(&self) -> Result<RangeMappings, PersistenceError> {
        if !self.path.exists() {
            return Ok(RangeMappings::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        let mappings = serde_json::from_str(&contents)?;
        Ok(mappings)
    }
}
