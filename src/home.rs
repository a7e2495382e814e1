// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The room/home registry.
//!
//! A [`Home`] owns rooms, each room owns devices by name. Maps preserve
//! insertion order so listings stay stable across calls. Address lookup is
//! a linear scan and returns the first match; address uniqueness across
//! devices is assumed, not enforced.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::device::{Device, DeviceSnapshot};
use crate::error::Error;
use crate::types::{DeviceAddress, DeviceType};

/// The registry shared between the request context and the sensor poller.
pub type SharedHome = Arc<RwLock<Home>>;

/// Nested snapshot of every room's every device.
pub type HomeSnapshot = IndexMap<String, IndexMap<String, DeviceSnapshot>>;

/// A room holding devices keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room {
    name: String,
    devices: IndexMap<String, Device>,
}

impl Room {
    /// Creates an empty room.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            devices: IndexMap::new(),
        }
    }

    /// Returns the room name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of devices in the room.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if the room holds no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Looks up a device by name.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.get(name)
    }

    /// Iterates over the devices in insertion order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Produces snapshots of every device in the room.
    #[must_use]
    pub fn snapshot(&self) -> IndexMap<String, DeviceSnapshot> {
        self.devices
            .iter()
            .map(|(name, device)| (name.clone(), device.snapshot()))
            .collect()
    }
}

/// The top-level registry: rooms keyed by globally unique name.
///
/// # Examples
///
/// ```
/// use casita_lib::device::Device;
/// use casita_lib::home::Home;
///
/// let mut home = Home::new();
/// home.add_room("kitchen").unwrap();
/// home.add_device("kitchen", Device::light("ceiling", "192.168.1.20")).unwrap();
///
/// assert!(home.find_by_address(&"192.168.1.20".into()).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Home {
    rooms: IndexMap<String, Room>,
}

impl Home {
    /// Creates an empty home.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room names in insertion order.
    #[must_use]
    pub fn room_names(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    /// Returns the number of rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns true if the home has no rooms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterates over the rooms in insertion order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Looks up a room by name.
    #[must_use]
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Adds an empty room.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoomExists`] if a room with this name is already
    /// registered.
    pub fn add_room(&mut self, name: &str) -> Result<(), Error> {
        if self.rooms.contains_key(name) {
            return Err(Error::RoomExists(name.to_string()));
        }
        self.rooms.insert(name.to_string(), Room::new(name));
        Ok(())
    }

    /// Adds a device to a room.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoomNotFound`] if the room does not exist and
    /// [`Error::DeviceExists`] if the room already holds a device with the
    /// same name. The registry is unchanged on error.
    pub fn add_device(&mut self, room: &str, device: Device) -> Result<DeviceSnapshot, Error> {
        let Some(target) = self.rooms.get_mut(room) else {
            return Err(Error::RoomNotFound(room.to_string()));
        };
        if target.devices.contains_key(device.name()) {
            return Err(Error::DeviceExists {
                room: room.to_string(),
                name: device.name().to_string(),
            });
        }
        let snapshot = device.snapshot();
        target.devices.insert(device.name().to_string(), device);
        Ok(snapshot)
    }

    /// Looks up a device by room and name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoomNotFound`] or [`Error::DeviceNotFound`].
    pub fn device(&self, room: &str, name: &str) -> Result<&Device, Error> {
        let target = self
            .rooms
            .get(room)
            .ok_or_else(|| Error::RoomNotFound(room.to_string()))?;
        target.devices.get(name).ok_or(Error::DeviceNotFound)
    }

    /// Mutable variant of [`device`](Self::device).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoomNotFound`] or [`Error::DeviceNotFound`].
    pub fn device_mut(&mut self, room: &str, name: &str) -> Result<&mut Device, Error> {
        let target = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| Error::RoomNotFound(room.to_string()))?;
        target.devices.get_mut(name).ok_or(Error::DeviceNotFound)
    }

    /// Finds the first device registered under the given address.
    #[must_use]
    pub fn find_by_address(&self, address: &DeviceAddress) -> Option<&Device> {
        self.rooms
            .values()
            .flat_map(|room| room.devices.values())
            .find(|device| device.address() == address)
    }

    /// Mutable variant of [`find_by_address`](Self::find_by_address).
    #[must_use]
    pub fn find_by_address_mut(&mut self, address: &DeviceAddress) -> Option<&mut Device> {
        self.rooms
            .values_mut()
            .flat_map(|room| room.devices.values_mut())
            .find(|device| device.address() == address)
    }

    /// Produces the nested snapshot of every room's every device.
    #[must_use]
    pub fn snapshot(&self) -> HomeSnapshot {
        self.rooms
            .iter()
            .map(|(name, room)| (name.clone(), room.snapshot()))
            .collect()
    }

    /// Lists the poll targets: `(room, device name, address)` of every
    /// sensor across all rooms.
    ///
    /// The poller snapshots this list at the start of each cycle so that
    /// concurrent registry changes cannot trip the iteration.
    #[must_use]
    pub fn sensor_targets(&self) -> Vec<(String, String, DeviceAddress)> {
        self.rooms
            .iter()
            .flat_map(|(room_name, room)| {
                room.devices
                    .values()
                    .filter(|device| device.device_type() == DeviceType::Sensor)
                    .map(|device| {
                        (
                            room_name.clone(),
                            device.name().to_string(),
                            device.address().clone(),
                        )
                    })
            })
            .collect()
    }

    /// Removes every room and device, for a wholesale reload.
    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_home() -> Home {
        let mut home = Home::new();
        home.add_room("kitchen").unwrap();
        home.add_room("bedroom").unwrap();
        home.add_device("kitchen", Device::light("ceiling", "192.168.1.20"))
            .unwrap();
        home.add_device("kitchen", Device::sensor("temp", "192.168.1.40"))
            .unwrap();
        home.add_device("bedroom", Device::rgb_light("strip", "192.168.1.30"))
            .unwrap();
        home
    }

    #[test]
    fn add_room_rejects_duplicate() {
        let mut home = Home::new();
        home.add_room("kitchen").unwrap();
        let err = home.add_room("kitchen").unwrap_err();
        assert!(matches!(err, Error::RoomExists(name) if name == "kitchen"));
        assert_eq!(home.len(), 1);
    }

    #[test]
    fn add_device_to_missing_room_leaves_registry_unchanged() {
        let mut home = Home::new();
        let err = home
            .add_device("attic", Device::light("lamp", "192.168.1.9"))
            .unwrap_err();
        assert!(matches!(err, Error::RoomNotFound(name) if name == "attic"));
        assert!(home.is_empty());
    }

    #[test]
    fn add_device_rejects_duplicate_name() {
        let mut home = sample_home();
        let err = home
            .add_device("kitchen", Device::light("ceiling", "192.168.1.99"))
            .unwrap_err();
        assert!(matches!(err, Error::DeviceExists { .. }));
        assert_eq!(home.room("kitchen").unwrap().len(), 2);
    }

    #[test]
    fn same_device_name_allowed_across_rooms() {
        let mut home = sample_home();
        home.add_device("bedroom", Device::light("ceiling", "192.168.1.21"))
            .unwrap();
        assert!(home.device("bedroom", "ceiling").is_ok());
    }

    #[test]
    fn device_lookup_errors() {
        let home = sample_home();
        assert!(matches!(
            home.device("attic", "ceiling"),
            Err(Error::RoomNotFound(_))
        ));
        assert!(matches!(
            home.device("kitchen", "nope"),
            Err(Error::DeviceNotFound)
        ));
    }

    #[test]
    fn find_by_address_scans_all_rooms() {
        let home = sample_home();
        let found = home.find_by_address(&"192.168.1.30".into()).unwrap();
        assert_eq!(found.name(), "strip");
        assert!(home.find_by_address(&"10.0.0.1".into()).is_none());
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let home = sample_home();
        let snapshot = home.snapshot();
        let rooms: Vec<&String> = snapshot.keys().collect();
        assert_eq!(rooms, ["kitchen", "bedroom"]);
        let kitchen: Vec<&String> = snapshot["kitchen"].keys().collect();
        assert_eq!(kitchen, ["ceiling", "temp"]);
    }

    #[test]
    fn sensor_targets_only_lists_sensors() {
        let home = sample_home();
        let targets = home.sensor_targets();
        assert_eq!(targets.len(), 1);
        let (room, name, address) = &targets[0];
        assert_eq!(room, "kitchen");
        assert_eq!(name, "temp");
        assert_eq!(address.as_str(), "192.168.1.40");
    }

    #[test]
    fn clear_empties_everything() {
        let mut home = sample_home();
        home.clear();
        assert!(home.is_empty());
        assert!(home.room_names().is_empty());
    }
}
