// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The controller facade.
//!
//! [`HomeController`] ties the registry, persistence, command delivery
//! and remote translation together behind one handle. Every mutating
//! operation follows the same discipline:
//!
//! 1. mutate the in-memory registry under the write lock,
//! 2. rewrite the state file while still holding the lock,
//! 3. release the lock, then deliver any device command best-effort.
//!
//! Save and delivery failures are logged, never surfaced: the in-memory
//! state is authoritative and the caller's request has already succeeded
//! by the time either can fail.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::command::{CommandSender, DeviceCommand, HttpCommandSender};
use crate::device::{Device, DeviceSnapshot};
use crate::error::{Error, Result};
use crate::home::{Home, HomeSnapshot, SharedHome};
use crate::persistence::{MappingFile, StateFile};
use crate::poller::{DEFAULT_POLL_INTERVAL, PollerHandle, SensorPoller};
use crate::remote::{RangeMappings, RemoteEvent, RemoteOutcome, translate};
use crate::types::{DeviceType, DeviceTypeEntry};

/// Default path of the home state file.
pub const DEFAULT_STATE_PATH: &str = "smart_home_state.json";

/// Default path of the remote mapping file.
pub const DEFAULT_MAPPING_PATH: &str = "range_mappings.json";

/// File paths and timings for a [`HomeController`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use casita_lib::controller::ControllerConfig;
///
/// let config = ControllerConfig::new()
///     .with_state_path("/var/lib/casita/state.json")
///     .with_poll_interval(Duration::from_secs(30));
/// # drop(config);
/// ```
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    state_path: PathBuf,
    mapping_path: PathBuf,
    poll_interval: Duration,
}

impl ControllerConfig {
    /// Creates a configuration with the default paths and interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            mapping_path: PathBuf::from(DEFAULT_MAPPING_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the path of the home state file.
    #[must_use]
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// Sets the path of the remote mapping file.
    #[must_use]
    pub fn with_mapping_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_path = path.into();
        self
    }

    /// Sets the delay between sensor poll cycles.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A control-surface request against one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAction {
    /// Flip the device's power state.
    Toggle,
    /// Apply a color to an RGB light.
    SetColor(String),
}

/// Answer to a device query.
///
/// Serializes either as the full nested room map or as a single device
/// object, depending on how precise the query was.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum DeviceQueryResult {
    /// One device, when both room and name were given.
    Single(DeviceSnapshot),
    /// Everything, otherwise.
    All(HomeSnapshot),
}

/// Central handle over the whole smart home.
///
/// Cheap to clone; all clones share the same registry, mapping table and
/// command sender.
///
/// # Examples
///
/// ```no_run
/// use casita_lib::controller::{ControllerConfig, HomeController};
///
/// # async fn run() -> casita_lib::Result<()> {
/// let controller = HomeController::with_http_sender(ControllerConfig::new());
/// controller.bootstrap().await?;
/// controller.add_room("kitchen").await?;
/// # Ok(())
/// # }
/// ```
pub struct HomeController<S> {
    home: SharedHome,
    mappings: Arc<parking_lot::RwLock<RangeMappings>>,
    state_file: StateFile,
    mapping_file: MappingFile,
    sender: Arc<S>,
    poll_interval: Duration,
}

impl HomeController<HttpCommandSender> {
    /// Creates a controller backed by the default HTTP sender.
    #[must_use]
    pub fn with_http_sender(config: ControllerConfig) -> Self {
        Self::new(Arc::new(HttpCommandSender::new()), config)
    }
}

impl<S> HomeController<S>
where
    S: CommandSender + 'static,
{
    /// Creates a controller around the given command sender.
    #[must_use]
    pub fn new(sender: Arc<S>, config: ControllerConfig) -> Self {
        Self {
            home: Arc::new(RwLock::new(Home::new())),
            mappings: Arc::new(parking_lot::RwLock::new(RangeMappings::new())),
            state_file: StateFile::new(config.state_path),
            mapping_file: MappingFile::new(config.mapping_path),
            sender,
            poll_interval: config.poll_interval,
        }
    }

    /// Loads the persisted registry and mapping table.
    ///
    /// Call once at startup, before serving requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] when either file exists but cannot
    /// be read or parsed.
    pub async fn bootstrap(&self) -> Result<()> {
        {
            let mut home = self.home.write().await;
            self.state_file.load(&mut home)?;
        }
        *self.mappings.write() = self.mapping_file.load()?;
        Ok(())
    }

    /// Returns the shared registry handle.
    #[must_use]
    pub fn shared_home(&self) -> SharedHome {
        Arc::clone(&self.home)
    }

    /// Spawns the background sensor poller with the configured interval.
    #[must_use]
    pub fn start_poller(&self) -> PollerHandle {
        SensorPoller::new(Arc::clone(&self.home), Arc::clone(&self.sender))
            .with_interval(self.poll_interval)
            .spawn()
    }

    // =========================================================================
    // Rooms and devices
    // =========================================================================

    /// Lists the room names in registration order.
    pub async fn rooms(&self) -> Vec<String> {
        self.home.read().await.room_names()
    }

    /// Registers a new empty room and writes the state through.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoomExists`] on a duplicate name.
    pub async fn add_room(&self, name: &str) -> Result<()> {
        let mut home = self.home.write().await;
        home.add_room(name)?;
        tracing::info!(room = name, "Added room");
        self.persist(&home);
        Ok(())
    }

    /// Returns the fixed device-type catalog.
    #[must_use]
    pub fn device_types() -> Vec<DeviceTypeEntry> {
        DeviceType::catalog()
    }

    /// Registers a new device and writes the state through.
    ///
    /// The address is stored verbatim; no reachability or syntax check is
    /// performed here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] for an unknown device type tag,
    /// [`Error::RoomNotFound`] for an unknown room and
    /// [`Error::DeviceExists`] on a name collision within the room.
    pub async fn add_device(
        &self,
        room: &str,
        name: &str,
        device_type: &str,
        address: &str,
    ) -> Result<DeviceSnapshot> {
        let device_type: DeviceType = device_type.parse().map_err(Error::Value)?;
        let device = match device_type {
            DeviceType::Light => Device::light(name, address),
            DeviceType::RgbLight => Device::rgb_light(name, address),
            DeviceType::Sensor => Device::sensor(name, address),
        };

        let mut home = self.home.write().await;
        let snapshot = home.add_device(room, device)?;
        tracing::info!(
            room = room,
            device = name,
            device_type = %device_type,
            "Added device"
        );
        self.persist(&home);
        Ok(snapshot)
    }

    /// Queries device state.
    ///
    /// With both `room` and `name` given, answers with that single
    /// device; any less precise query answers with the full nested map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoomNotFound`] or [`Error::DeviceNotFound`] for a
    /// precise query that misses.
    pub async fn devices(
        &self,
        room: Option<&str>,
        name: Option<&str>,
    ) -> Result<DeviceQueryResult> {
        let home = self.home.read().await;
        match (room, name) {
            (Some(room), Some(name)) => {
                let device = home.device(room, name)?;
                Ok(DeviceQueryResult::Single(device.snapshot()))
            }
            _ => Ok(DeviceQueryResult::All(home.snapshot())),
        }
    }

    /// Applies an action to a device, writes the state through and
    /// notifies the physical device best-effort.
    ///
    /// [`DeviceAction::SetColor`] against anything but an RGB light is a
    /// successful no-op: the snapshot is returned unchanged and nothing
    /// is sent or saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoomNotFound`] / [`Error::DeviceNotFound`] for a
    /// bad target and [`Error::Value`] for a malformed color.
    pub async fn control_device(
        &self,
        room: &str,
        name: &str,
        action: DeviceAction,
    ) -> Result<DeviceSnapshot> {
        let (snapshot, command) = {
            let mut home = self.home.write().await;
            let device = home.device_mut(room, name)?;
            let address = device.address().clone();

            let command = match &action {
                DeviceAction::Toggle => {
                    let status = device.toggle();
                    tracing::info!(room = room, device = name, status = status, "Toggled device");
                    Some(DeviceCommand::Toggle { address })
                }
                DeviceAction::SetColor(color) => {
                    if device.device_type() != DeviceType::RgbLight {
                        return Ok(device.snapshot());
                    }
                    device.set_color(color)?;
                    let color = device
                        .color()
                        .cloned()
                        .unwrap_or_default();
                    tracing::info!(
                        room = room,
                        device = name,
                        color = color.as_str(),
                        "Set device color"
                    );
                    Some(DeviceCommand::SetColor { address, color })
                }
            };

            let snapshot = home.device(room, name)?.snapshot();
            self.persist(&home);
            (snapshot, command)
        };

        if let Some(command) = command {
            self.dispatch(&command).await;
        }
        Ok(snapshot)
    }

    // =========================================================================
    // Remote control
    // =========================================================================

    /// Returns a copy of the current range-mapping table.
    #[must_use]
    pub fn mappings(&self) -> RangeMappings {
        self.mappings.read().clone()
    }

    /// Replaces the whole range-mapping table and writes it through.
    pub fn set_mappings(&self, mappings: RangeMappings) {
        tracing::info!(ranges = mappings.len(), "Replaced range mappings");
        if let Err(err) = self.mapping_file.save(&mappings) {
            tracing::error!(error = %err, "Failed to write mapping file");
        }
        *self.mappings.write() = mappings;
    }

    /// Handles one rotary-encoder event from the remote.
    ///
    /// State-changing outcomes are written through and the resulting
    /// command is delivered best-effort after the lock is released.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRange`] for an unmapped range code and
    /// [`Error::DeviceNotFound`] when the mapped address matches no
    /// registered device.
    pub async fn remote_event(&self, event: &RemoteEvent) -> Result<RemoteOutcome> {
        let mappings = self.mappings();

        let translation = {
            let mut home = self.home.write().await;
            let translation = translate(&mut home, &mappings, event)?;
            if translation.persist {
                self.persist(&home);
            }
            translation
        };

        if let Some(command) = &translation.command {
            self.dispatch(command).await;
        }
        Ok(translation.outcome)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Rewrites the state file, logging instead of failing.
    fn persist(&self, home: &Home) {
        if let Err(err) = self.state_file.save(home) {
            tracing::error!(error = %err, "Failed to write state file");
        }
    }

    /// Delivers a device command, logging instead of failing.
    async fn dispatch(&self, command: &DeviceCommand) {
        if let Err(err) = self.sender.send(command).await {
            tracing::warn!(
                address = %command.address(),
                error = %err,
                "Device command failed"
            );
        }
    }
}

impl<S> Clone for HomeController<S> {
    fn clone(&self) -> Self {
        Self {
            home: Arc::clone(&self.home),
            mappings: Arc::clone(&self.mappings),
            state_file: self.state_file.clone(),
            mapping_file: self.mapping_file.clone(),
            sender: Arc::clone(&self.sender),
            poll_interval: self.poll_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProtocolError, ValueError};
    use crate::types::DeviceAddress;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Test double recording every delivered command.
    #[derive(Default)]
    struct RecordingSender {
        commands: Mutex<Vec<DeviceCommand>>,
        fail: bool,
    }

    impl RecordingSender {
        fn failing() -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn recorded(&self) -> Vec<DeviceCommand> {
            self.commands.lock().clone()
        }
    }

    impl CommandSender for RecordingSender {
        async fn send(&self, command: &DeviceCommand) -> std::result::Result<(), ProtocolError> {
            self.commands.lock().push(command.clone());
            if self.fail {
                return Err(ProtocolError::UnexpectedStatus(500));
            }
            Ok(())
        }

        async fn read_sensor(
            &self,
            _address: &DeviceAddress,
        ) -> std::result::Result<String, ProtocolError> {
            Ok("21.5".to_string())
        }
    }

    fn test_controller(
        dir: &tempfile::TempDir,
    ) -> (HomeController<RecordingSender>, Arc<RecordingSender>) {
        let sender = Arc::new(RecordingSender::default());
        let config = ControllerConfig::new()
            .with_state_path(dir.path().join("state.json"))
            .with_mapping_path(dir.path().join("mappings.json"));
        (HomeController::new(Arc::clone(&sender), config), sender)
    }

    #[tokio::test]
    async fn add_room_and_device_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, _) = test_controller(&dir);
        controller.bootstrap().await.unwrap();

        controller.add_room("kitchen").await.unwrap();
        let snapshot = controller
            .add_device("kitchen", "ceiling", "light", "192.168.1.20")
            .await
            .unwrap();
        assert_eq!(snapshot.name, "ceiling");
        assert!(!snapshot.status);

        assert_eq!(controller.rooms().await, ["kitchen"]);
    }

    #[tokio::test]
    async fn add_device_rejects_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, _) = test_controller(&dir);
        controller.add_room("kitchen").await.unwrap();

        let err = controller
            .add_device("kitchen", "thing", "dishwasher", "192.168.1.9")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Value(ValueError::InvalidDeviceType(tag)) if tag == "dishwasher"
        ));
    }

    #[tokio::test]
    async fn toggle_sends_command_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, sender) = test_controller(&dir);
        controller.add_room("kitchen").await.unwrap();
        controller
            .add_device("kitchen", "ceiling", "light", "192.168.1.20")
            .await
            .unwrap();

        let snapshot = controller
            .control_device("kitchen", "ceiling", DeviceAction::Toggle)
            .await
            .unwrap();
        assert!(snapshot.status);
        assert_eq!(
            sender.recorded(),
            [DeviceCommand::Toggle {
                address: "192.168.1.20".into()
            }]
        );

        // The new status survives a fresh bootstrap from disk.
        let (fresh, _) = test_controller(&dir);
        fresh.bootstrap().await.unwrap();
        let queried = fresh.devices(Some("kitchen"), Some("ceiling")).await.unwrap();
        assert!(matches!(queried, DeviceQueryResult::Single(s) if s.status));
    }

    #[tokio::test]
    async fn toggle_succeeds_even_when_delivery_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sender = Arc::new(RecordingSender::failing());
        let config = ControllerConfig::new()
            .with_state_path(dir.path().join("state.json"))
            .with_mapping_path(dir.path().join("mappings.json"));
        let controller = HomeController::new(Arc::clone(&sender), config);

        controller.add_room("kitchen").await.unwrap();
        controller
            .add_device("kitchen", "ceiling", "light", "192.168.1.20")
            .await
            .unwrap();

        let snapshot = controller
            .control_device("kitchen", "ceiling", DeviceAction::Toggle)
            .await
            .unwrap();
        assert!(snapshot.status);
        assert_eq!(sender.recorded().len(), 1);
    }

    #[tokio::test]
    async fn set_color_on_plain_light_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, sender) = test_controller(&dir);
        controller.add_room("kitchen").await.unwrap();
        controller
            .add_device("kitchen", "ceiling", "light", "192.168.1.20")
            .await
            .unwrap();

        let snapshot = controller
            .control_device(
                "kitchen",
                "ceiling",
                DeviceAction::SetColor("#ff0000".to_string()),
            )
            .await
            .unwrap();
        assert!(!snapshot.status);
        assert!(sender.recorded().is_empty());
    }

    #[tokio::test]
    async fn set_color_rejects_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, sender) = test_controller(&dir);
        controller.add_room("bedroom").await.unwrap();
        controller
            .add_device("bedroom", "strip", "rgb_light", "192.168.1.30")
            .await
            .unwrap();

        let err = controller
            .control_device(
                "bedroom",
                "strip",
                DeviceAction::SetColor("red".to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidHexColor(_))));
        assert!(sender.recorded().is_empty());

        // The stored color is untouched.
        let queried = controller.devices(Some("bedroom"), Some("strip")).await.unwrap();
        assert!(matches!(
            queried,
            DeviceQueryResult::Single(s)
                if s.color.as_ref().map(crate::types::HexColor::as_str) == Some("#ffffff")
        ));
    }

    #[tokio::test]
    async fn imprecise_query_returns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, _) = test_controller(&dir);
        controller.add_room("kitchen").await.unwrap();
        controller
            .add_device("kitchen", "ceiling", "light", "192.168.1.20")
            .await
            .unwrap();

        let all = controller.devices(Some("kitchen"), None).await.unwrap();
        let DeviceQueryResult::All(snapshot) = all else {
            panic!("expected the full map");
        };
        assert!(snapshot.contains_key("kitchen"));
    }

    #[tokio::test]
    async fn remote_event_goes_through_mappings() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, sender) = test_controller(&dir);
        controller.add_room("living").await.unwrap();
        controller
            .add_device("living", "lamp", "light", "192.168.1.10")
            .await
            .unwrap();
        controller.set_mappings(
            [("0".to_string(), DeviceAddress::new("192.168.1.10"))]
                .into_iter()
                .collect(),
        );

        let outcome = controller
            .remote_event(&RemoteEvent::button_press("0"))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RemoteOutcome::Toggled { device } if device.status
        ));
        assert_eq!(sender.recorded().len(), 1);

        let err = controller
            .remote_event(&RemoteEvent::button_press("7"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownRange(range) if range == "7"));
    }

    #[tokio::test]
    async fn mappings_survive_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, _) = test_controller(&dir);
        controller.set_mappings(
            [("2".to_string(), DeviceAddress::new("10.0.0.2"))]
                .into_iter()
                .collect(),
        );

        let (fresh, _) = test_controller(&dir);
        fresh.bootstrap().await.unwrap();
        assert_eq!(
            fresh.mappings().address_for("2").map(DeviceAddress::as_str),
            Some("10.0.0.2")
        );
    }

    #[tokio::test]
    async fn sensor_values_are_not_written_through_by_polls() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, _) = test_controller(&dir);
        controller.add_room("kitchen").await.unwrap();
        controller
            .add_device("kitchen", "temp", "sensor", "192.168.1.40")
            .await
            .unwrap();

        {
            let home = controller.shared_home();
            let mut registry = home.write().await;
            registry
                .device_mut("kitchen", "temp")
                .unwrap()
                .set_sensor_value(json!("25.0"));
        }

        // Only the value present at the last explicit mutation is on disk.
        let (fresh, _) = test_controller(&dir);
        fresh.bootstrap().await.unwrap();
        let queried = fresh.devices(Some("kitchen"), Some("temp")).await.unwrap();
        assert!(matches!(
            queried,
            DeviceQueryResult::Single(s) if s.value == Some(json!(21.5))
        ));
    }

    #[test]
    fn device_types_catalog_is_exposed() {
        let catalog = HomeController::<RecordingSender>::device_types();
        assert_eq!(catalog.len(), 3);
    }
}
