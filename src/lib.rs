// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Casita` Lib - A Rust library implementing a small smart-home controller.
//!
//! The library keeps a registry of rooms and devices (plain lights, RGB
//! lights and sensors), persists it through a JSON state file, polls
//! sensors in the background and translates rotary-encoder events from a
//! physical remote into device actions.
//!
//! # Supported Features
//!
//! - **Registry**: Rooms and named devices, stable listing order
//! - **Device control**: Toggle lights, apply hex colors to RGB lights
//! - **Remote control**: Button presses toggle, rotation steps hue or
//!   saturation through an in-memory HSV working color
//! - **Sensor polling**: Periodic background reads with per-device
//!   last-seen timestamps
//! - **Persistence**: Write-through JSON state and mapping files
//!
//! Device communication is best-effort over plain HTTP: the logical state
//! change always wins, delivery failures are only logged.
//!
//! # Quick Start
//!
//! ```no_run
//! use casita_lib::{ControllerConfig, DeviceAction, HomeController};
//!
//! #[tokio::main]
//! async fn main() -> casita_lib::Result<()> {
//!     let controller = HomeController::with_http_sender(ControllerConfig::new());
//!     controller.bootstrap().await?;
//!
//!     // Keep sensor readings fresh in the background.
//!     let poller = controller.start_poller();
//!
//!     controller.add_room("kitchen").await?;
//!     controller
//!         .add_device("kitchen", "ceiling", "light", "192.168.1.20")
//!         .await?;
//!     controller
//!         .control_device("kitchen", "ceiling", DeviceAction::Toggle)
//!         .await?;
//!
//!     poller.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod controller;
pub mod device;
pub mod error;
pub mod home;
pub mod persistence;
pub mod poller;
pub mod remote;
pub mod types;

pub use command::{CommandSender, DeviceCommand, HttpCommandSender};
pub use controller::{ControllerConfig, DeviceAction, DeviceQueryResult, HomeController};
pub use device::{Device, DeviceKind, DeviceSnapshot, EncoderMode};
pub use error::{Error, PersistenceError, ProtocolError, Result, ValueError};
pub use home::{Home, HomeSnapshot, Room, SharedHome};
pub use persistence::{MappingFile, StateFile};
pub use poller::{PollerHandle, SensorPoller};
pub use remote::{RangeMappings, RemoteEvent, RemoteOutcome};
pub use types::{DeviceAddress, DeviceType, DeviceTypeEntry, HexColor, HsvColor};
