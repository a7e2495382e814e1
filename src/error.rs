// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `Casita` library.
//!
//! This module provides the error hierarchy used across the library:
//! value validation, registry lookups, device communication and state
//! persistence.

use thiserror::Error;

/// The main error type for this library.
///
/// Registry conflicts and lookups are surfaced to callers synchronously.
/// Protocol and persistence failures are deliberately *not* part of the
/// control-surface contract: device commands are best-effort and save
/// failures leave the in-memory state authoritative, so both are logged
/// where they occur instead of being returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to a physical device.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while reading or writing a state file.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A room with this name already exists.
    #[error("room already exists: {0}")]
    RoomExists(String),

    /// The requested room does not exist.
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// A device with this name already exists in the room.
    #[error("device {name} already exists in room {room}")]
    DeviceExists {
        /// The room that already contains the device.
        room: String,
        /// The conflicting device name.
        name: String,
    },

    /// The requested device does not exist.
    #[error("device not found")]
    DeviceNotFound,

    /// A remote event referenced a range code with no mapping.
    #[error("unknown range: {0}")]
    UnknownRange(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A color string did not match `#RGB` / `#RRGGBB`.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),

    /// A hue value is outside the valid range (0-359).
    #[error("hue value {0} is out of range [0, 360)")]
    InvalidHue(u16),

    /// A saturation value is outside the valid range (0-100).
    #[error("saturation value {0} is out of range [0, 100]")]
    InvalidSaturation(u8),

    /// An HSV value component is outside the valid range (0-100).
    #[error("value component {0} is out of range [0, 100]")]
    InvalidValue(u8),

    /// A device address failed the dotted-quad syntax check.
    #[error("invalid device address: {0}")]
    InvalidAddress(String),

    /// An unknown device type tag was supplied.
    #[error("invalid device type: {0}")]
    InvalidDeviceType(String),

    /// A required field was missing from a request.
    #[error("missing field: {0}")]
    MissingField(String),
}

/// Errors related to HTTP communication with physical devices.
///
/// These never cross the control surface: the caller of a mutating
/// operation always sees the logical state change succeed.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Device answered with a non-success status code.
    #[error("unexpected status: HTTP {0}")]
    UnexpectedStatus(u16),
}

/// Errors related to reading or writing the persisted state files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
