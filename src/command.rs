// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Best-effort command delivery to physical devices.
//!
//! The controller never depends on a device actually receiving a command:
//! requests are fire-and-forget with short timeouts, failures are logged
//! by the caller and the logical state change stands either way.
//!
//! [`CommandSender`] is the capability seam: production code uses
//! [`HttpCommandSender`], tests substitute a recording fake.

use std::time::Duration;

use reqwest::Client;

use crate::error::ProtocolError;
use crate::types::{DeviceAddress, HexColor};

/// A command addressed to a physical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Ask the device to toggle its power state.
    Toggle {
        /// Target device address.
        address: DeviceAddress,
    },
    /// Ask the device to show a color.
    SetColor {
        /// Target device address.
        address: DeviceAddress,
        /// The color to apply.
        color: HexColor,
    },
}

impl DeviceCommand {
    /// Returns the target address of this command.
    #[must_use]
    pub const fn address(&self) -> &DeviceAddress {
        match self {
            Self::Toggle { address } | Self::SetColor { address, .. } => address,
        }
    }
}

/// Capability for reaching physical devices over the network.
///
/// Implementations must be cheap to share; the controller and the sensor
/// poller both hold one.
pub trait CommandSender: Send + Sync {
    /// Delivers a command to a device.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the device could not be reached or
    /// answered with a non-success status. Callers treat this as
    /// best-effort: the error is logged, never propagated.
    fn send(
        &self,
        command: &DeviceCommand,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Reads the current value from a sensor.
    ///
    /// Returns the raw response body.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] on timeout, connection failure or a
    /// non-success status.
    fn read_sensor(
        &self,
        address: &DeviceAddress,
    ) -> impl Future<Output = Result<String, ProtocolError>> + Send;
}

/// HTTP implementation of [`CommandSender`].
///
/// Devices expose plain GET endpoints: `/svet` toggles, `/color?color=…`
/// applies a color (the `#` is percent-encoded), and the root path serves
/// the current sensor reading. Command requests use a short timeout;
/// sensor reads get a slightly longer one.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use casita_lib::command::HttpCommandSender;
///
/// let sender = HttpCommandSender::new()
///     .with_command_timeout(Duration::from_secs(1))
///     .with_sensor_timeout(Duration::from_secs(2));
/// # drop(sender);
/// ```
#[derive(Debug, Clone)]
pub struct HttpCommandSender {
    client: Client,
    command_timeout: Duration,
    sensor_timeout: Duration,
}

impl HttpCommandSender {
    /// Default timeout for toggle/color commands.
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(1);
    /// Default timeout for sensor reads.
    pub const DEFAULT_SENSOR_TIMEOUT: Duration = Duration::from_secs(2);

    /// Creates a sender with the default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            command_timeout: Self::DEFAULT_COMMAND_TIMEOUT,
            sensor_timeout: Self::DEFAULT_SENSOR_TIMEOUT,
        }
    }

    /// Sets the timeout for toggle/color commands.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the timeout for sensor reads.
    #[must_use]
    pub fn with_sensor_timeout(mut self, timeout: Duration) -> Self {
        self.sensor_timeout = timeout;
        self
    }

    /// Builds the URL for a command.
    fn command_url(command: &DeviceCommand) -> String {
        match command {
            DeviceCommand::Toggle { address } => format!("http://{address}/svet"),
            DeviceCommand::SetColor { address, color } => {
                format!(
                    "http://{address}/color?color={}",
                    urlencoding::encode(color.as_str())
                )
            }
        }
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, ProtocolError> {
        tracing::debug!(url = %url, "Sending device request");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if !response.status().is_success() {
            return Err(ProtocolError::UnexpectedStatus(response.status().as_u16()));
        }

        Ok(response)
    }
}

impl Default for HttpCommandSender {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSender for HttpCommandSender {
    async fn send(&self, command: &DeviceCommand) -> Result<(), ProtocolError> {
        let url = Self::command_url(command);
        self.get(&url, self.command_timeout).await?;
        Ok(())
    }

    async fn read_sensor(&self, address: &DeviceAddress) -> Result<String, ProtocolError> {
        let url = format!("http://{address}");
        let response = self.get(&url, self.sensor_timeout).await?;
        let body = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(address = %address, body = %body, "Received sensor response");

        Ok(body)
    }
}
