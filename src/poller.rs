// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background sensor polling.
//!
//! A [`SensorPoller`] periodically walks every registered sensor and asks
//! it for a fresh reading. Polling is purely in-memory: readings update
//! the registry but are never written through to disk, so a sensor value
//! only reaches the state file when some other mutation triggers a save.
//!
//! Each cycle snapshots the target list up front and holds the registry
//! write lock only for the brief moment a single reading is stored, so
//! slow or unreachable sensors never block the rest of the controller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::command::CommandSender;
use crate::home::SharedHome;

/// Default delay between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic sensor reader.
pub struct SensorPoller<S> {
    home: SharedHome,
    sender: Arc<S>,
    interval: Duration,
}

impl<S> SensorPoller<S>
where
    S: CommandSender + 'static,
{
    /// Creates a poller with the default interval.
    #[must_use]
    pub fn new(home: SharedHome, sender: Arc<S>) -> Self {
        Self {
            home,
            sender,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the delay between poll cycles.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the poll loop onto the current runtime.
    ///
    /// The first cycle runs after one full interval. The returned handle
    /// stops the loop on [`PollerHandle::shutdown`] or when dropped.
    #[must_use]
    pub fn spawn(self) -> PollerHandle {
        let token = CancellationToken::new();
        let loop_token = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The immediate first tick would poll before startup settles.
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = loop_token.cancelled() => {
                        tracing::debug!("Sensor poller shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        poll_once(&self.home, self.sender.as_ref()).await;
                    }
                }
            }
        });

        PollerHandle {
            token,
            task: Some(task),
        }
    }
}

/// Runs a single poll cycle over every registered sensor.
///
/// Failures are logged and leave the sensor's stored value and
/// `last_seen` untouched; a reading that arrives for a sensor removed
/// mid-cycle is dropped.
pub async fn poll_once<S: CommandSender>(home: &SharedHome, sender: &S) {
    let targets = home.read().await.sensor_targets();
    if targets.is_empty() {
        return;
    }

    tracing::debug!(sensors = targets.len(), "Polling sensors");

    for (room, name, address) in targets {
        match sender.read_sensor(&address).await {
            Ok(body) => {
                let value = json!(body.trim());
                let mut registry = home.write().await;
                if let Ok(device) = registry.device_mut(&room, &name) {
                    device.set_sensor_value(value);
                    device.mark_seen(Local::now());
                }
            }
            Err(err) => {
                tracing::warn!(
                    room = %room,
                    device = %name,
                    address = %address,
                    error = %err,
                    "Sensor poll failed"
                );
            }
        }
    }
}

/// Handle to a running [`SensorPoller`].
///
/// Dropping the handle cancels the loop.
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stops the poll loop and waits for the task to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "Sensor poller task did not shut down cleanly");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
