// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State coordinator for one NRGkick device.
//!
//! The coordinator owns the single cached [`DeviceSnapshot`], drives the
//! periodic full refresh (info, control and values fetched in sequence,
//! stored as one atomic replace) and executes control mutations with a
//! write-then-verify protocol: the device's own echo of the new value is
//! the only thing that may update the cache, so device-side clamping or
//! rejection can never silently diverge from the assumed state.
//!
//! # Command outcomes
//!
//! A command ends in exactly one of four ways:
//!
//! - **rejected**: the response carries the device's error message, which
//!   is surfaced verbatim (e.g. a command blocked by solar charging);
//! - **failed**: transport-level error from the client;
//! - **verified**: the echoed value matches, the one control field is
//!   patched in place and subscribers are notified - no full poll needed;
//! - **resolved**: the response confirms nothing either way, so after a
//!   short settle delay a full refresh reads back the authoritative
//!   state.

mod health;

pub use health::RefreshHealth;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, sleep};

use crate::client::NrgkickClient;
use crate::command::{ControlCommand, coerce_f64};
use crate::error::{ApiError, Error};
use crate::snapshot::DeviceSnapshot;
use crate::types::{ChargingCurrent, EnergyLimit, PhaseCount};

/// Default interval between scheduled refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Longest accepted poll interval.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Wait before re-reading state after a command the device accepted
/// without echoing a confirmation; the device's control loop needs a
/// moment to apply the change.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Coordinator for one device: cached snapshot, scheduled polling and
/// verified mutations.
///
/// # Examples
///
/// ```no_run
/// use nrgkick_lib::{Coordinator, NrgkickClient};
///
/// #[tokio::main]
/// async fn main() -> nrgkick_lib::Result<()> {
///     let client = NrgkickClient::new("192.168.1.100")?;
///     let coordinator = Coordinator::new(client);
///
///     // The first refresh is mandatory; failure aborts setup.
///     coordinator.start().await?;
///
///     let snapshot = coordinator.snapshot();
///     println!("current: {:?}", snapshot.control.current_set);
///
///     coordinator.set_current(16.0).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Coordinator {
    shared: Arc<Shared>,
    poll_interval: Duration,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug)]
struct Shared {
    client: NrgkickClient,
    state: RwLock<Versioned>,
    updates: watch::Sender<DeviceSnapshot>,
    health: watch::Sender<RefreshHealth>,
}

/// Snapshot plus a generation counter.
///
/// Every write bumps the generation; a refresh compares the generation
/// from before its (suspending) fetches so a verified-command patch can
/// not be overwritten by data read before the patch.
#[derive(Debug, Default)]
struct Versioned {
    snapshot: DeviceSnapshot,
    generation: u64,
}

impl Coordinator {
    /// Creates a coordinator with the default poll interval.
    ///
    /// The snapshot starts empty; call [`start`](Self::start) to populate
    /// it and begin polling.
    #[must_use]
    pub fn new(client: NrgkickClient) -> Self {
        let (updates, _) = watch::channel(DeviceSnapshot::default());
        let (health, _) = watch::channel(RefreshHealth::Pending);

        Self {
            shared: Arc::new(Shared {
                client,
                state: RwLock::new(Versioned::default()),
                updates,
                health,
            }),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_task: Mutex::new(None),
        }
    }

    /// Sets the poll interval, clamped to
    /// [`MIN_POLL_INTERVAL`]..=[`MAX_POLL_INTERVAL`].
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
        self
    }

    /// Returns the configured poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the underlying device client.
    #[must_use]
    pub fn client(&self) -> &NrgkickClient {
        &self.shared.client
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Performs the mandatory first refresh and starts scheduled polling.
    ///
    /// A running poll task from an earlier `start` is stopped first.
    ///
    /// # Errors
    ///
    /// Propagates the first refresh's failure without starting the poll
    /// task; setup should be aborted (and retried later, or
    /// reconfigured on an authentication failure).
    pub async fn start(&self) -> Result<(), Error> {
        self.stop();
        self.shared.refresh().await?;

        let shared = Arc::clone(&self.shared);
        let interval = self.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval fires immediately; the initial refresh just ran
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match shared.refresh().await {
                    Ok(()) => {}
                    Err(err) if err.is_authentication() => {
                        tracing::warn!(error = %err, "authentication lost, polling stopped");
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "scheduled refresh failed");
                    }
                }
            }
        });
        *self.poll_task.lock() = Some(handle);

        tracing::info!(
            host = %self.shared.client.host(),
            interval_s = interval.as_secs(),
            "coordinator started"
        );
        Ok(())
    }

    /// Stops scheduled polling. The cached snapshot stays readable.
    pub fn stop(&self) {
        if let Some(handle) = self.poll_task.lock().take() {
            handle.abort();
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// Returns the current cached snapshot.
    ///
    /// Synchronous and allocation-cheap; never performs network I/O.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.shared.state.read().snapshot.clone()
    }

    /// Returns the current refresh health.
    #[must_use]
    pub fn health(&self) -> RefreshHealth {
        self.shared.health.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    ///
    /// The receiver holds the latest snapshot at all times; it starts at
    /// the empty snapshot until the first refresh completes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DeviceSnapshot> {
        self.shared.updates.subscribe()
    }

    /// Subscribes to refresh health changes.
    #[must_use]
    pub fn subscribe_health(&self) -> watch::Receiver<RefreshHealth> {
        self.shared.health.subscribe()
    }

    /// Forces an immediate full refresh.
    ///
    /// # Errors
    ///
    /// Returns the client's classified error; the health state is updated
    /// accordingly.
    pub async fn request_refresh(&self) -> Result<(), Error> {
        self.shared.refresh().await
    }

    /// Tests whether the device is reachable, bypassing the cache.
    pub async fn test_connection(&self) -> bool {
        self.shared.client.test_connection().await
    }

    // =========================================================================
    // Verified mutations
    // =========================================================================

    /// Sets the charging current and verifies the device applied it.
    ///
    /// # Errors
    ///
    /// `ValueError::InvalidCurrent` before any network call for invalid
    /// values; otherwise the write-then-verify failures described in
    /// [`ApiError`](crate::error::ApiError).
    pub async fn set_current(&self, amperes: f64) -> Result<(), Error> {
        let current = ChargingCurrent::new(amperes)?;
        self.shared.execute(ControlCommand::SetCurrent(current)).await
    }

    /// Pauses or resumes charging and verifies the device applied it.
    ///
    /// # Errors
    ///
    /// The write-then-verify failures described in
    /// [`ApiError`](crate::error::ApiError).
    pub async fn set_charge_pause(&self, pause: bool) -> Result<(), Error> {
        self.shared.execute(ControlCommand::SetChargePause(pause)).await
    }

    /// Sets the session energy limit (Wh, 0 = no limit) and verifies the
    /// device applied it.
    ///
    /// # Errors
    ///
    /// The write-then-verify failures described in
    /// [`ApiError`](crate::error::ApiError).
    pub async fn set_energy_limit(&self, watt_hours: u32) -> Result<(), Error> {
        self.shared
            .execute(ControlCommand::SetEnergyLimit(EnergyLimit::watt_hours(
                watt_hours,
            )))
            .await
    }

    /// Sets the number of charging phases and verifies the device applied
    /// it.
    ///
    /// # Errors
    ///
    /// `ValueError::InvalidPhaseCount` before any network call when
    /// `phases` is not 1, 2, or 3; otherwise the write-then-verify
    /// failures described in [`ApiError`](crate::error::ApiError).
    pub async fn set_phase_count(&self, phases: u8) -> Result<(), Error> {
        let phases = PhaseCount::new(phases)?;
        self.shared.execute(ControlCommand::SetPhaseCount(phases)).await
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    /// Fetches all three sections and replaces the snapshot, updating the
    /// health state either way.
    async fn refresh(&self) -> Result<(), Error> {
        match self.fetch_and_store().await {
            Ok(()) => {
                self.set_health(RefreshHealth::Healthy);
                Ok(())
            }
            Err(err) => {
                if err.is_authentication() {
                    self.set_health(RefreshHealth::AuthenticationRequired);
                } else {
                    self.set_health(RefreshHealth::Degraded {
                        message: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    async fn fetch_and_store(&self) -> Result<(), Error> {
        let mut refetched = false;
        loop {
            let start_generation = self.state.read().generation;

            let info = self.client.get_info(&[]).await?;
            let control = self.client.get_control().await?;
            let values = self.client.get_values(&[]).await?;
            let snapshot = DeviceSnapshot::new(info, control, values);

            let mut state = self.state.write();
            if state.generation != start_generation && !refetched {
                // A verified command patched the snapshot while the
                // fetches were in flight; this data may predate the
                // patch. Read the device once more.
                drop(state);
                refetched = true;
                tracing::debug!("snapshot changed during refresh, fetching again");
                continue;
            }
            state.generation += 1;
            state.snapshot = snapshot;
            let current = state.snapshot.clone();
            drop(state);

            let _ = self.updates.send(current);
            return Ok(());
        }
    }

    /// Executes one control command with verification.
    async fn execute(&self, command: ControlCommand) -> Result<(), Error> {
        let response = self.client.send_command(&command).await?;

        if let Some(message) = response.rejection() {
            return Err(ApiError::DeviceRejected {
                context: command.failure_context(),
                message,
            }
            .into());
        }

        match response.echoed(command.wire_field()) {
            Some(value) => {
                let echoed = verify_echo(&command, value)?;
                let mut state = self.state.write();
                state.snapshot.control.apply_echo(&command, echoed);
                state.snapshot.updated_at = Some(Utc::now());
                state.generation += 1;
                let current = state.snapshot.clone();
                drop(state);

                let _ = self.updates.send(current);
                tracing::debug!(field = command.wire_field(), value = echoed, "command verified");
                Ok(())
            }
            None => {
                // The device accepted the request without confirming it.
                // Its true state is only knowable by reading back.
                tracing::debug!(
                    field = command.wire_field(),
                    "command not echoed, refreshing to resolve"
                );
                sleep(SETTLE_DELAY).await;
                self.refresh().await
            }
        }
    }

    fn set_health(&self, health: RefreshHealth) {
        self.health.send_if_modified(|current| {
            if *current == health {
                false
            } else {
                *current = health;
                true
            }
        });
    }
}

/// Checks a device echo against the command's expected value.
///
/// Both sides are coerced to `f64` before comparing, so `"16"`, `16` and
/// `16.0` are all equal. Returns the coerced echo on success.
#[allow(clippy::float_cmp)]
fn verify_echo(command: &ControlCommand, value: &Value) -> Result<f64, Error> {
    let Some(actual) = coerce_f64(value) else {
        return Err(ApiError::InvalidEcho {
            context: command.failure_context(),
        }
        .into());
    };
    let expected = command.expected();
    if actual != expected {
        return Err(ApiError::VerificationMismatch {
            context: command.failure_context(),
            actual: value.to_string(),
            expected: command.wire_value(),
        }
        .into());
    }
    Ok(actual)
}
