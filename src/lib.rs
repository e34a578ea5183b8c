// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `NRGkick` Lib - A Rust library to control NRGkick charging devices.
//!
//! This library talks to the device's local JSON API over HTTP and keeps
//! a verified, cached view of its state.
//!
//! # Supported Features
//!
//! - **State polling**: device info, control parameters and live
//!   measurements fetched on a configurable interval into one cached
//!   snapshot
//! - **Verified control**: charging current, pause/resume, energy limit
//!   and phase count changes confirmed against the device's own echo
//! - **Failure classification**: transient errors (timeouts, 5xx,
//!   connection resets) retried with exponential backoff; credential and
//!   domain errors surfaced immediately
//! - **Subscriptions**: watch channels for snapshot and health updates
//!
//! # Quick Start
//!
//! ## Reading device state
//!
//! ```no_run
//! use nrgkick_lib::{Coordinator, NrgkickClient};
//!
//! #[tokio::main]
//! async fn main() -> nrgkick_lib::Result<()> {
//!     let client = NrgkickClient::new("192.168.1.100")?;
//!     let coordinator = Coordinator::new(client);
//!
//!     // Mandatory first refresh; fails if the device is unreachable.
//!     coordinator.start().await?;
//!
//!     let snapshot = coordinator.snapshot();
//!     println!("status: {:?}", snapshot.values.charging_status());
//!     println!("current: {:?} A", snapshot.control.current_set);
//!     Ok(())
//! }
//! ```
//!
//! ## Changing settings
//!
//! ```no_run
//! use nrgkick_lib::{Coordinator, NrgkickClient};
//!
//! # async fn example(coordinator: &Coordinator) -> nrgkick_lib::Result<()> {
//! // Verified against the device's echo; the cache only ever holds
//! // values the device confirmed.
//! coordinator.set_current(16.0).await?;
//! coordinator.set_charge_pause(true).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Watching for updates
//!
//! ```no_run
//! use nrgkick_lib::{Coordinator, NrgkickClient};
//!
//! # async fn example(coordinator: &Coordinator) {
//! let mut updates = coordinator.subscribe();
//! tokio::spawn(async move {
//!     while updates.changed().await.is_ok() {
//!         let snapshot = updates.borrow_and_update().clone();
//!         println!("power: {:?}", snapshot.values.powerflow);
//!     }
//! });
//! # }
//! ```

pub mod client;
pub mod command;
pub mod coordinator;
pub mod error;
pub mod response;
mod snapshot;
pub mod types;

pub use client::{
    Credentials, InfoSection, NrgkickClient, NrgkickClientBuilder, RetryPolicy, ValuesSection,
};
pub use command::{CommandResponse, ControlCommand};
pub use coordinator::{
    Coordinator, DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, RefreshHealth,
};
pub use error::{ApiError, Error, ParseError, Result, ValueError};
pub use response::{ControlSettings, DeviceInfo, LiveValues};
pub use snapshot::DeviceSnapshot;
pub use types::{ChargingCurrent, ChargingStatus, EnergyLimit, PhaseCount};
