// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for NRGkick device control.
//!
//! This module provides type-safe representations of values used in
//! control commands and device state. Each constrained type validates its
//! value at construction time, so a request that the device would reject
//! outright never reaches the network.
//!
//! # Types
//!
//! - [`ChargingCurrent`] - Charging current in amperes (non-negative)
//! - [`EnergyLimit`] - Session energy limit in Wh (0 = no limit)
//! - [`PhaseCount`] - Number of charging phases (1-3)
//! - [`ChargingStatus`] - Device charging status codes

mod charging_current;
mod charging_status;
mod energy_limit;
mod phase_count;

pub use charging_current::ChargingCurrent;
pub use charging_status::ChargingStatus;
pub use energy_limit::EnergyLimit;
pub use phase_count::PhaseCount;
