// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control settings payload parsing.

use serde::{Deserialize, Serialize};

use crate::command::ControlCommand;

/// Current control parameter values from the `/control` endpoint.
///
/// # Examples
///
/// ```
/// use nrgkick_lib::response::ControlSettings;
///
/// let json = r#"{
///     "current_set": 16.0,
///     "charge_pause": 0,
///     "energy_limit": 0,
///     "phase_count": 3
/// }"#;
/// let control: ControlSettings = serde_json::from_str(json).unwrap();
/// assert_eq!(control.current_set, Some(16.0));
/// assert_eq!(control.charge_pause, Some(false));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSettings {
    /// Configured charging current in amperes.
    #[serde(default)]
    pub current_set: Option<f64>,

    /// Whether charging is paused (wire encoding 0/1).
    #[serde(default, deserialize_with = "super::opt_flag")]
    pub charge_pause: Option<bool>,

    /// Session energy limit in Wh (0 = no limit).
    #[serde(default)]
    pub energy_limit: Option<u32>,

    /// Number of phases used for charging.
    #[serde(default)]
    pub phase_count: Option<u8>,
}

impl ControlSettings {
    /// Patches the one field a verified command changed.
    ///
    /// `echoed` is the device's own echo after numeric coercion - the
    /// requested value is never written here, so a device-side adjustment
    /// can not silently diverge from the cache.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn apply_echo(&mut self, command: &ControlCommand, echoed: f64) {
        match command {
            ControlCommand::SetCurrent(_) => self.current_set = Some(echoed),
            ControlCommand::SetChargePause(_) => self.charge_pause = Some(echoed != 0.0),
            ControlCommand::SetEnergyLimit(_) => self.energy_limit = Some(echoed as u32),
            ControlCommand::SetPhaseCount(_) => self.phase_count = Some(echoed as u8),
        }
    }
}
