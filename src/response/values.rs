// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live measurement payload parsing.

use serde::{Deserialize, Serialize};

use crate::types::ChargingStatus;

/// Live measurements from the `/values` endpoint.
///
/// Sections that were not requested (or not reported) are `None`.
///
/// # Examples
///
/// ```
/// use nrgkick_lib::response::LiveValues;
/// use nrgkick_lib::types::ChargingStatus;
///
/// let json = r#"{
///     "general": {"status": 3, "charge_permitted": true},
///     "powerflow": {"total_active_power": 11000.0}
/// }"#;
/// let values: LiveValues = serde_json::from_str(json).unwrap();
/// assert_eq!(values.charging_status(), Some(ChargingStatus::Charging));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveValues {
    /// Charging session state.
    #[serde(default)]
    pub general: Option<ValuesGeneral>,

    /// Electrical measurements.
    #[serde(default)]
    pub powerflow: Option<Powerflow>,

    /// Energy counters.
    #[serde(default)]
    pub energy: Option<EnergyValues>,

    /// Temperature readings.
    #[serde(default)]
    pub temperatures: Option<Temperatures>,
}

impl LiveValues {
    /// Returns the charging status, if reported.
    #[must_use]
    pub fn charging_status(&self) -> Option<ChargingStatus> {
        self.general.as_ref()?.charging_status()
    }
}

/// Charging session state section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesGeneral {
    /// Raw charging status code.
    #[serde(default)]
    pub status: Option<u8>,

    /// Current charging rate in km of range per hour.
    #[serde(default)]
    pub charging_rate: Option<f64>,

    /// Seconds since the vehicle was connected.
    #[serde(default)]
    pub vehicle_connect_time: Option<u64>,

    /// Seconds the vehicle has been charging this session.
    #[serde(default)]
    pub vehicle_charging_time: Option<u64>,

    /// Whether the device currently permits charging.
    #[serde(default, deserialize_with = "super::opt_flag")]
    pub charge_permitted: Option<bool>,

    /// Whether the charging relay is closed.
    #[serde(default, deserialize_with = "super::opt_flag")]
    pub relay_state: Option<bool>,

    /// Number of charging sessions so far.
    #[serde(default)]
    pub charge_count: Option<u32>,

    /// Number of residual-current device trips.
    #[serde(default)]
    pub rcd_trigger: Option<u32>,

    /// Active warning code (0 = none).
    #[serde(default)]
    pub warning_code: Option<u32>,

    /// Active error code (0 = none).
    #[serde(default)]
    pub error_code: Option<u32>,
}

impl ValuesGeneral {
    /// Returns the decoded charging status.
    #[must_use]
    pub fn charging_status(&self) -> Option<ChargingStatus> {
        self.status.map(ChargingStatus::from_code)
    }
}

/// Electrical measurements section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Powerflow {
    /// Charging voltage in volts.
    #[serde(default)]
    pub charging_voltage: Option<f64>,

    /// Charging current in amperes.
    #[serde(default)]
    pub charging_current: Option<f64>,

    /// Grid frequency in hertz.
    #[serde(default)]
    pub grid_frequency: Option<f64>,

    /// Peak power of the session in watts.
    #[serde(default)]
    pub peak_power: Option<f64>,

    /// Total active power in watts.
    #[serde(default)]
    pub total_active_power: Option<f64>,

    /// Total reactive power in var.
    #[serde(default)]
    pub total_reactive_power: Option<f64>,

    /// Total apparent power in VA.
    #[serde(default)]
    pub total_apparent_power: Option<f64>,

    /// Total power factor (0-1).
    #[serde(default)]
    pub total_power_factor: Option<f64>,

    /// Phase L1 measurements.
    #[serde(default)]
    pub l1: Option<PhaseValues>,

    /// Phase L2 measurements.
    #[serde(default)]
    pub l2: Option<PhaseValues>,

    /// Phase L3 measurements.
    #[serde(default)]
    pub l3: Option<PhaseValues>,

    /// Neutral conductor measurements.
    #[serde(default)]
    pub n: Option<NeutralValues>,
}

impl Powerflow {
    /// Returns the measurements for a phase (1-3).
    ///
    /// Returns `None` for indexes outside 1-3 or phases not reported.
    #[must_use]
    pub fn phase(&self, index: u8) -> Option<&PhaseValues> {
        match index {
            1 => self.l1.as_ref(),
            2 => self.l2.as_ref(),
            3 => self.l3.as_ref(),
            _ => None,
        }
    }
}

/// Per-phase electrical measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseValues {
    /// Voltage in volts.
    #[serde(default)]
    pub voltage: Option<f64>,

    /// Current in amperes.
    #[serde(default)]
    pub current: Option<f64>,

    /// Active power in watts.
    #[serde(default)]
    pub active_power: Option<f64>,

    /// Reactive power in var.
    #[serde(default)]
    pub reactive_power: Option<f64>,

    /// Apparent power in VA.
    #[serde(default)]
    pub apparent_power: Option<f64>,

    /// Power factor (0-1).
    #[serde(default)]
    pub power_factor: Option<f64>,
}

/// Neutral conductor measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeutralValues {
    /// Current in amperes.
    #[serde(default)]
    pub current: Option<f64>,
}

/// Energy counter section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyValues {
    /// Energy charged this session, in Wh.
    #[serde(default)]
    pub charged_energy: Option<f64>,

    /// Energy charged over the device lifetime, in Wh.
    #[serde(default)]
    pub total_charged_energy: Option<f64>,
}

/// Temperature readings section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    /// Housing temperature in °C.
    #[serde(default)]
    pub housing: Option<f64>,

    /// Connector L1 pin temperature in °C.
    #[serde(default)]
    pub connector_l1: Option<f64>,

    /// Connector L2 pin temperature in °C.
    #[serde(default)]
    pub connector_l2: Option<f64>,

    /// Connector L3 pin temperature in °C.
    #[serde(default)]
    pub connector_l3: Option<f64>,
}
