// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control command definitions.
//!
//! This module provides typed representations of the mutations the device
//! accepts on its `/control` endpoint. Each command knows its **wire
//! field** - the query-parameter name the device expects, which is also
//! the key under which the device echoes the accepted value back.
//!
//! # Available Commands
//!
//! | Command | Wire field | Encoding |
//! |---------|-----------|----------|
//! | Set charging current | `current_set` | amperes, fractional allowed |
//! | Pause/resume charging | `charge_pause` | `"1"` / `"0"` |
//! | Set energy limit | `energy_limit` | watt-hours, `0` = no limit |
//! | Set phase count | `phase_count` | `1`, `2`, or `3` |
//!
//! # Examples
//!
//! ```
//! use nrgkick_lib::command::ControlCommand;
//! use nrgkick_lib::types::ChargingCurrent;
//!
//! let cmd = ControlCommand::SetCurrent(ChargingCurrent::new(16.0).unwrap());
//! assert_eq!(cmd.wire_field(), "current_set");
//! assert_eq!(cmd.wire_value(), "16");
//! ```

use serde_json::{Map, Value};

use crate::types::{ChargingCurrent, EnergyLimit, PhaseCount};

/// Key under which the device reports an application-level error.
///
/// A body containing this key means the device understood the request but
/// refused it for a domain reason (e.g. a command blocked by the
/// solar-charging logic).
pub(crate) const REJECTION_KEY: &str = "Response";

/// A mutation of one control parameter.
///
/// Commands are sent as a single query parameter on a GET to `/control`;
/// the device's JSON answer either echoes the wire field with the value it
/// actually applied, omits it, or carries an error message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// Set the charging current in amperes.
    SetCurrent(ChargingCurrent),
    /// Pause (`true`) or resume (`false`) charging.
    SetChargePause(bool),
    /// Set the session energy limit.
    SetEnergyLimit(EnergyLimit),
    /// Set the number of charging phases.
    SetPhaseCount(PhaseCount),
}

impl ControlCommand {
    /// Returns the query-parameter name the device expects.
    ///
    /// The same name is used as the key of the device's echo in the
    /// response body.
    #[must_use]
    pub fn wire_field(&self) -> &'static str {
        match self {
            Self::SetCurrent(_) => "current_set",
            Self::SetChargePause(_) => "charge_pause",
            Self::SetEnergyLimit(_) => "energy_limit",
            Self::SetPhaseCount(_) => "phase_count",
        }
    }

    /// Returns the encoded query-parameter value.
    ///
    /// Floats pass through as-is, booleans encode as `"1"`/`"0"`.
    #[must_use]
    pub fn wire_value(&self) -> String {
        match self {
            Self::SetCurrent(current) => current.amperes().to_string(),
            Self::SetChargePause(pause) => if *pause { "1" } else { "0" }.to_string(),
            Self::SetEnergyLimit(limit) => limit.value().to_string(),
            Self::SetPhaseCount(phases) => phases.value().to_string(),
        }
    }

    /// Returns the value the device is expected to echo on success.
    ///
    /// Verification compares this against the echoed value after coercing
    /// both to `f64`, so `"16"`, `16` and `16.0` all count as equal.
    #[must_use]
    pub fn expected(&self) -> f64 {
        match self {
            Self::SetCurrent(current) => current.amperes(),
            Self::SetChargePause(pause) => {
                if *pause {
                    1.0
                } else {
                    0.0
                }
            }
            Self::SetEnergyLimit(limit) => f64::from(limit.value()),
            Self::SetPhaseCount(phases) => f64::from(phases.value()),
        }
    }

    /// Returns the failure context used in error messages.
    #[must_use]
    pub fn failure_context(&self) -> String {
        match self {
            Self::SetCurrent(current) => {
                format!("Failed to set charging current to {current}.")
            }
            Self::SetChargePause(true) => "Failed to pause charging.".to_string(),
            Self::SetChargePause(false) => "Failed to resume charging.".to_string(),
            Self::SetEnergyLimit(limit) => format!("Failed to set energy limit to {limit}."),
            Self::SetPhaseCount(phases) => format!("Failed to set phase count to {phases}."),
        }
    }
}

/// The device's answer to a control mutation.
///
/// Wraps the raw JSON object so callers can distinguish the three possible
/// shapes: an echo of the wire field, an application-level error message,
/// or neither (the device accepted the request without confirming it).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandResponse {
    body: Map<String, Value>,
}

impl CommandResponse {
    /// Wraps a parsed response body.
    #[must_use]
    pub fn new(body: Map<String, Value>) -> Self {
        Self { body }
    }

    /// Returns the device's application-level error message, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<String> {
        self.body.get(REJECTION_KEY).map(|value| match value {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        })
    }

    /// Returns the echoed value for a wire field, if present.
    #[must_use]
    pub fn echoed(&self, wire_field: &str) -> Option<&Value> {
        self.body.get(wire_field)
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

/// Coerces a JSON value to `f64` the way verification compares values.
///
/// Numbers and numeric strings coerce; booleans count as 1/0. Anything
/// else is not a number.
#[must_use]
pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
