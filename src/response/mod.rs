// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for device JSON payloads.
//!
//! This module provides structures for deserializing the three endpoint
//! payloads (`/info`, `/control`, `/values`). All fields are optional:
//! the device omits sections that were not requested, and firmware
//! revisions differ in which fields they report, so a missing field parses
//! to `None` instead of failing the whole payload.

mod control;
mod info;
mod values;

pub use control::ControlSettings;
pub use info::{DeviceInfo, InfoConnector, InfoGeneral, InfoGrid, InfoNetwork, InfoVersions};
pub use values::{
    EnergyValues, LiveValues, NeutralValues, PhaseValues, Powerflow, Temperatures, ValuesGeneral,
};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes an optional flag that the device may encode as a JSON
/// bool, as 0/1, or as a `"0"`/`"1"` string.
pub(crate) fn opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(flag_from_value))
}

fn flag_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
