// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device information payload parsing.

use serde::{Deserialize, Serialize};

/// Device information from the `/info` endpoint.
///
/// Static and semi-static metadata, keyed by section. Sections that were
/// not requested (or that the firmware does not report) are `None`.
///
/// # Examples
///
/// ```
/// use nrgkick_lib::response::DeviceInfo;
///
/// let json = r#"{
///     "general": {
///         "device_name": "NRGkick Garage",
///         "serial_number": "1234567890",
///         "rated_current": 32.0
///     },
///     "versions": {"sw_sm": "2.1.0"}
/// }"#;
/// let info: DeviceInfo = serde_json::from_str(json).unwrap();
/// assert_eq!(info.serial_number(), Some("1234567890"));
/// assert_eq!(info.sw_version(), Some("2.1.0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// General device identity.
    #[serde(default)]
    pub general: Option<InfoGeneral>,

    /// Charging connector data.
    #[serde(default)]
    pub connector: Option<InfoConnector>,

    /// Supply grid data.
    #[serde(default)]
    pub grid: Option<InfoGrid>,

    /// Network interface data.
    #[serde(default)]
    pub network: Option<InfoNetwork>,

    /// Firmware and hardware versions.
    #[serde(default)]
    pub versions: Option<InfoVersions>,
}

impl DeviceInfo {
    /// Returns the device serial number, if reported.
    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.general.as_ref()?.serial_number.as_deref()
    }

    /// Returns the user-visible device name, if reported.
    #[must_use]
    pub fn device_name(&self) -> Option<&str> {
        self.general.as_ref()?.device_name.as_deref()
    }

    /// Returns the smart-module software version, if reported.
    #[must_use]
    pub fn sw_version(&self) -> Option<&str> {
        self.versions.as_ref()?.sw_sm.as_deref()
    }
}

/// General device identity section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoGeneral {
    /// User-assigned device name.
    #[serde(default)]
    pub device_name: Option<String>,

    /// Device serial number.
    #[serde(default)]
    pub serial_number: Option<String>,

    /// Model designation (e.g. "Gen2").
    #[serde(default)]
    pub model_type: Option<String>,

    /// Rated maximum current in amperes.
    #[serde(default)]
    pub rated_current: Option<f64>,

    /// Version of the JSON API the firmware speaks.
    #[serde(default)]
    pub json_api_version: Option<String>,
}

/// Charging connector section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoConnector {
    /// Connector type (e.g. "Type2").
    #[serde(default, rename = "type")]
    pub connector_type: Option<String>,

    /// Connector serial number.
    #[serde(default)]
    pub serial: Option<String>,

    /// Maximum current the connector supports, in amperes.
    #[serde(default)]
    pub max_current: Option<f64>,

    /// Number of phases wired through the connector.
    #[serde(default)]
    pub phase_count: Option<u8>,
}

/// Supply grid section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoGrid {
    /// Nominal grid voltage in volts.
    #[serde(default)]
    pub voltage: Option<f64>,

    /// Nominal grid frequency in hertz.
    #[serde(default)]
    pub frequency: Option<f64>,

    /// Number of grid phases available.
    #[serde(default)]
    pub phases: Option<u8>,
}

/// Network interface section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoNetwork {
    /// Assigned IP address.
    #[serde(default)]
    pub ip_address: Option<String>,

    /// Interface MAC address.
    #[serde(default)]
    pub mac_address: Option<String>,

    /// SSID of the joined wireless network.
    #[serde(default)]
    pub ssid: Option<String>,

    /// Received signal strength in dBm.
    #[serde(default)]
    pub rssi: Option<i32>,
}

/// Firmware and hardware version section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoVersions {
    /// Smart-module software version.
    #[serde(default)]
    pub sw_sm: Option<String>,

    /// Smart-module hardware version.
    #[serde(default)]
    pub hw_sm: Option<String>,
}
