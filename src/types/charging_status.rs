// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Charging status reported by the device.

use std::fmt;

/// Charging status as reported in the live values.
///
/// The device encodes its state as a small integer; codes not listed here
/// (including 4 and 5, which current firmware never emits) map to
/// [`ChargingStatus::Unknown`].
///
/// # Examples
///
/// ```
/// use nrgkick_lib::types::ChargingStatus;
///
/// assert_eq!(ChargingStatus::from_code(3), ChargingStatus::Charging);
/// assert_eq!(ChargingStatus::from_code(42), ChargingStatus::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargingStatus {
    /// Status not reported or not recognized.
    Unknown,
    /// Device is idle, no vehicle connected.
    Standby,
    /// Vehicle connected, not charging.
    Connected,
    /// Charging in progress.
    Charging,
    /// Device reports an error condition.
    Error,
    /// Device is waking the vehicle.
    Wakeup,
}

impl ChargingStatus {
    /// Maps a device status code to a status.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Standby,
            2 => Self::Connected,
            3 => Self::Charging,
            6 => Self::Error,
            7 => Self::Wakeup,
            _ => Self::Unknown,
        }
    }

    /// Returns true if a charging session is active.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        matches!(self, Self::Charging)
    }

    /// Returns the status name as shown to users.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Standby => "Standby",
            Self::Connected => "Connected",
            Self::Charging => "Charging",
            Self::Error => "Error",
            Self::Wakeup => "Wakeup",
        }
    }
}

impl fmt::Display for ChargingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
