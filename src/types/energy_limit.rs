// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy limit type for session energy capping.

use std::fmt;

/// Energy limit for a charging session, in watt-hours.
///
/// A limit of `0` means no limit: the device charges until the vehicle
/// stops drawing power.
///
/// # Examples
///
/// ```
/// use nrgkick_lib::types::EnergyLimit;
///
/// let limit = EnergyLimit::watt_hours(5000);
/// assert_eq!(limit.value(), 5000);
/// assert!(!limit.is_unlimited());
///
/// assert!(EnergyLimit::UNLIMITED.is_unlimited());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnergyLimit(u32);

impl EnergyLimit {
    /// No energy limit.
    pub const UNLIMITED: Self = Self(0);

    /// Creates an energy limit of the given number of watt-hours.
    ///
    /// `0` is equivalent to [`EnergyLimit::UNLIMITED`].
    #[must_use]
    pub const fn watt_hours(value: u32) -> Self {
        Self(value)
    }

    /// Returns the limit in watt-hours (`0` = no limit).
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Returns true if no limit is set.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EnergyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            write!(f, "unlimited")
        } else {
            write!(f, "{} Wh", self.0)
        }
    }
}

impl From<u32> for EnergyLimit {
    fn from(value: u32) -> Self {
        Self::watt_hours(value)
    }
}
