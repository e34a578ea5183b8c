// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Charging current type.

use std::fmt;

use crate::error::ValueError;

/// Charging current in amperes.
///
/// The device accepts fractional amperes and clamps requests to its rated
/// current on its own; client-side validation only rejects values that can
/// never be valid (negative or non-finite).
///
/// # Examples
///
/// ```
/// use nrgkick_lib::types::ChargingCurrent;
///
/// let current = ChargingCurrent::new(16.0).unwrap();
/// assert_eq!(current.amperes(), 16.0);
///
/// assert!(ChargingCurrent::new(-1.0).is_err());
/// assert!(ChargingCurrent::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ChargingCurrent(f64);

impl ChargingCurrent {
    /// Creates a new charging current.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidCurrent` if the value is negative or
    /// not a finite number.
    pub fn new(amperes: f64) -> Result<Self, ValueError> {
        if !amperes.is_finite() || amperes < 0.0 {
            return Err(ValueError::InvalidCurrent(amperes));
        }
        Ok(Self(amperes))
    }

    /// Returns the current in amperes.
    #[must_use]
    pub const fn amperes(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for ChargingCurrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} A", self.0)
    }
}

impl TryFrom<f64> for ChargingCurrent {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
