// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Phase count type for charging phase selection.
//!
//! This module provides a type-safe representation of the number of
//! phases used for charging, ensuring the value is always 1, 2, or 3.

use std::fmt;

use crate::error::ValueError;

/// Number of phases used for charging (1-3).
///
/// NRGkick devices charge on one, two, or three phases; any other value
/// is rejected by the device, so it is rejected here before a request is
/// ever made.
///
/// # Examples
///
/// ```
/// use nrgkick_lib::types::PhaseCount;
///
/// let phases = PhaseCount::new(3).unwrap();
/// assert_eq!(phases.value(), 3);
///
/// // Invalid values return error
/// assert!(PhaseCount::new(0).is_err());
/// assert!(PhaseCount::new(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhaseCount(u8);

impl PhaseCount {
    /// Single-phase charging.
    pub const ONE: Self = Self(1);

    /// Two-phase charging.
    pub const TWO: Self = Self(2);

    /// Three-phase charging.
    pub const THREE: Self = Self(3);

    /// Creates a new phase count.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidPhaseCount` if the value is not 1, 2,
    /// or 3.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(1..=3).contains(&value) {
            return Err(ValueError::InvalidPhaseCount(value));
        }
        Ok(Self(value))
    }

    /// Returns the number of phases.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PhaseCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for PhaseCount {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
