// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::{ControlSettings, DeviceInfo, LiveValues};

/// The coordinator's cached three-section view of device state.
///
/// A snapshot starts empty and is replaced wholesale by every successful
/// poll; the only partial update is the single-field control patch a
/// verified command applies. Entities read the snapshot through the
/// coordinator's accessor and never keep their own copy.
///
/// # Examples
///
/// ```
/// use nrgkick_lib::DeviceSnapshot;
///
/// let snapshot = DeviceSnapshot::default();
/// assert!(snapshot.updated_at.is_none());
/// assert_eq!(snapshot.control.current_set, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Static and semi-static device metadata.
    pub info: DeviceInfo,

    /// Current control parameter values.
    pub control: ControlSettings,

    /// Live measurements.
    pub values: LiveValues,

    /// When this snapshot was last written (poll or verified command).
    pub updated_at: Option<DateTime<Utc>>,
}

impl DeviceSnapshot {
    /// Builds a snapshot from the three fetched sections, stamped now.
    #[must_use]
    pub fn new(info: DeviceInfo, control: ControlSettings, values: LiveValues) -> Self {
        Self {
            info,
            control,
            values,
            updated_at: Some(Utc::now()),
        }
    }
}
