// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refresh health reporting.

/// Health of the coordinator's polling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RefreshHealth {
    /// No refresh has completed yet.
    #[default]
    Pending,
    /// The last refresh succeeded.
    Healthy,
    /// The last refresh failed with a recoverable error; polling
    /// continues and the cached snapshot stays at its last good state.
    Degraded {
        /// Description of the failure.
        message: String,
    },
    /// The device rejected the configured credentials. Polling stops;
    /// the caller must reconfigure and restart.
    AuthenticationRequired,
}

impl RefreshHealth {
    /// Returns true if the last refresh succeeded.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Returns true if polling stopped over invalid credentials.
    #[must_use]
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }
}
