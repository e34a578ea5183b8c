// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the NRGkick library.
//!
//! This module provides the error hierarchy for handling failures across
//! the library: value validation, HTTP API communication, and JSON parsing.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when
/// interacting with an NRGkick charging device.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while communicating with the device API.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Returns true if this error indicates invalid credentials.
    ///
    /// Authentication failures are fatal: they are never retried and a
    /// caller should prompt for reconfiguration rather than poll again.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Api(ApiError::AuthenticationFailed { .. }))
    }
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types with
/// invalid values. They are raised before any network call is made.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A phase count outside the supported set {1, 2, 3}.
    #[error("phase count must be 1, 2, or 3, got {0}")]
    InvalidPhaseCount(u8),

    /// A charging current that is negative or not a finite number.
    #[error("charging current must be a non-negative number of amperes, got {0}")]
    InvalidCurrent(f64),
}

/// Errors related to communication with the device's HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be created or used.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid host or URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device rejected the configured credentials (HTTP 401/403).
    #[error("authentication with {host} failed")]
    AuthenticationFailed {
        /// Host the request was sent to.
        host: String,
    },

    /// The request could not be completed after exhausting all attempts.
    #[error("communication with {host} failed after {attempts} attempts ({url}): {message}")]
    CommunicationFailed {
        /// Host the request was sent to.
        host: String,
        /// Full request URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Description of the last failure.
        message: String,
    },

    /// The device answered with an HTTP error status and no recognizable
    /// application-level error body.
    #[error("device returned HTTP {status} - {reason}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// The device refused the command for an application-level reason.
    ///
    /// Carries the device's own message (e.g. a command blocked by the
    /// solar-charging logic). Retrying would not change the outcome.
    #[error("{context} device said: {message}")]
    DeviceRejected {
        /// What was being attempted.
        context: String,
        /// The device's own error text.
        message: String,
    },

    /// The device echoed a different value than the one requested.
    ///
    /// Typically means the device clamped or refused the value without
    /// reporting an error. The cached state is left untouched.
    #[error("{context} device returned unexpected value: {actual} (expected {expected})")]
    VerificationMismatch {
        /// What was being attempted.
        context: String,
        /// Value the device echoed.
        actual: String,
        /// Value that was requested.
        expected: String,
    },

    /// The device echoed a value that could not be interpreted as a number.
    #[error("{context} device returned invalid value")]
    InvalidEcho {
        /// What was being attempted.
        context: String,
    },
}

/// Errors related to parsing device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was valid JSON but not the expected shape.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
