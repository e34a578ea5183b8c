// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the NRGkick local JSON API.
//!
//! The device exposes three GET resources: `/info` (static metadata),
//! `/control` (control parameters) and `/values` (live measurements).
//! Control mutations are also GETs - a single query parameter on
//! `/control` - because that is the device's fixed contract.
//!
//! Every logical call runs through a bounded retry pipeline: transient
//! failures (timeouts, connection errors, 5xx answers) are retried with
//! exponential backoff, credential and malformed-request errors surface
//! immediately.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Map, Value};
use tokio::time::sleep;

use crate::command::{CommandResponse, ControlCommand, REJECTION_KEY};
use crate::error::{ApiError, Error, ParseError};
use crate::response::{ControlSettings, DeviceInfo, LiveValues};
use crate::types::{ChargingCurrent, EnergyLimit, PhaseCount};

const ENDPOINT_INFO: &str = "/info";
const ENDPOINT_CONTROL: &str = "/control";
const ENDPOINT_VALUES: &str = "/values";

/// HTTP statuses worth retrying: the device's web server recovers from
/// these on its own.
const TRANSIENT_STATUS: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

// ============================================================================
// RetryPolicy
// ============================================================================

/// Retry behavior for a single logical API call.
///
/// Between attempts the client sleeps `base_delay × backoff_factor^n`,
/// where `n` is the 0-based index of the attempt that just failed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nrgkick_lib::client::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 3);
/// assert_eq!(policy.backoff(0), Duration::from_secs(1));
/// assert_eq!(policy.backoff(1), Duration::from_millis(1500));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per logical call.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied per further retry.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff_factor: 1.5,
        }
    }
}

impl RetryPolicy {
    /// Returns the delay to wait after the given failed attempt (0-based).
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        self.base_delay
            .mul_f64(self.backoff_factor.powi(failed_attempt as i32))
    }
}

// ============================================================================
// Section selectors
// ============================================================================

/// Sections of the `/info` resource.
///
/// Passing a subset asks the device to return only those sections; an
/// empty selection means "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoSection {
    /// Device identity (name, serial, model, rated current).
    General,
    /// Charging connector data.
    Connector,
    /// Supply grid data.
    Grid,
    /// Network interface data.
    Network,
    /// Firmware and hardware versions.
    Versions,
}

impl InfoSection {
    /// Returns the query-parameter name for this section.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Connector => "connector",
            Self::Grid => "grid",
            Self::Network => "network",
            Self::Versions => "versions",
        }
    }
}

/// Sections of the `/values` resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuesSection {
    /// Charging session state.
    General,
    /// Electrical measurements.
    Powerflow,
    /// Energy counters.
    Energy,
    /// Temperature readings.
    Temperatures,
}

impl ValuesSection {
    /// Returns the query-parameter name for this section.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Powerflow => "powerflow",
            Self::Energy => "energy",
            Self::Temperatures => "temperatures",
        }
    }
}

// ============================================================================
// NrgkickClient
// ============================================================================

/// HTTP authentication credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username for HTTP Basic authentication.
    pub username: String,
    /// Password for HTTP Basic authentication.
    pub password: String,
}

/// Client for one NRGkick device.
///
/// Constructed once per device and reused for its lifetime; each call is
/// an independent request (the API is stateless).
///
/// # Examples
///
/// ```no_run
/// use nrgkick_lib::NrgkickClient;
///
/// # async fn example() -> nrgkick_lib::Result<()> {
/// let client = NrgkickClient::new("192.168.1.100")?;
/// let info = client.get_info(&[]).await?;
/// println!("serial: {:?}", info.serial_number());
///
/// let response = client.set_current(16.0).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NrgkickClient {
    host: String,
    base_url: String,
    http: reqwest::Client,
    credentials: Option<Credentials>,
    retry: RetryPolicy,
}

impl NrgkickClient {
    /// Default per-attempt request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new client for the specified host.
    ///
    /// The base URL is derived as `http://<host>`; hosts already carrying
    /// a scheme pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, Error> {
        NrgkickClientBuilder::new().host(host).build()
    }

    /// Creates a builder for advanced configuration.
    #[must_use]
    pub fn builder() -> NrgkickClientBuilder {
        NrgkickClientBuilder::new()
    }

    /// Sets authentication credentials.
    ///
    /// Basic auth is applied to every request once both username and
    /// password are set.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Returns the configured host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Read operations
    // =========================================================================

    /// Fetches device information.
    ///
    /// An empty `sections` slice requests all sections.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`](crate::error::ApiError) variants for
    /// communication failures and [`ParseError`](crate::error::ParseError)
    /// for malformed payloads.
    pub async fn get_info(&self, sections: &[InfoSection]) -> Result<DeviceInfo, Error> {
        let params: Vec<(&str, String)> = sections
            .iter()
            .map(|section| (section.as_str(), "1".to_string()))
            .collect();
        let body = self.request(ENDPOINT_INFO, &params).await?;
        Ok(serde_json::from_value(Value::Object(body)).map_err(ParseError::Json)?)
    }

    /// Fetches the current control parameter values.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get_info`](Self::get_info).
    pub async fn get_control(&self) -> Result<ControlSettings, Error> {
        let body = self.request(ENDPOINT_CONTROL, &[]).await?;
        Ok(serde_json::from_value(Value::Object(body)).map_err(ParseError::Json)?)
    }

    /// Fetches live measurements.
    ///
    /// An empty `sections` slice requests all sections.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get_info`](Self::get_info).
    pub async fn get_values(&self, sections: &[ValuesSection]) -> Result<LiveValues, Error> {
        let params: Vec<(&str, String)> = sections
            .iter()
            .map(|section| (section.as_str(), "1".to_string()))
            .collect();
        let body = self.request(ENDPOINT_VALUES, &params).await?;
        Ok(serde_json::from_value(Value::Object(body)).map_err(ParseError::Json)?)
    }

    /// Tests whether the device is reachable.
    ///
    /// Fetches the general info section and reports plain success or
    /// failure; the underlying error is logged, not returned. Intended
    /// for setup-time validation, not for the steady-state poll path.
    pub async fn test_connection(&self) -> bool {
        match self.get_info(&[InfoSection::General]).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(host = %self.host, error = %err, "connection test failed");
                false
            }
        }
    }

    // =========================================================================
    // Control mutations
    // =========================================================================

    /// Sends a control command.
    ///
    /// The returned [`CommandResponse`] may echo the wire field, carry the
    /// device's error message, or neither; interpreting it is the
    /// caller's job (see the coordinator's write-then-verify protocol).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`](crate::error::ApiError) variants for
    /// communication failures.
    pub async fn send_command(&self, command: &ControlCommand) -> Result<CommandResponse, Error> {
        let params = [(command.wire_field(), command.wire_value())];
        let body = self.request(ENDPOINT_CONTROL, &params).await?;
        Ok(CommandResponse::new(body))
    }

    /// Sets the charging current in amperes.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidCurrent` (before any network call) for
    /// negative or non-finite values, plus the communication failures of
    /// [`send_command`](Self::send_command).
    pub async fn set_current(&self, amperes: f64) -> Result<CommandResponse, Error> {
        let current = ChargingCurrent::new(amperes)?;
        self.send_command(&ControlCommand::SetCurrent(current)).await
    }

    /// Pauses or resumes charging.
    ///
    /// # Errors
    ///
    /// Returns the communication failures of
    /// [`send_command`](Self::send_command).
    pub async fn set_charge_pause(&self, pause: bool) -> Result<CommandResponse, Error> {
        self.send_command(&ControlCommand::SetChargePause(pause))
            .await
    }

    /// Sets the session energy limit in Wh (0 = no limit).
    ///
    /// # Errors
    ///
    /// Returns the communication failures of
    /// [`send_command`](Self::send_command).
    pub async fn set_energy_limit(&self, watt_hours: u32) -> Result<CommandResponse, Error> {
        self.send_command(&ControlCommand::SetEnergyLimit(EnergyLimit::watt_hours(
            watt_hours,
        )))
        .await
    }

    /// Sets the number of charging phases.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidPhaseCount` (before any network call)
    /// when `phases` is not 1, 2, or 3, plus the communication failures
    /// of [`send_command`](Self::send_command).
    pub async fn set_phase_count(&self, phases: u8) -> Result<CommandResponse, Error> {
        let phases = PhaseCount::new(phases)?;
        self.send_command(&ControlCommand::SetPhaseCount(phases))
            .await
    }

    // =========================================================================
    // Request pipeline
    // =========================================================================

    /// Runs one logical call through the retry pipeline.
    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Map<String, Value>, Error> {
        let url = format!("{}{endpoint}", self.base_url);
        let mut last_failure = String::new();

        for attempt in 0..self.retry.max_attempts {
            match self.attempt(&url, params).await {
                Ok(body) => return Ok(body),
                Err(AttemptError::Fatal(error)) => return Err(error),
                Err(AttemptError::Transient(message)) => {
                    tracing::warn!(
                        url = %url,
                        attempt = attempt + 1,
                        error = %message,
                        "request attempt failed"
                    );
                    last_failure = message;
                    if attempt + 1 < self.retry.max_attempts {
                        sleep(self.retry.backoff(attempt)).await;
                    }
                }
            }
        }

        Err(ApiError::CommunicationFailed {
            host: self.host.clone(),
            url,
            attempts: self.retry.max_attempts,
            message: last_failure,
        }
        .into())
    }

    /// Performs a single HTTP attempt and classifies its outcome.
    async fn attempt(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Map<String, Value>, AttemptError> {
        tracing::debug!(url = %url, ?params, "sending request");

        let mut request = self.http.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request
            .send()
            .await
            .map_err(|err| AttemptError::Transient(describe_transport_error(&err)))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttemptError::Fatal(
                ApiError::AuthenticationFailed {
                    host: self.host.clone(),
                }
                .into(),
            ));
        }

        if TRANSIENT_STATUS.contains(&status) {
            return Err(AttemptError::Transient(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| AttemptError::Transient(describe_transport_error(&err)))?;

        tracing::debug!(status = status.as_u16(), body = %body, "received response");

        if status.is_client_error() || status.is_server_error() {
            // A JSON body carrying the device's error indicator is a
            // domain answer, not a transport failure; the caller decides
            // what it means.
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body)
                && map.contains_key(REJECTION_KEY)
            {
                return Ok(map);
            }
            return Err(AttemptError::Fatal(
                ApiError::HttpStatus {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                }
                .into(),
            ));
        }

        parse_body(&body).map_err(|err| AttemptError::Fatal(err.into()))
    }
}

/// Outcome classification for one attempt.
enum AttemptError {
    /// Worth retrying: timeout, connection failure, transient 5xx.
    Transient(String),
    /// Not worth retrying: surfaced to the caller unchanged.
    Fatal(Error),
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

/// Parses a success-status body into the generic JSON object form.
///
/// The device answers `null` for empty section selections; that parses
/// to the empty object.
fn parse_body(body: &str) -> Result<Map<String, Value>, ParseError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(ParseError::UnexpectedFormat(format!(
            "expected a JSON object, got: {other}"
        ))),
    }
}

// ============================================================================
// NrgkickClientBuilder
// ============================================================================

/// Builder for creating a client with custom configuration.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use nrgkick_lib::NrgkickClient;
///
/// # fn example() -> nrgkick_lib::Result<()> {
/// let client = NrgkickClient::builder()
///     .host("192.168.1.100")
///     .credentials("admin", "secret")
///     .timeout(Duration::from_secs(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct NrgkickClientBuilder {
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl NrgkickClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the per-attempt request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns error if host is not set or client creation fails.
    pub fn build(self) -> Result<NrgkickClient, Error> {
        let host = self
            .host
            .ok_or_else(|| ApiError::InvalidAddress("host is required".to_string()))?;

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.clone()
        } else {
            format!("http://{host}")
        };

        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(NrgkickClient::DEFAULT_TIMEOUT))
            .build()
            .map_err(ApiError::Http)?;

        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Ok(NrgkickClient {
            host,
            base_url,
            http,
            credentials,
            retry: self.retry.unwrap_or_default(),
        })
    }
}
