// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP client and coordinator using wiremock.

use std::time::{Duration, Instant};

use nrgkick_lib::{
    ApiError, Coordinator, Error, NrgkickClient, RefreshHealth, RetryPolicy, ValueError,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Retry policy without backoff sleeps, for fast tests.
fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
        backoff_factor: 1.5,
    }
}

fn client_for(server: &MockServer) -> NrgkickClient {
    NrgkickClient::builder()
        .host(server.uri())
        .retry_policy(fast_retry())
        .build()
        .unwrap()
}

async fn mount_full_state(server: &MockServer, current_set: f64) {
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "general": {
                "device_name": "NRGkick Test",
                "serial_number": "TEST123456",
                "rated_current": 32.0
            },
            "versions": {"sw_sm": "2.1.0"}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/control"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_set": current_set,
            "charge_pause": 0,
            "energy_limit": 0,
            "phase_count": 3
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/values"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "general": {"status": 3, "charge_permitted": true},
            "powerflow": {"total_active_power": 11000.0},
            "energy": {"charged_energy": 5000.0}
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Client request tests
// ============================================================================

mod client_requests {
    use super::*;
    use nrgkick_lib::{ChargingStatus, InfoSection, ValuesSection};

    #[tokio::test]
    async fn get_info_parses_sections() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "general": {"device_name": "NRGkick Garage", "serial_number": "123"},
                "connector": {"type": "Type2", "phase_count": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let info = client.get_info(&[]).await.unwrap();

        assert_eq!(info.device_name(), Some("NRGkick Garage"));
        assert_eq!(info.serial_number(), Some("123"));
        assert_eq!(info.connector.unwrap().phase_count, Some(3));
    }

    #[tokio::test]
    async fn get_info_with_section_selection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .and(query_param("general", "1"))
            .and(query_param("network", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "general": {"serial_number": "123"},
                "network": {"ip_address": "192.168.1.100"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let info = client
            .get_info(&[InfoSection::General, InfoSection::Network])
            .await
            .unwrap();

        assert_eq!(info.network.unwrap().ip_address.as_deref(), Some("192.168.1.100"));
    }

    #[tokio::test]
    async fn get_values_with_section_selection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/values"))
            .and(query_param("powerflow", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "powerflow": {"total_active_power": 7400.0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let values = client.get_values(&[ValuesSection::Powerflow]).await.unwrap();

        assert_eq!(
            values.powerflow.unwrap().total_active_power,
            Some(7400.0)
        );
    }

    #[tokio::test]
    async fn get_control_parses_settings() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_set": 16.0,
                "charge_pause": 1,
                "energy_limit": 5000,
                "phase_count": 2
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let control = client.get_control().await.unwrap();

        assert_eq!(control.current_set, Some(16.0));
        assert_eq!(control.charge_pause, Some(true));
        assert_eq!(control.energy_limit, Some(5000));
        assert_eq!(control.phase_count, Some(2));
    }

    #[tokio::test]
    async fn null_body_parses_to_empty_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/values"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let values = client.get_values(&[]).await.unwrap();
        assert_eq!(values.charging_status(), None);
        assert!(values.powerflow.is_none());
    }

    #[tokio::test]
    async fn basic_auth_applied_when_credentials_set() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .and(header(
                "authorization",
                "Basic dGVzdF91c2VyOnRlc3RfcGFzcw==",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = NrgkickClient::builder()
            .host(server.uri())
            .credentials("test_user", "test_pass")
            .retry_policy(fast_retry())
            .build()
            .unwrap();

        client.get_info(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn set_current_sends_wire_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("current_set", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_set": 16.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.set_current(16.0).await.unwrap();
        assert!(response.rejection().is_none());
    }

    #[tokio::test]
    async fn set_charge_pause_encodes_flag() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("charge_pause", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "charge_pause": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.set_charge_pause(true).await.unwrap();
    }

    #[tokio::test]
    async fn set_phase_count_rejects_invalid_without_network() {
        let server = MockServer::start().await;

        // No request may reach the server for an invalid phase count.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        for phases in [0u8, 4, 5, 255] {
            let err = client.set_phase_count(phases).await.unwrap_err();
            assert!(matches!(
                err,
                Error::Value(ValueError::InvalidPhaseCount(p)) if p == phases
            ));
        }
    }

    #[tokio::test]
    async fn set_current_rejects_negative_without_network() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.set_current(-1.0).await.unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidCurrent(_))));
    }

    #[tokio::test]
    async fn status_code_decodes_from_values() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/values"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "general": {"status": 2}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let values = client.get_values(&[]).await.unwrap();
        assert_eq!(values.charging_status(), Some(ChargingStatus::Connected));
    }

    #[tokio::test]
    async fn test_connection_reports_success_and_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .and(query_param("general", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "general": {"serial_number": "123"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.test_connection().await);

        let unreachable = NrgkickClient::builder()
            .host("127.0.0.1:1")
            .retry_policy(fast_retry())
            .build()
            .unwrap();
        assert!(!unreachable.test_connection().await);
    }
}

// ============================================================================
// Retry and classification tests
// ============================================================================

mod retry_behavior {
    use super::*;

    #[tokio::test]
    async fn transient_errors_retry_until_success() {
        let server = MockServer::start().await;

        // Two transient failures, then success: the call succeeds on the
        // third attempt.
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "general": {"serial_number": "123"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let info = client.get_info(&[]).await.unwrap();
        assert_eq!(info.serial_number(), Some("123"));
    }

    #[tokio::test]
    async fn transient_errors_exhaust_all_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_info(&[]).await.unwrap_err();

        match err {
            Error::Api(ApiError::CommunicationFailed { attempts, url, .. }) => {
                assert_eq!(attempts, 3);
                assert!(url.ends_with("/info"));
            }
            other => panic!("expected CommunicationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_fails_after_single_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_info(&[]).await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn forbidden_fails_after_single_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_control().await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn error_status_with_rejection_body_is_returned_to_caller() {
        let server = MockServer::start().await;

        // The device answers 400 but the body carries its own error
        // field: that is a domain answer, not a transport failure.
        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("current_set", "16"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "Response": "Charging current blocked by solar charging"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.set_current(16.0).await.unwrap();
        assert_eq!(
            response.rejection().as_deref(),
            Some("Charging current blocked by solar charging")
        );
    }

    #[tokio::test]
    async fn error_status_without_rejection_body_raises() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_info(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn timeouts_retry_and_exhaust() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/values"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = NrgkickClient::builder()
            .host(server.uri())
            .timeout(Duration::from_millis(100))
            .retry_policy(fast_retry())
            .build()
            .unwrap();

        let err = client.get_values(&[]).await.unwrap_err();
        match err {
            Error::Api(ApiError::CommunicationFailed {
                attempts, message, ..
            }) => {
                assert_eq!(attempts, 3);
                assert!(message.contains("timed out"));
            }
            other => panic!("expected CommunicationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_errors_exhaust_into_communication_failure() {
        // Nothing listens on the discard port; every attempt is refused.
        let client = NrgkickClient::builder()
            .host("127.0.0.1:1")
            .retry_policy(fast_retry())
            .build()
            .unwrap();

        let err = client.get_info(&[]).await.unwrap_err();
        match err {
            Error::Api(ApiError::CommunicationFailed { host, attempts, .. }) => {
                assert_eq!(host, "127.0.0.1:1");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected CommunicationFailed, got {other:?}"),
        }
    }
}

// ============================================================================
// Coordinator protocol tests
// ============================================================================

mod coordinator_protocol {
    use super::*;

    async fn started_coordinator(server: &MockServer, current_set: f64) -> Coordinator {
        mount_full_state(server, current_set).await;
        let coordinator = Coordinator::new(client_for(server));
        coordinator.start().await.unwrap();
        coordinator
    }

    #[tokio::test]
    async fn start_populates_all_three_sections() {
        let server = MockServer::start().await;
        let coordinator = started_coordinator(&server, 16.0).await;

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.info.serial_number(), Some("TEST123456"));
        assert_eq!(snapshot.control.current_set, Some(16.0));
        assert_eq!(
            snapshot.values.energy.as_ref().unwrap().charged_energy,
            Some(5000.0)
        );
        assert!(snapshot.updated_at.is_some());
        assert_eq!(coordinator.health(), RefreshHealth::Healthy);

        coordinator.stop();
    }

    #[tokio::test]
    async fn start_fails_when_first_refresh_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let coordinator = Coordinator::new(client_for(&server));
        let err = coordinator.start().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::CommunicationFailed { .. })
        ));
        assert!(matches!(
            coordinator.health(),
            RefreshHealth::Degraded { .. }
        ));
    }

    #[tokio::test]
    async fn start_fails_fatally_on_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let coordinator = Coordinator::new(client_for(&server));
        let err = coordinator.start().await.unwrap_err();
        assert!(err.is_authentication());
        assert!(coordinator.health().needs_reauth());
    }

    #[tokio::test]
    async fn verified_command_patches_cache_without_refresh() {
        let server = MockServer::start().await;

        // Mount the mutation mock first: it is more specific than the
        // plain /control read that start() uses.
        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("current_set", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_set": 16.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Exactly one /info fetch: the initial refresh. A verified patch
        // must not trigger another poll.
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_set": 6.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/values"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = Coordinator::new(client_for(&server));
        coordinator.start().await.unwrap();
        coordinator.stop();
        assert_eq!(coordinator.snapshot().control.current_set, Some(6.0));

        let mut updates = coordinator.subscribe();
        updates.borrow_and_update();

        coordinator.set_current(16.0).await.unwrap();

        assert_eq!(coordinator.snapshot().control.current_set, Some(16.0));
        assert!(updates.has_changed().unwrap(), "subscribers are notified");
    }

    #[tokio::test]
    async fn verified_command_coerces_string_echo() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("current_set", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_set": "16"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = started_coordinator(&server, 6.0).await;
        coordinator.stop();

        coordinator.set_current(16.0).await.unwrap();
        assert_eq!(coordinator.snapshot().control.current_set, Some(16.0));
    }

    #[tokio::test]
    async fn mismatched_echo_raises_and_preserves_cache() {
        let server = MockServer::start().await;

        // Device clamps 32 A down to 16 A without reporting an error.
        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("current_set", "32"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_set": 16.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = started_coordinator(&server, 6.0).await;
        coordinator.stop();

        let err = coordinator.set_current(32.0).await.unwrap_err();
        match err {
            Error::Api(ApiError::VerificationMismatch {
                actual, expected, ..
            }) => {
                assert_eq!(actual, "16.0");
                assert_eq!(expected, "32");
            }
            other => panic!("expected VerificationMismatch, got {other:?}"),
        }
        assert_eq!(coordinator.snapshot().control.current_set, Some(6.0));
    }

    #[tokio::test]
    async fn invalid_echo_raises_and_preserves_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("charge_pause", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "charge_pause": "busy"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = started_coordinator(&server, 6.0).await;
        coordinator.stop();

        let err = coordinator.set_charge_pause(true).await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidEcho { .. })));
        assert_eq!(coordinator.snapshot().control.charge_pause, Some(false));
    }

    #[tokio::test]
    async fn rejection_raises_with_device_message_and_preserves_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("charge_pause", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Response": "Resume blocked by solar charging"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coordinator = started_coordinator(&server, 6.0).await;
        coordinator.stop();

        let err = coordinator.set_charge_pause(false).await.unwrap_err();
        match err {
            Error::Api(ApiError::DeviceRejected { message, .. }) => {
                assert_eq!(message, "Resume blocked by solar charging");
            }
            other => panic!("expected DeviceRejected, got {other:?}"),
        }
        assert_eq!(coordinator.snapshot().control.charge_pause, Some(false));
    }

    #[tokio::test]
    async fn ambiguous_response_settles_then_refreshes() {
        let server = MockServer::start().await;

        // The device accepts but does not echo the field.
        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("energy_limit", "5000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(2)
            .mount(&server)
            .await;

        // First read (initial refresh) reports the old limit, the
        // post-command read reports the applied one.
        Mock::given(method("GET"))
            .and(path("/control"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "energy_limit": 0
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "energy_limit": 5000
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/values"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let coordinator = Coordinator::new(client_for(&server));
        coordinator.start().await.unwrap();
        coordinator.stop();
        assert_eq!(coordinator.snapshot().control.energy_limit, Some(0));

        let began = Instant::now();
        coordinator.set_energy_limit(5000).await.unwrap();

        assert!(
            began.elapsed() >= Duration::from_secs(2),
            "device settle time is honored before the resolving refresh"
        );
        assert_eq!(coordinator.snapshot().control.energy_limit, Some(5000));
        assert_eq!(coordinator.health(), RefreshHealth::Healthy);
    }

    #[tokio::test]
    async fn verified_commands_are_idempotent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/control"))
            .and(query_param("phase_count", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "phase_count": 1
            })))
            .expect(2)
            .mount(&server)
            .await;

        let coordinator = started_coordinator(&server, 6.0).await;
        coordinator.stop();

        coordinator.set_phase_count(1).await.unwrap();
        let after_first = coordinator.snapshot().control.phase_count;

        coordinator.set_phase_count(1).await.unwrap();
        let after_second = coordinator.snapshot().control.phase_count;

        assert_eq!(after_first, Some(1));
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn set_phase_count_validates_before_any_request() {
        let server = MockServer::start().await;
        let coordinator = started_coordinator(&server, 6.0).await;
        coordinator.stop();

        server.reset().await;
        // Any request now would hit an empty mock server and fail loudly.
        let err = coordinator.set_phase_count(4).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Value(ValueError::InvalidPhaseCount(4))
        ));
    }

    #[tokio::test]
    async fn refresh_failure_degrades_health_and_keeps_snapshot() {
        let server = MockServer::start().await;
        let coordinator = started_coordinator(&server, 16.0).await;
        coordinator.stop();

        let before = coordinator.snapshot();

        server.reset().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = coordinator.request_refresh().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::CommunicationFailed { .. })
        ));
        assert!(matches!(
            coordinator.health(),
            RefreshHealth::Degraded { .. }
        ));
        assert_eq!(coordinator.snapshot(), before);
    }

    #[tokio::test]
    async fn auth_failure_during_refresh_requires_reauth() {
        let server = MockServer::start().await;
        let coordinator = started_coordinator(&server, 16.0).await;
        coordinator.stop();

        server.reset().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = coordinator.request_refresh().await.unwrap_err();
        assert!(err.is_authentication());
        assert!(coordinator.health().needs_reauth());
    }

    #[tokio::test]
    async fn request_refresh_picks_up_new_state() {
        let server = MockServer::start().await;
        let coordinator = started_coordinator(&server, 10.0).await;
        coordinator.stop();

        server.reset().await;
        mount_full_state(&server, 20.0).await;

        coordinator.request_refresh().await.unwrap();
        assert_eq!(coordinator.snapshot().control.current_set, Some(20.0));
    }
}
