//! WireMock-based device API mocking
//!
//! Simulates the ESP32 firmware's HTTP endpoints so the dashboard loop can
//! be exercised without hardware.

use espdash_rust::{ClientConfig, HttpDeviceClient};
use serde_json::Value;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock dashboard device for testing
pub struct MockDeviceServer {
    pub server: MockServer,
}

impl MockDeviceServer {
    /// Start a mock device with no endpoints mounted; tests mount exactly
    /// what they need.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// HTTP client pointed at this mock device.
    pub fn client(&self) -> Arc<HttpDeviceClient> {
        let config = ClientConfig::new(&self.base_url()).expect("mock server URL is valid");
        Arc::new(HttpDeviceClient::new(config).expect("client builds"))
    }

    /// Mount `GET /status` returning `body` for every request.
    pub async fn mock_status(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /status` returning `body` for the next `times` requests
    /// only; later requests fall through to mocks mounted afterwards.
    pub async fn mock_status_times(&self, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /status` failing with the given HTTP status.
    pub async fn mock_status_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /logs` returning `body` for every request.
    pub async fn mock_logs(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /logs` for the next `times` requests only.
    pub async fn mock_logs_times(&self, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path("/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /logs` with an expectation that it is never called.
    pub async fn expect_no_log_requests(&self) {
        Mock::given(method("GET"))
            .and(path("/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /api/dados` returning `body` for every request.
    pub async fn mock_sensor_data(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/dados"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /api/dados` for the next `times` requests only.
    pub async fn mock_sensor_data_times(&self, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path("/api/dados"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /api/dados` failing with the given HTTP status.
    pub async fn mock_sensor_data_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/dados"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /api/config` returning `body`.
    pub async fn mock_config(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount `POST /api/config` with the given status and optional body.
    pub async fn mock_save(&self, status: u16, body: Option<Value>) {
        let mut template = ResponseTemplate::new(status);
        if let Some(body) = body {
            template = template.set_body_json(body);
        }
        Mock::given(method("POST"))
            .and(path("/api/config"))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Mount `POST /api/config/clear` with the given status and optional
    /// body.
    pub async fn mock_clear(&self, status: u16, body: Option<Value>) {
        let mut template = ResponseTemplate::new(status);
        if let Some(body) = body {
            template = template.set_body_json(body);
        }
        Mock::given(method("POST"))
            .and(path("/api/config/clear"))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }
}
