//! HTTP implementation of the device client

use super::models::{
    ClearConfigResponse, ConfigForm, DeviceConfig, DeviceStatus, LogRecord, SaveConfigResponse,
    SensorReadings,
};
use super::DeviceClient;
use crate::error::{EspDashError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the device, e.g. `http://192.168.4.1/`
    pub base_url: Url,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config for the given device URL with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| EspDashError::invalid_input(format!("invalid device URL: {e}")))?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(10),
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Reqwest-backed device client
#[derive(Debug, Clone)]
pub struct HttpDeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpDeviceClient {
    /// Create a new client for the device at `config.base_url`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| EspDashError::invalid_input(format!("invalid endpoint {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(EspDashError::connection(format!(
                "{path} returned HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// POST helper tolerating the gateway firmware's empty success bodies.
    async fn post_json<B: serde::Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("POST {url}");
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EspDashError::connection(format!(
                "{path} returned HTTP {}",
                response.status()
            )));
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }
}

#[async_trait]
impl DeviceClient for HttpDeviceClient {
    async fn status(&self) -> Result<DeviceStatus> {
        self.get_json("/status").await
    }

    async fn logs(&self) -> Result<Vec<LogRecord>> {
        self.get_json("/logs").await
    }

    async fn sensor_readings(&self) -> Result<SensorReadings> {
        self.get_json("/api/dados").await
    }

    async fn load_config(&self) -> Result<DeviceConfig> {
        self.get_json("/api/config").await
    }

    async fn save_config(&self, form: &ConfigForm) -> Result<SaveConfigResponse> {
        self.post_json("/api/config", Some(form)).await
    }

    async fn clear_config(&self) -> Result<ClearConfigResponse> {
        self.post_json::<ConfigForm, ClearConfigResponse>("/api/config/clear", None)
            .await
    }
}
