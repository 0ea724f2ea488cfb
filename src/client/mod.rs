//! Device API client
//!
//! The dashboard core talks to the device through the [`DeviceClient`]
//! trait; [`HttpDeviceClient`] is the real implementation and tests swap in
//! mock servers behind the same seam.

pub mod http;
pub mod models;

pub use http::{ClientConfig, HttpDeviceClient};
pub use models::{
    AlertLevels, ClearConfigResponse, ConfigForm, DeviceConfig, DeviceStatus, LogRecord,
    SaveConfigResponse, SensorReadings,
};

use crate::error::Result;
use async_trait::async_trait;

/// Client abstraction over the device's HTTP endpoints
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// `GET /status`
    async fn status(&self) -> Result<DeviceStatus>;

    /// `GET /logs`
    async fn logs(&self) -> Result<Vec<LogRecord>>;

    /// `GET /api/dados`
    async fn sensor_readings(&self) -> Result<SensorReadings>;

    /// `GET /api/config`
    async fn load_config(&self) -> Result<DeviceConfig>;

    /// `POST /api/config`
    async fn save_config(&self, form: &ConfigForm) -> Result<SaveConfigResponse>;

    /// `POST /api/config/clear`
    async fn clear_config(&self) -> Result<ClearConfigResponse>;
}
