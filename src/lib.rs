//! Dashboard synchronization engine for ESP32 device dashboards
//!
//! This crate implements the polling loop behind two nearly-identical
//! device dashboards: an MQTT gateway configuration UI and a sensor
//! telemetry UI. It polls the device's small HTTP API, maintains the
//! session state (connection indicator, deduplicated log feed, metric
//! deltas, chart series) and publishes typed updates for a renderer to
//! consume. Configuration changes are posted back, including the
//! post-save reconnect handshake that follows the device onto its new
//! network.
//!
//! # Structure
//!
//! - [`client`]: HTTP client for the device endpoints, behind a trait seam
//! - [`state`]: pure session state (log cursor, deltas, series, cards)
//! - [`scheduler`]: pausable, re-armable, cancellable poll timer
//! - [`controller`]: the fetch cycle and its event fan-out
//! - [`config_sync`]: config load/save/clear and the reconnect handshake

pub mod client;
pub mod config_sync;
pub mod controller;
pub mod error;
pub mod scheduler;
pub mod state;

// Re-export main types for convenience
pub use client::{ClientConfig, DeviceClient, HttpDeviceClient};
pub use config_sync::{ClearOutcome, ConfigSync, Navigation, ReconnectPolicy, SaveOutcome};
pub use controller::{DashboardController, DashboardEvent, DashboardVariant};
pub use error::{EspDashError, Result};
pub use scheduler::{FetchCycle, PollScheduler};
