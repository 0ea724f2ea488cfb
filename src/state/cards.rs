//! Presentation state for dashboard cards
//!
//! Pure composition of fetched payloads into display-ready card models;
//! absent data always surfaces as a placeholder, never as a made-up value.

use crate::client::models::{DeviceConfig, DeviceStatus, SensorReadings};
use crate::state::deltas::{DeltaTracker, MetricKey, Trend};
use chrono::{DateTime, Utc};

/// Status page cards for the gateway dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCards {
    pub last_update: String,
    pub wifi: String,
    pub ip: String,
    pub mqtt: String,
    pub uptime: String,
    pub mode_badge: String,
    pub address_badge: String,
    pub gateway: String,
    pub signal: String,
    pub qos_badge: String,
    pub broker: String,
    pub boot_count: String,
}

/// Compose the gateway status cards from the latest poll.
///
/// `config` is the last loaded device configuration; the MQTT badges come
/// from it rather than from `/status`.
pub fn compose_status_cards(
    status: &DeviceStatus,
    config: Option<&DeviceConfig>,
    now: DateTime<Utc>,
) -> StatusCards {
    let qos = config
        .and_then(|c| c.qos.as_deref())
        .filter(|q| !q.is_empty())
        .unwrap_or("--");
    let broker = config
        .and_then(|c| c.broker.as_deref())
        .filter(|b| !b.is_empty())
        .unwrap_or("--");

    StatusCards {
        last_update: now.format("%H:%M:%S").to_string(),
        wifi: if status.wifi_connected {
            "Connected".to_string()
        } else {
            "Disconnected".to_string()
        },
        ip: status.ip.clone().unwrap_or_else(|| "-".to_string()),
        mqtt: if status.mqtt_connected.unwrap_or(false) {
            "Broker connected".to_string()
        } else {
            "Error".to_string()
        },
        uptime: status.uptime.clone().unwrap_or_else(|| "-".to_string()),
        mode_badge: status.mode_badge().to_string(),
        address_badge: status.address_badge().to_string(),
        gateway: status.gw.clone().unwrap_or_else(|| "--".to_string()),
        signal: status.signal_quality(),
        qos_badge: format!("QoS {qos}"),
        broker: broker.to_string(),
        // not exposed by the firmware
        boot_count: "--".to_string(),
    }
}

/// Severity bucket for an alert card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Ok,
    Warn,
    Danger,
}

/// One alert card; `severity` is `None` when the level is unknown
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCard {
    pub text: String,
    pub severity: Option<AlertSeverity>,
}

impl AlertCard {
    fn new(text: &str, severity: AlertSeverity) -> Self {
        Self {
            text: text.to_string(),
            severity: Some(severity),
        }
    }

    fn unknown() -> Self {
        Self {
            text: "--".to_string(),
            severity: None,
        }
    }
}

/// Map the firmware's temperature alert level onto a card.
pub fn temp_alert(level: Option<&str>) -> AlertCard {
    match level {
        Some("normal") => AlertCard::new("Temperature normal", AlertSeverity::Ok),
        Some("media") => AlertCard::new("Temperature moderate", AlertSeverity::Warn),
        Some("alta") => AlertCard::new("Temperature high", AlertSeverity::Danger),
        _ => AlertCard::unknown(),
    }
}

/// Map the firmware's rain alert level onto a card.
pub fn rain_alert(level: Option<&str>) -> AlertCard {
    match level {
        Some("sem_chuva") => AlertCard::new("No rain", AlertSeverity::Ok),
        Some("chuva_media") => AlertCard::new("Moderate rain", AlertSeverity::Warn),
        Some("chuva_forte") => AlertCard::new("Heavy rain", AlertSeverity::Danger),
        _ => AlertCard::unknown(),
    }
}

/// One sensor value card: current reading plus its trend
#[derive(Debug, Clone, PartialEq)]
pub struct CardValue {
    pub value: f64,
    pub unit: &'static str,
    pub trend: Trend,
}

impl CardValue {
    /// Display text for the main value, e.g. `"21.5 °C"`.
    pub fn text(&self) -> String {
        format!("{:.1} {}", self.value, self.unit)
    }
}

/// Display-ready snapshot of the sensor dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    pub temp: CardValue,
    pub hum: CardValue,
    pub rain: CardValue,
    pub temp_alert: AlertCard,
    pub rain_alert: AlertCard,
}

/// Compose the sensor cards from one poll, advancing the delta tracker.
///
/// Missing readings render as 0 on the cards (matching the firmware's own
/// UI); the chart series handle absence separately as explicit gaps.
pub fn compose_sensor_snapshot(
    readings: &SensorReadings,
    tracker: &mut DeltaTracker,
) -> SensorSnapshot {
    let mut card = |key: MetricKey, reading: Option<f64>, unit: &'static str| {
        let value = reading.unwrap_or(0.0);
        let delta = tracker.update(key, value);
        CardValue {
            value,
            unit,
            trend: Trend::from_delta(delta),
        }
    };

    let temp = card(MetricKey::Temperature, readings.temp, "°C");
    let hum = card(MetricKey::Humidity, readings.hum, "%");
    let rain = card(MetricKey::Rain, readings.rain, "%");

    let alerts = readings.alerts.as_ref();
    SensorSnapshot {
        temp,
        hum,
        rain,
        temp_alert: temp_alert(alerts.and_then(|a| a.temp.as_deref())),
        rain_alert: rain_alert(alerts.and_then(|a| a.rain.as_deref())),
    }
}
