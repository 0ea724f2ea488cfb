//! Wire models for the device's HTTP API
//!
//! Every field the firmware may omit is optional; absent data is rendered
//! as a placeholder by the presentation layer, never interpolated.

use serde::{Deserialize, Deserializer, Serialize};

/// Address the device uses for its own access point.
pub const AP_DEFAULT_IP: &str = "192.168.4.1";

/// Placeholder address reported while the station interface has no lease.
pub const UNASSIGNED_IP: &str = "0.0.0.0";

/// Response shape of `GET /status`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceStatus {
    /// Station interface association state
    #[serde(default)]
    pub wifi_connected: bool,
    /// Current IP address, if the firmware reports one
    pub ip: Option<String>,
    /// Broker session state
    pub mqtt_connected: Option<bool>,
    /// Human-readable uptime string
    pub uptime: Option<String>,
    /// Uptime in milliseconds, used to reconstruct log timestamps
    pub uptime_ms: Option<u64>,
    /// Operating mode reported by the firmware (`AP` or `STA`)
    pub mode: Option<String>,
    /// Default gateway address
    pub gw: Option<String>,
    /// Station RSSI in dBm
    pub rssi: Option<i32>,
}

impl DeviceStatus {
    /// IP address usable for navigation: present and not the `0.0.0.0`
    /// placeholder the firmware reports before DHCP completes.
    pub fn station_address(&self) -> Option<&str> {
        self.ip
            .as_deref()
            .filter(|ip| !ip.is_empty() && *ip != UNASSIGNED_IP)
    }

    /// Mode badge text: the reported mode, else inferred from association.
    pub fn mode_badge(&self) -> &str {
        match self.mode.as_deref() {
            Some(mode) if !mode.is_empty() => mode,
            _ => {
                if self.wifi_connected {
                    "STA"
                } else {
                    "AP"
                }
            }
        }
    }

    /// Address badge: `AP` while serving its own network, `DHCP` otherwise.
    pub fn address_badge(&self) -> &str {
        let on_ap_address = !self.wifi_connected && self.ip.as_deref() == Some(AP_DEFAULT_IP);
        if self.mode.as_deref() == Some("AP") || on_ap_address {
            "AP"
        } else {
            "DHCP"
        }
    }

    /// Signal quality text: `"<pct>% (<rssi> dBm)"`, or `"--"` when the
    /// radio reports nothing usable.
    pub fn signal_quality(&self) -> String {
        let rssi = self.rssi.unwrap_or(-127);
        if rssi <= -120 {
            return "--".to_string();
        }
        format!("{}% ({} dBm)", signal_percent(rssi), rssi)
    }
}

/// Map an RSSI reading in dBm onto a 0..=100 quality percentage.
///
/// -90 dBm and below is 0%, -30 dBm and above is 100%, linear in between.
pub fn signal_percent(rssi: i32) -> u8 {
    let pct = ((rssi + 90) as f64 * (100.0 / 60.0)).round();
    pct.clamp(0.0, 100.0) as u8
}

/// One entry of the `GET /logs` ring buffer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogRecord {
    /// Monotonic sequence number; entries without one are skipped
    pub seq: Option<u64>,
    /// Device-relative timestamp in milliseconds since boot
    pub ts_ms: Option<u64>,
    pub level: Option<String>,
    pub tag: Option<String>,
    pub msg: Option<String>,
}

/// Response shape of `GET /api/dados`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SensorReadings {
    pub temp: Option<f64>,
    pub hum: Option<f64>,
    pub rain: Option<f64>,
    pub alerts: Option<AlertLevels>,
}

/// Alert level strings as emitted by the sensor firmware
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlertLevels {
    /// `normal`, `media` or `alta`
    pub temp: Option<String>,
    /// `sem_chuva`, `chuva_media` or `chuva_forte`
    pub rain: Option<String>,
}

/// Response shape of `GET /api/config`
///
/// The firmware may return `port` and `qos` as numbers or strings depending
/// on where the value came from, so both are normalized to strings here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceConfig {
    pub ssid: Option<String>,
    pub pass: Option<String>,
    pub broker: Option<String>,
    #[serde(default, deserialize_with = "stringly")]
    pub port: Option<String>,
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "stringly")]
    pub qos: Option<String>,
    pub user: Option<String>,
    pub pass_mqtt: Option<String>,
}

/// Editable configuration form state
///
/// All fields are plain strings the way the firmware's own web form submits
/// them; no client-side validation is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigForm {
    pub ssid: String,
    pub pass: String,
    pub broker: String,
    pub port: String,
    pub topic: String,
    pub qos: String,
    pub user: String,
    pub pass_mqtt: String,
}

impl ConfigForm {
    /// Populate fields from a (possibly partial) remote config; fields
    /// absent from the response are left untouched.
    pub fn apply(&mut self, cfg: &DeviceConfig) {
        if let Some(v) = &cfg.ssid {
            self.ssid = v.clone();
        }
        if let Some(v) = &cfg.pass {
            self.pass = v.clone();
        }
        if let Some(v) = &cfg.broker {
            self.broker = v.clone();
        }
        if let Some(v) = &cfg.port {
            self.port = v.clone();
        }
        if let Some(v) = &cfg.topic {
            self.topic = v.clone();
        }
        if let Some(v) = &cfg.qos {
            self.qos = v.clone();
        }
        if let Some(v) = &cfg.user {
            self.user = v.clone();
        }
        if let Some(v) = &cfg.pass_mqtt {
            self.pass_mqtt = v.clone();
        }
    }
}

/// Response body of `POST /api/config`
///
/// The gateway firmware returns an empty body; the sensor firmware may name
/// the address the device will come up on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveConfigResponse {
    pub next_url: Option<String>,
}

/// Response body of `POST /api/config/clear`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearConfigResponse {
    pub ap_url: Option<String>,
}

/// Accept strings or numbers, normalizing to `Option<String>`.
fn stringly<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }))
}
