//! In-memory dashboard session state
//!
//! Everything the page-session owned as scattered globals in the original
//! front-ends lives here as one explicit state object: the log cursor, the
//! per-metric last values, the chart series and the poll statistics. The
//! state is plain data; the controller owns the only instance and all
//! mutation goes through it.

pub mod cards;
pub mod deltas;
pub mod logs;
pub mod series;

pub use cards::{
    compose_sensor_snapshot, compose_status_cards, AlertCard, AlertSeverity, CardValue,
    SensorSnapshot, StatusCards,
};
pub use deltas::{DeltaTracker, MetricKey, Trend, DELTA_EPSILON};
pub use logs::{LogFeed, LogRow};
pub use series::{hour_labels, hourly_traffic, MultiSeries, RollingSeries, TRAFFIC_BUCKETS};

use crate::client::models::{DeviceConfig, DeviceStatus};
use chrono::{DateTime, Utc};

/// Rolling window length for the sensor history charts.
pub const SENSOR_HISTORY_POINTS: usize = 30;

/// Retained rendered log rows; older rows fall off the front.
pub const MAX_LOG_ROWS: usize = 1000;

/// Poll cycle statistics
#[derive(Debug, Clone, Default)]
pub struct PollStats {
    pub cycles: u64,
    pub successes: u64,
    pub failures: u64,
    pub last_error: Option<String>,
}

impl PollStats {
    pub fn record_success(&mut self) {
        self.cycles += 1;
        self.successes += 1;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.cycles += 1;
        self.failures += 1;
        self.last_error = Some(error.into());
    }
}

/// Session state for one dashboard
///
/// Both variants share the shape; the gateway cycle exercises the log and
/// traffic halves, the sensor cycle the series and snapshot halves. Nothing
/// here outlives the process.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Connection indicator, derived from the most recent poll
    pub connected: bool,

    /// Wall-clock time of the last successful poll
    pub last_update: Option<DateTime<Utc>>,

    /// Latest device status payload (gateway)
    pub status: Option<DeviceStatus>,

    /// Last configuration loaded from the device, feeding the MQTT badges
    pub last_config: Option<DeviceConfig>,

    /// Log sequence cursor
    pub log_feed: LogFeed,

    /// Rendered log rows, bounded to [`MAX_LOG_ROWS`]
    pub log_rows: Vec<LogRow>,

    /// Hourly MQTT traffic histogram, rebuilt each gateway cycle
    pub traffic: [u32; TRAFFIC_BUCKETS],

    /// Per-metric last values (sensor)
    pub deltas: DeltaTracker,

    /// Latest sensor snapshot (sensor)
    pub sensor: Option<SensorSnapshot>,

    pub temp_series: RollingSeries,
    pub hum_series: RollingSeries,
    pub rain_series: RollingSeries,

    /// Combined chart: temperature and humidity over shared labels
    pub combo_series: MultiSeries,

    pub stats: PollStats,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            connected: false,
            last_update: None,
            status: None,
            last_config: None,
            log_feed: LogFeed::new(),
            log_rows: Vec::new(),
            traffic: [0; TRAFFIC_BUCKETS],
            deltas: DeltaTracker::new(),
            sensor: None,
            temp_series: RollingSeries::new(SENSOR_HISTORY_POINTS),
            hum_series: RollingSeries::new(SENSOR_HISTORY_POINTS),
            rain_series: RollingSeries::new(SENSOR_HISTORY_POINTS),
            combo_series: MultiSeries::new(SENSOR_HISTORY_POINTS, 2),
            stats: PollStats::default(),
        }
    }

    /// Append freshly ingested rows, trimming from the front at capacity.
    pub fn append_log_rows(&mut self, rows: &[LogRow]) {
        self.log_rows.extend_from_slice(rows);
        if self.log_rows.len() > MAX_LOG_ROWS {
            let excess = self.log_rows.len() - MAX_LOG_ROWS;
            self.log_rows.drain(..excess);
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_poll_stats_accounting() {
        let mut stats = PollStats::default();
        stats.record_success();
        stats.record_failure("device unreachable");
        stats.record_success();

        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.last_error.as_deref(), Some("device unreachable"));
    }

    #[test]
    fn test_log_rows_bounded() {
        let mut state = DashboardState::new();
        let row = LogRow {
            seq: 1,
            timestamp: Utc::now(),
            level: "INFO".to_string(),
            tag: "-".to_string(),
            msg: "-".to_string(),
        };
        let rows: Vec<LogRow> = (0..MAX_LOG_ROWS + 10)
            .map(|i| LogRow {
                seq: i as u64,
                ..row.clone()
            })
            .collect();

        state.append_log_rows(&rows);
        assert_eq!(state.log_rows.len(), MAX_LOG_ROWS);
        assert_eq!(state.log_rows[0].seq, 10);
    }
}
