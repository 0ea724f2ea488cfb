//! Chart-facing series containers
//!
//! Two shapes feed the charting consumer: rolling windows that evict FIFO
//! at capacity, and a fixed 24-bucket hour-of-day histogram that is rebuilt
//! from scratch on every poll.

use crate::client::models::LogRecord;
use crate::state::logs::resolve_event_time;
use chrono::{DateTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;

/// Number of hour-of-day buckets in the traffic histogram.
pub const TRAFFIC_BUCKETS: usize = 24;

/// Messages counting as published MQTT traffic.
static MQTT_TRAFFIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)payload|publish|publicado").expect("valid traffic pattern"));

/// Bounded label/value series with lock-step FIFO eviction
///
/// Missing values are stored as an explicit `None` so the value axis stays
/// aligned with the labels.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    labels: VecDeque<String>,
    values: VecDeque<Option<f64>>,
    max_points: usize,
}

impl RollingSeries {
    pub fn new(max_points: usize) -> Self {
        Self {
            labels: VecDeque::with_capacity(max_points),
            values: VecDeque::with_capacity(max_points),
            max_points,
        }
    }

    /// Append a point, evicting the oldest one first when at capacity.
    pub fn push(&mut self, label: impl Into<String>, value: Option<f64>) {
        if self.labels.len() == self.max_points {
            self.labels.pop_front();
            self.values.pop_front();
        }
        self.labels.push_back(label.into());
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_points
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }
}

/// Bounded series with one label sequence and several datasets in lock-step
///
/// Used by the combined sensor chart (temperature + humidity share the
/// label axis). Eviction removes the oldest entry from the labels and from
/// every dataset together.
#[derive(Debug, Clone)]
pub struct MultiSeries {
    labels: VecDeque<String>,
    datasets: Vec<VecDeque<Option<f64>>>,
    max_points: usize,
}

impl MultiSeries {
    pub fn new(max_points: usize, dataset_count: usize) -> Self {
        Self {
            labels: VecDeque::with_capacity(max_points),
            datasets: vec![VecDeque::with_capacity(max_points); dataset_count],
            max_points,
        }
    }

    /// Append one point per dataset; values not supplied become `None`.
    pub fn push(&mut self, label: impl Into<String>, values: &[Option<f64>]) {
        if self.labels.len() == self.max_points {
            self.labels.pop_front();
            for dataset in &mut self.datasets {
                dataset.pop_front();
            }
        }
        self.labels.push_back(label.into());
        for (i, dataset) in self.datasets.iter_mut().enumerate() {
            dataset.push_back(values.get(i).copied().flatten());
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn dataset(&self, index: usize) -> Option<impl Iterator<Item = Option<f64>> + '_> {
        self.datasets.get(index).map(|d| d.iter().copied())
    }
}

/// Labels for the 24 traffic buckets (`0:00` .. `23:00`).
pub fn hour_labels() -> Vec<String> {
    (0..TRAFFIC_BUCKETS).map(|h| format!("{h}:00")).collect()
}

/// Rebuild the hourly MQTT traffic histogram from one poll's log batch.
///
/// A record counts when its tag is `mqtt` (any casing) and its message
/// looks like publish traffic. The bucket is the event's hour of day, using
/// the same uptime-relative reconstruction as the log feed. The whole array
/// is replaced each cycle; nothing carries over between polls.
pub fn hourly_traffic(
    batch: &[LogRecord],
    uptime_ms: Option<u64>,
    now: DateTime<Utc>,
) -> [u32; TRAFFIC_BUCKETS] {
    let mut buckets = [0u32; TRAFFIC_BUCKETS];
    for record in batch {
        let is_mqtt = record
            .tag
            .as_deref()
            .is_some_and(|tag| tag.eq_ignore_ascii_case("mqtt"));
        let is_traffic = record
            .msg
            .as_deref()
            .is_some_and(|msg| MQTT_TRAFFIC.is_match(msg));
        if !is_mqtt || !is_traffic {
            continue;
        }

        let hour = resolve_event_time(now, uptime_ms, record.ts_ms).hour() as usize;
        buckets[hour % TRAFFIC_BUCKETS] += 1;
    }
    buckets
}
