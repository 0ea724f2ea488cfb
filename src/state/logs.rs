//! Log feed deduplication and timestamp reconstruction
//!
//! The device returns its whole log ring buffer on every poll; the feed
//! keeps a sequence cursor so each entry is rendered at most once.

use crate::client::models::LogRecord;
use chrono::{DateTime, Duration, Utc};

/// One rendered log row
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub seq: u64,
    /// Absolute display timestamp (reconstructed when the device provides
    /// uptime-relative times, otherwise the poll's wall clock)
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub tag: String,
    pub msg: String,
}

/// Deduplicating log feed with a monotonic sequence cursor
#[derive(Debug, Clone, Default)]
pub struct LogFeed {
    last_seq: u64,
}

impl LogFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest sequence number rendered so far.
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Process one poll's batch, returning the rows to append.
    ///
    /// Records without a numeric `seq`, or with `seq` at or below the
    /// cursor, are skipped. The cursor never decreases; a device reboot
    /// resets sequence numbers and those records are dropped until the
    /// counter passes the cursor again (known limitation, kept from the
    /// original behavior).
    pub fn ingest(
        &mut self,
        batch: &[LogRecord],
        uptime_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Vec<LogRow> {
        let mut rows = Vec::new();
        for record in batch {
            let Some(seq) = record.seq else { continue };
            if seq <= self.last_seq {
                continue;
            }

            rows.push(LogRow {
                seq,
                timestamp: resolve_event_time(now, uptime_ms, record.ts_ms),
                level: record.level.clone().unwrap_or_else(|| "INFO".to_string()),
                tag: record.tag.clone().unwrap_or_else(|| "-".to_string()),
                msg: record.msg.clone().unwrap_or_else(|| "-".to_string()),
            });
            self.last_seq = seq;
        }
        rows
    }
}

/// Reconstruct an absolute event time from device-relative milliseconds.
///
/// The device reports how long it has been up (`uptime_ms`) and stamps each
/// log entry with its own boot-relative `ts_ms`; the event happened
/// `uptime_ms - ts_ms` before the poll. Without both values the poll's wall
/// clock is used.
pub fn resolve_event_time(
    now: DateTime<Utc>,
    uptime_ms: Option<u64>,
    ts_ms: Option<u64>,
) -> DateTime<Utc> {
    match (uptime_ms, ts_ms) {
        (Some(uptime), Some(ts)) if uptime > 0 => {
            now - Duration::milliseconds(uptime as i64 - ts as i64)
        }
        _ => now,
    }
}
