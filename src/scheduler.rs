//! Fixed-interval poll scheduling
//!
//! Drives the fetch cycle on a repeating timer. The scheduler handle can
//! pause and resume cycles, re-arm the timer with a new period at runtime,
//! and stop the loop for good. While paused the timer keeps ticking and
//! each tick is simply a no-op.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One poll cycle, invoked by the scheduler on every (unpaused) tick
#[async_trait]
pub trait FetchCycle: Send + Sync + 'static {
    /// Run one fetch-and-update cycle. Failures are handled inside the
    /// cycle; the scheduler never retries faster than the poll cadence.
    async fn run_cycle(&self);
}

/// Handle to a running poll loop
///
/// Dropping the handle (or calling [`stop`](Self::stop)) ends the loop;
/// in-flight cycles are never aborted.
pub struct PollScheduler {
    interval_tx: watch::Sender<Duration>,
    paused: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl PollScheduler {
    /// Arm a repeating timer and start invoking `cycle` every `interval`.
    ///
    /// The first tick fires immediately (the dashboards read once on page
    /// load); subsequent ticks follow the configured period.
    pub fn start(cycle: Arc<dyn FetchCycle>, interval: Duration) -> Self {
        let interval = sanitize(interval);
        let (interval_tx, mut interval_rx) = watch::channel(interval);
        let paused = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        let task_paused = paused.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut period = *interval_rx.borrow();
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("poll scheduler started (interval {period:?})");

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    changed = interval_rx.changed() => {
                        if changed.is_err() {
                            // handle dropped
                            break;
                        }
                        period = *interval_rx.borrow();
                        ticker = interval_at(Instant::now() + period, period);
                        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        debug!("poll interval re-armed to {period:?}");
                    }
                    _ = ticker.tick() => {
                        if task_paused.load(Ordering::Relaxed) {
                            continue;
                        }
                        cycle.run_cycle().await;
                    }
                }
            }
            info!("poll scheduler stopped");
        });

        Self {
            interval_tx,
            paused,
            cancel,
        }
    }

    /// Re-arm the timer with a new period, effective from the next tick.
    /// The currently running cycle, if any, is not aborted.
    pub fn set_interval(&self, interval: Duration) {
        let _ = self.interval_tx.send(sanitize(interval));
    }

    /// Suspend fetch cycles. The timer keeps ticking; ticks do nothing.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Resume fetch cycles from the next tick.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Stop the poll loop. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

fn sanitize(interval: Duration) -> Duration {
    if interval.is_zero() {
        warn!("poll interval of zero requested, clamping to 1ms");
        Duration::from_millis(1)
    } else {
        interval
    }
}
