//! Dashboard controller: the fetch cycle and its event fan-out
//!
//! The controller owns the session state and the device client. Each poll
//! cycle fetches the variant's payload, flips the connection indicator
//! first, then feeds the downstream components. On any failure the cycle
//! marks the dashboard disconnected and touches nothing else; the UI never
//! sees fabricated data.

use crate::client::models::{ConfigForm, DeviceStatus};
use crate::client::DeviceClient;
use crate::error::Result;
use crate::scheduler::{FetchCycle, PollScheduler};
use crate::state::{
    compose_sensor_snapshot, compose_status_cards, hourly_traffic, DashboardState, LogRow,
    SensorSnapshot, StatusCards, TRAFFIC_BUCKETS,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

/// Which dashboard this controller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardVariant {
    /// MQTT gateway dashboard: status cards, log feed, traffic histogram
    Gateway,
    /// Sensor telemetry dashboard: value cards, deltas, history charts
    Sensor,
}

impl DashboardVariant {
    /// Poll cadence the original dashboards ship with.
    pub fn default_poll_interval(&self) -> Duration {
        match self {
            DashboardVariant::Gateway => Duration::from_secs(5),
            DashboardVariant::Sensor => Duration::from_secs(2),
        }
    }
}

/// Updates published to renderers over the controller's broadcast channel
///
/// Within one cycle, `Connection` is always delivered before any dependent
/// update.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// Connection indicator state
    Connection { connected: bool },

    /// Gateway status cards refreshed
    StatusCards(StatusCards),

    /// New log rows were appended; the log view should scroll to bottom
    LogsAppended { rows: Vec<LogRow> },

    /// Traffic histogram rebuilt for this cycle
    TrafficUpdated([u32; TRAFFIC_BUCKETS]),

    /// Sensor cards and alerts refreshed
    SensorUpdated(SensorSnapshot),

    /// Device configuration loaded into the form
    ConfigLoaded(ConfigForm),

    /// A config save began; the submit control is disabled
    SaveStarted,

    /// The device accepted the configuration (reconnect may follow)
    ConfigAccepted,

    /// The save flow finished; the submit control is restored. Emitted in
    /// every outcome, including ones that carry a navigation target.
    SaveFinished,
}

/// Page controller for one dashboard session
pub struct DashboardController {
    client: Arc<dyn DeviceClient>,
    variant: DashboardVariant,
    state: Arc<RwLock<DashboardState>>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardController {
    pub fn new(client: Arc<dyn DeviceClient>, variant: DashboardVariant) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            client,
            variant,
            state: Arc::new(RwLock::new(DashboardState::new())),
            events,
        }
    }

    pub fn variant(&self) -> DashboardVariant {
        self.variant
    }

    /// Subscribe to dashboard updates.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Sender half of the event channel, for the config sync flows.
    pub fn event_sender(&self) -> broadcast::Sender<DashboardEvent> {
        self.events.clone()
    }

    /// Clone of the current session state.
    pub async fn current(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Start polling at `interval`; returns the scheduler handle. Clone the
    /// `Arc` first to keep using the controller alongside the scheduler.
    pub fn start(self: Arc<Self>, interval: Duration) -> PollScheduler {
        PollScheduler::start(self, interval)
    }

    /// Load the device configuration into a fresh form, remembering it for
    /// the MQTT badges on the status cards.
    pub async fn load_config(&self) -> Result<ConfigForm> {
        let cfg = self.client.load_config().await?;
        let mut form = ConfigForm::default();
        form.apply(&cfg);
        {
            let mut state = self.state.write().await;
            state.last_config = Some(cfg);
        }
        self.emit(DashboardEvent::ConfigLoaded(form.clone()));
        Ok(form)
    }

    fn emit(&self, event: DashboardEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn gateway_cycle(&self) -> Result<()> {
        let status: DeviceStatus = self.client.status().await?;
        let connected = status.wifi_connected;
        let uptime_ms = status.uptime_ms;
        let now = Utc::now();

        let cards;
        {
            let mut state = self.state.write().await;
            state.connected = connected;
            state.last_update = Some(now);
            state.stats.record_success();
            cards = compose_status_cards(&status, state.last_config.as_ref(), now);
            state.status = Some(status);
        }
        self.emit(DashboardEvent::Connection { connected });
        self.emit(DashboardEvent::StatusCards(cards));

        // while the station is down the device serves only its AP page;
        // charts and the log feed stay as they are
        if !connected {
            return Ok(());
        }

        match self.client.logs().await {
            Ok(batch) => {
                let now = Utc::now();
                let rows;
                let traffic;
                {
                    let mut state = self.state.write().await;
                    rows = state.log_feed.ingest(&batch, uptime_ms, now);
                    state.append_log_rows(&rows);
                    traffic = hourly_traffic(&batch, uptime_ms, now);
                    state.traffic = traffic;
                }
                if !rows.is_empty() {
                    self.emit(DashboardEvent::LogsAppended { rows });
                }
                self.emit(DashboardEvent::TrafficUpdated(traffic));
            }
            Err(e) => {
                // status succeeded, so the indicator stays as it is
                debug!("log fetch failed, keeping status-only cycle: {e}");
            }
        }
        Ok(())
    }

    async fn sensor_cycle(&self) -> Result<()> {
        let readings = self.client.sensor_readings().await?;
        let now = Utc::now();
        let label = now.format("%H:%M:%S").to_string();

        let snapshot;
        {
            let mut state = self.state.write().await;
            state.connected = true;
            state.last_update = Some(now);
            state.stats.record_success();
            snapshot = compose_sensor_snapshot(&readings, &mut state.deltas);
            state.sensor = Some(snapshot.clone());
            state.temp_series.push(label.clone(), readings.temp);
            state.hum_series.push(label.clone(), readings.hum);
            state.rain_series.push(label.clone(), readings.rain);
            state
                .combo_series
                .push(label, &[readings.temp, readings.hum]);
        }
        self.emit(DashboardEvent::Connection { connected: true });
        self.emit(DashboardEvent::SensorUpdated(snapshot));
        Ok(())
    }
}

#[async_trait]
impl FetchCycle for DashboardController {
    async fn run_cycle(&self) {
        let result = match self.variant {
            DashboardVariant::Gateway => self.gateway_cycle().await,
            DashboardVariant::Sensor => self.sensor_cycle().await,
        };

        if let Err(e) = result {
            warn!("poll cycle failed, marking disconnected: {e}");
            {
                let mut state = self.state.write().await;
                state.connected = false;
                state.stats.record_failure(e.to_string());
            }
            self.emit(DashboardEvent::Connection { connected: false });
        }
    }
}
