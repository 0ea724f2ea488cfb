//! espdash-monitor - live dashboard loop against a device
//!
//! Connects to an ESP32 dashboard device, starts the poll scheduler and
//! prints the resulting dashboard updates until interrupted.

use clap::{Parser, ValueEnum};
use espdash_rust::{
    ClientConfig, DashboardController, DashboardEvent, DashboardVariant, HttpDeviceClient,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Live monitor for ESP32 dashboard devices
#[derive(Parser, Debug)]
#[command(name = "espdash-monitor")]
#[command(about = "Polls an ESP32 dashboard device and prints its state")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Device base URL, e.g. http://192.168.4.1/
    #[arg(long, env = "ESPDASH_DEVICE_URL")]
    device_url: String,

    /// Which dashboard the device serves
    #[arg(long, value_enum, default_value_t = VariantArg::Gateway)]
    variant: VariantArg,

    /// Poll interval in milliseconds (defaults to the variant's cadence)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    Gateway,
    Sensor,
}

impl From<VariantArg> for DashboardVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Gateway => DashboardVariant::Gateway,
            VariantArg::Sensor => DashboardVariant::Sensor,
        }
    }
}

impl Args {
    fn initialize_logging(&self) {
        let filter = if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.initialize_logging();

    let variant: DashboardVariant = args.variant.into();
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| variant.default_poll_interval());

    let client = Arc::new(HttpDeviceClient::new(ClientConfig::new(&args.device_url)?)?);
    let controller = Arc::new(DashboardController::new(client, variant));

    // the gateway status cards take their MQTT badges from the stored config
    if let Err(e) = controller.load_config().await {
        warn!("could not load device configuration: {e}");
    }

    let mut events = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("dropped {skipped} dashboard updates");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!("polling {} every {interval:?}", args.device_url);
    let scheduler = controller.clone().start(interval);

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    scheduler.stop();
    Ok(())
}

fn print_event(event: DashboardEvent) {
    match event {
        DashboardEvent::Connection { connected } => {
            info!(
                "device {}",
                if connected { "connected" } else { "disconnected" }
            );
        }
        DashboardEvent::StatusCards(cards) => {
            info!(
                "status: wifi={} ip={} mqtt={} uptime={} signal={} [{} / {}]",
                cards.wifi,
                cards.ip,
                cards.mqtt,
                cards.uptime,
                cards.signal,
                cards.mode_badge,
                cards.address_badge
            );
        }
        DashboardEvent::LogsAppended { rows } => {
            for row in rows {
                info!(
                    "log #{} {} [{}] {}: {}",
                    row.seq,
                    row.timestamp.format("%H:%M:%S"),
                    row.level,
                    row.tag,
                    row.msg
                );
            }
        }
        DashboardEvent::TrafficUpdated(buckets) => {
            debug!("hourly traffic: {buckets:?}");
        }
        DashboardEvent::SensorUpdated(snapshot) => {
            info!(
                "sensors: temp {} ({}) hum {} ({}) rain {} ({}) | {} | {}",
                snapshot.temp.text(),
                snapshot.temp.trend,
                snapshot.hum.text(),
                snapshot.hum.trend,
                snapshot.rain.text(),
                snapshot.rain.trend,
                snapshot.temp_alert.text,
                snapshot.rain_alert.text
            );
        }
        DashboardEvent::ConfigLoaded(form) => {
            debug!("config loaded (broker {})", form.broker);
        }
        DashboardEvent::SaveStarted
        | DashboardEvent::ConfigAccepted
        | DashboardEvent::SaveFinished => {}
    }
}
