//! espdash-config - device configuration tool
//!
//! Shows, edits and clears the WiFi/MQTT configuration stored on an ESP32
//! dashboard device, including the post-save wait for the device's new
//! address.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use espdash_rust::client::models::ConfigForm;
use espdash_rust::{
    ClearOutcome, ClientConfig, ConfigSync, DashboardVariant, HttpDeviceClient, Navigation,
    SaveOutcome,
};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration tool for ESP32 dashboard devices
#[derive(Parser, Debug)]
#[command(name = "espdash-config")]
#[command(about = "Read and write the configuration of an ESP32 dashboard device")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Device base URL, e.g. http://192.168.4.1/
    #[arg(long, global = true, env = "ESPDASH_DEVICE_URL", default_value = "http://192.168.4.1/")]
    device_url: String,

    /// Which dashboard the device serves
    #[arg(long, global = true, value_enum, default_value_t = VariantArg::Gateway)]
    variant: VariantArg,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
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

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the configuration currently stored on the device
    Show,

    /// Update configuration fields and wait for the device to reconnect
    Save(SaveArgs),

    /// Erase all stored configuration (device falls back to AP mode)
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct SaveArgs {
    #[arg(long)]
    ssid: Option<String>,
    #[arg(long)]
    pass: Option<String>,
    #[arg(long)]
    broker: Option<String>,
    #[arg(long)]
    port: Option<String>,
    #[arg(long)]
    topic: Option<String>,
    #[arg(long)]
    qos: Option<String>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    pass_mqtt: Option<String>,
}

impl SaveArgs {
    fn apply(&self, form: &mut ConfigForm) {
        if let Some(v) = &self.ssid {
            form.ssid = v.clone();
        }
        if let Some(v) = &self.pass {
            form.pass = v.clone();
        }
        if let Some(v) = &self.broker {
            form.broker = v.clone();
        }
        if let Some(v) = &self.port {
            form.port = v.clone();
        }
        if let Some(v) = &self.topic {
            form.topic = v.clone();
        }
        if let Some(v) = &self.qos {
            form.qos = v.clone();
        }
        if let Some(v) = &self.user {
            form.user = v.clone();
        }
        if let Some(v) = &self.pass_mqtt {
            form.pass_mqtt = v.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let client = Arc::new(HttpDeviceClient::new(ClientConfig::new(&cli.device_url)?)?);
    let sync = ConfigSync::new(client, cli.variant.into());

    match cli.command {
        Command::Show => {
            let form = sync.load().await?;
            print_form(&form);
        }
        Command::Save(args) => {
            // start from what the device has so unspecified fields keep
            // their stored values, like editing the web form would
            let mut form = match sync.load().await {
                Ok(form) => form,
                Err(e) => {
                    warn!("could not load current configuration, starting empty: {e}");
                    ConfigForm::default()
                }
            };
            args.apply(&mut form);

            println!("Saving configuration...");
            match sync.save(&form).await {
                SaveOutcome::Saved { navigation } => {
                    println!("Configuration saved.");
                    follow(navigation).await;
                }
                SaveOutcome::TimedOut => {
                    println!(
                        "Configuration saved, but the device did not report a network \
                         address in time. Find it via your router and open it manually."
                    );
                }
                SaveOutcome::Failed => {
                    println!("Communication error while saving.");
                    std::process::exit(1);
                }
            }
        }
        Command::Clear { yes } => {
            if !yes && !confirm("This will ERASE all stored configuration. Continue?")? {
                println!("Aborted.");
                return Ok(());
            }
            match sync.clear().await {
                ClearOutcome::Cleared { navigation } => {
                    println!("Configuration cleared. The device returns to AP mode.");
                    if let Some(navigation) = navigation {
                        follow(navigation).await;
                    }
                }
                ClearOutcome::Failed => {
                    println!("Communication error while clearing.");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_form(form: &ConfigForm) {
    fn field(v: &str) -> &str {
        if v.is_empty() {
            "-"
        } else {
            v
        }
    }
    fn masked(v: &str) -> &str {
        if v.is_empty() {
            "-"
        } else {
            "***"
        }
    }
    println!("ssid:      {}", field(&form.ssid));
    println!("pass:      {}", masked(&form.pass));
    println!("broker:    {}", field(&form.broker));
    println!("port:      {}", field(&form.port));
    println!("topic:     {}", field(&form.topic));
    println!("qos:       {}", field(&form.qos));
    println!("user:      {}", field(&form.user));
    println!("pass_mqtt: {}", masked(&form.pass_mqtt));
}

async fn follow(navigation: Navigation) {
    match navigation {
        Navigation::Redirect { url, after } => {
            if !after.is_zero() {
                tokio::time::sleep(after).await;
            }
            println!("Device is now reachable at {url}");
        }
        Navigation::ReturnHome => {
            println!("The device will restart; reconnect to it on its current address.");
        }
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
