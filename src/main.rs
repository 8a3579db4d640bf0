mod domain;
mod infrastructure;

use crate::domain::cache::ReadingCache;
use crate::domain::models::Unit;
use crate::domain::settings::{Settings, SettingsService};
use crate::infrastructure::gatt::{self, GattContext, ServerConfig};
use crate::infrastructure::logging;
use crate::infrastructure::meter::DriverRegistry;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gluconnect")]
#[command(about = "Serves a glucometer's reading history to BLE centrals over GATT")]
struct Cli {
    /// Path to the meter device node (e.g. /dev/sda)
    #[arg(short, long)]
    device: Option<String>,

    /// Driver used to talk to the meter
    #[arg(short = 'r', long)]
    driver: Option<String>,

    /// Unit readings are reported in over BLE
    #[arg(long, value_enum)]
    unit: Option<Unit>,

    /// Bluetooth adapter to serve on (e.g. hci0)
    #[arg(long)]
    adapter: Option<String>,

    /// List the installed drivers and exit
    #[arg(long)]
    list_drivers: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_service = SettingsService::new()?;
    let mut settings = settings_service.get().clone();
    apply_cli_overrides(&mut settings, &cli);

    let _logging = logging::init_logger(&settings.log_settings)?;
    info!("Starting Gluconnect bridge");

    run(&cli, settings).await
}

fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) {
    if cli.device.is_some() {
        settings.device_path = cli.device.clone();
    }
    if cli.driver.is_some() {
        settings.driver = cli.driver.clone();
    }
    if let Some(unit) = cli.unit {
        settings.display_unit = unit;
    }
    if cli.adapter.is_some() {
        settings.adapter = cli.adapter.clone();
    }
}

async fn run(cli: &Cli, settings: Settings) -> Result<()> {
    let registry = DriverRegistry::with_builtin_drivers();

    if cli.list_drivers {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let device_path = settings
        .device_path
        .as_deref()
        .context("no device path configured; pass --device or set it in settings.json")?;
    let driver_name = settings
        .driver
        .as_deref()
        .context("no driver configured; pass --driver or set it in settings.json")?;

    // Any failure between here and serving is fatal; there is no
    // partial-cache mode.
    let mut meter = registry.open(driver_name, Path::new(device_path))?;
    meter.connect()?;
    let meter_info = meter.meter_info()?;
    info!(
        model = %meter_info.model,
        serial = ?meter_info.serial_number,
        versions = ?meter_info.version_info,
        native_unit = %meter_info.native_unit,
        "meter connected"
    );

    let readings = meter.readings()?;
    meter.disconnect()?;

    let ctx = Arc::new(GattContext::new(
        ReadingCache::new(readings),
        settings.display_unit,
    ));
    info!(readings = ctx.cache().len(), unit = %settings.display_unit, "reading history cached");
    let config = ServerConfig {
        adapter: settings.adapter.clone(),
        local_name: settings.local_name.clone(),
        grace_period: Duration::from_secs(settings.grace_period_secs),
    };
    gatt::serve(ctx, &config, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => warn!(%err, "could not listen for ctrl-c; shutting down"),
    }
}
