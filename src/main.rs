use log::{error, info, warn};

use ruuvitag_monitor::bluetooth::BluerScanner;
use ruuvitag_monitor::config::{bind_registry, BeaconConfig};
use ruuvitag_monitor::monitor::Monitor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match BeaconConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Stand-in for a host framework: publish each state change to the log
    let registry = bind_registry(
        &config,
        Box::new(|sensor| match sensor.state() {
            Some(value) => info!(
                "{}: {} {}",
                sensor.name(),
                value,
                sensor.unit_of_measurement()
            ),
            None => info!("{}: unknown", sensor.name()),
        }),
    );

    if registry.is_empty() {
        warn!("No devices were added");
        return Ok(());
    }

    let scanner = match BluerScanner::new().await {
        Ok(scanner) => scanner,
        Err(e) => {
            error!("Failed to initialize Bluetooth scanner: {}", e);
            return Err(e.into());
        }
    };

    let mut monitor = Monitor::new(registry, scanner);
    monitor.start();

    // Run until Ctrl+C, then stop the monitor before exiting
    tokio::signal::ctrl_c().await?;
    info!("Program terminated by user. Exiting gracefully.");
    monitor.stop().await;

    Ok(())
}
