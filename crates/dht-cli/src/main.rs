//! `dht`: command-line front end for the DHT read service.
//!
//! Readouts are printed as one JSON object per line. Logging goes to stderr
//! and is controlled by `RUST_LOG` (default `info`).

mod cli;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dht_hardware::MockSensor;
use dht_sensor::{SensorService, SensorSettings};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = build_service(&cli)?;

    match cli.command {
        Command::Read { sensor_type, pin } => {
            let readout = match (sensor_type, pin) {
                (Some(sensor_type), Some(pin)) => {
                    let service = service.clone();
                    tokio::task::spawn_blocking(move || service.read(sensor_type, pin)).await?
                }
                _ => {
                    let service = service.clone();
                    tokio::task::spawn_blocking(move || Ok(service.read_configured())).await?
                }
            }?;
            println!("{}", serde_json::to_string(&readout)?);
        }
        Command::Poll {
            sensor_type,
            pin,
            count,
            interval_ms,
        } => poll(&service, sensor_type, pin, count, Duration::from_millis(interval_ms)).await?,
    }

    Ok(())
}

fn build_service(cli: &Cli) -> anyhow::Result<SensorService<MockSensor>> {
    let (driver, handle) = match cli.simulate {
        Some(reading) => MockSensor::responding(reading.0),
        None => MockSensor::new(),
    };
    handle.fail_times(cli.fail_first);
    handle.fail_bring_up(cli.fail_bring_up);

    let settings = SensorSettings::default()
        .with_backoff(Duration::from_millis(cli.backoff_ms))
        .with_max_workers(cli.workers);
    let service = SensorService::with_settings(driver, settings);

    if let Some(path) = &cli.config {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        service
            .configure_json(&json)
            .with_context(|| format!("invalid options in {}", path.display()))?;
    }
    if let Some(max_retries) = cli.max_retries {
        service.set_max_retries(max_retries);
    }

    Ok(service)
}

async fn poll(
    service: &SensorService<MockSensor>,
    sensor_type: u8,
    pin: u8,
    count: u32,
    interval: Duration,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    for n in 1..=count {
        let tx = tx.clone();
        service
            .read_with_callback(sensor_type, pin, move |error, temperature, humidity| {
                let _ = tx.send((n, error, temperature, humidity));
            })
            .await?;

        if let Some((n, error, temperature, humidity)) = rx.recv().await {
            let line = serde_json::json!({
                "read": n,
                "error": error.as_ref().map(ToString::to_string),
                "temperature": temperature,
                "humidity": humidity,
            });
            println!("{line}");
            if let Some(error) = error {
                warn!("Read {} of {} failed: {}", n, count, error);
            }
        }

        if n < count {
            tokio::time::sleep(interval).await;
        }
    }

    info!("Polling finished after {} reads", count);
    Ok(())
}
