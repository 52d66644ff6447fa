//! Command-line arguments.

use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dht_core::Measurement;

/// Read DHT11/DHT22 sensors through the retrying read service.
///
/// Without real GPIO access the reads go to a simulated sensor whose
/// behavior is controlled by `--simulate`, `--fail-first` and
/// `--fail-bring-up`.
#[derive(Debug, Parser)]
#[command(name = "dht", version = dht_core::VERSION, about)]
pub struct Cli {
    /// JSON options file (`{"sensorType": 22, "gpioPin": 4, ...}`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Retries after the first failed transaction
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Delay between failed transactions, in milliseconds
    #[arg(long, global = true, default_value_t = 450)]
    pub backoff_ms: u64,

    /// Concurrent background reads
    #[arg(long, global = true, default_value_t = 4)]
    pub workers: usize,

    /// Value returned by the simulated sensor, as `TEMPERATURE,HUMIDITY`
    #[arg(long, global = true)]
    pub simulate: Option<SimulatedReading>,

    /// Number of transactions the simulated sensor fails before answering
    #[arg(long, global = true, default_value_t = 0)]
    pub fail_first: usize,

    /// Number of bring-up attempts the simulated sensor fails
    #[arg(long, global = true, default_value_t = 0)]
    pub fail_bring_up: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Blocking read; uses the configured sensor when no arguments are given
    Read {
        /// Sensor model (11 or 22)
        #[arg(requires = "pin")]
        sensor_type: Option<u8>,

        /// GPIO pin
        pin: Option<u8>,
    },

    /// Repeated background reads reported through a completion callback
    Poll {
        #[arg(long, default_value_t = 22)]
        sensor_type: u8,

        #[arg(long, default_value_t = 4)]
        pin: u8,

        /// Number of reads
        #[arg(long, default_value_t = 5)]
        count: u32,

        /// Pause between reads, in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },
}

/// `TEMPERATURE,HUMIDITY` pair given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedReading(pub Measurement);

impl FromStr for SimulatedReading {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let Some((temperature, humidity)) = s.split_once(',') else {
            bail!("expected TEMPERATURE,HUMIDITY, got {s:?}");
        };
        let temperature = temperature
            .trim()
            .parse()
            .with_context(|| format!("invalid temperature {temperature:?}"))?;
        let humidity = humidity
            .trim()
            .parse()
            .with_context(|| format!("invalid humidity {humidity:?}"))?;
        Ok(Self(Measurement::new(temperature, humidity)))
    }
}
