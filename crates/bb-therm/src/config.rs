//! Sensor chain configuration, loaded from a JSON file.

use std::fs::File;
use std::io;
use std::path::Path;

use ads1015::{Ads1015, Gain};
use derive_more::{Display, From};
use serde::Deserialize;

#[derive(Debug, From, Display)]
pub enum Error {
    #[display("cannot read configuration: {_0}")]
    Io(io::Error),
    #[display("malformed configuration: {_0}")]
    Json(serde_json::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// I2C bus number the ADC hangs off.
    pub bus: u8,
    pub adc: AdcConfig,
    pub sensor: SensorConfig,
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, Error> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(io::BufReader::new(file))?)
    }
}

#[derive(Debug, Deserialize)]
pub struct AdcConfig {
    #[serde(default = "default_address")]
    pub address: u8,
    pub channel: u8,
    #[serde(default)]
    pub gain: Gain,
}

/// Which sensor model sits on the configured ADC channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SensorConfig {
    Thermistor {
        calibration: ThermistorCalibration,
        r2_ohms: f64,
        vin_v: f64,
    },
    /// AD8495 thermocouple amplifier at its datasheet calibration.
    Ad8495,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ThermistorCalibration {
    SteinhartHart { a: f64, b: f64, c: f64 },
    Beta { beta: f64, r0_ohms: f64, t0_c: f64 },
}

fn default_period_ms() -> u64 {
    500
}

fn default_address() -> u8 {
    Ads1015::DEFAULT_ADDRESS
}
