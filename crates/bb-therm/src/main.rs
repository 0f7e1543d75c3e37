use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ads1015::{Ads1015, Channel, VoltageInput};
use bus_registry::{BusId, BusRegistry};
use clap::Parser;
use hw_io::{AnalogInput, SimulatedAnalogInput};
use temp_sensors::{LinearAnalogSensor, TemperatureSensor, Thermistor};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, SensorConfig, ThermistorCalibration};

mod config;

#[derive(Parser)]
#[command(name = "bb-therm", about = "Temperature monitor for the board's I2C sensor chain")]
struct Args {
    /// Path to the sensor configuration file
    config: PathBuf,

    /// Override the sampling period from the configuration file
    #[arg(long, value_name = "MILLIS")]
    period_ms: Option<u64>,

    /// Read a fixed simulated voltage instead of touching the hardware
    #[arg(long, value_name = "VOLTS")]
    simulate: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let period = Duration::from_millis(args.period_ms.unwrap_or(config.period_ms));

    match args.simulate {
        Some(volts) => monitor(SimulatedAnalogInput::new(volts), &config.sensor, period),
        None => {
            let bus_id = BusId::try_from(config.bus)?;
            let bus = BusRegistry::global().bus(bus_id)?;
            let adc = Arc::new(Ads1015::new(bus, config.adc.address));
            let channel = Channel::try_from(config.adc.channel)?;
            monitor(
                VoltageInput::new(adc, channel, config.adc.gain),
                &config.sensor,
                period,
            )
        }
    }
}

/// Build the configured sensor model over `input` and sample it forever.
fn monitor<I>(
    input: I,
    sensor: &SensorConfig,
    period: Duration,
) -> Result<(), Box<dyn std::error::Error>>
where
    I: AnalogInput,
    I::Error: 'static,
{
    match sensor {
        SensorConfig::Thermistor { calibration, r2_ohms, vin_v } => match *calibration {
            ThermistorCalibration::SteinhartHart { a, b, c } => {
                sample(Thermistor::new(a, b, c, *r2_ohms, *vin_v, input), period)
            }
            ThermistorCalibration::Beta { beta, r0_ohms, t0_c } => sample(
                Thermistor::from_beta(beta, r0_ohms, t0_c, *r2_ohms, *vin_v, input),
                period,
            ),
        },
        SensorConfig::Ad8495 => sample(LinearAnalogSensor::ad8495(input), period),
    }
}

fn sample<S>(mut sensor: S, period: Duration) -> Result<(), Box<dyn std::error::Error>>
where
    S: TemperatureSensor,
    S::Error: std::error::Error + 'static,
{
    loop {
        let celsius = sensor.read_temperature_c()?;
        info!("{celsius:.2} °C");
        thread::sleep(period);
    }
}
