//! Calibrated temperature sensor models.
//!
//! Pure conversions from one analog reading to a physical temperature.
//! Each model consumes an [`AnalogInput`] delivering volts and performs no
//! retry or recovery of its own; a failed read propagates unchanged.

use hw_io::AnalogInput;

/// Offset between the Kelvin and Celsius scales.
pub const ABSOLUTE_ZERO_OFFSET_C: f64 = 273.15;

/// A temperature sensor readable in Kelvin, Celsius or Fahrenheit.
///
/// Implementors define whichever scale they measure natively; the default
/// methods derive the others so all three stay exactly consistent.
pub trait TemperatureSensor {
    type Error;

    /// Temperature in Kelvin.
    fn read_temperature_k(&mut self) -> Result<f64, Self::Error>;

    /// Temperature in degrees Celsius.
    fn read_temperature_c(&mut self) -> Result<f64, Self::Error> {
        Ok(self.read_temperature_k()? - ABSOLUTE_ZERO_OFFSET_C)
    }

    /// Temperature in degrees Fahrenheit.
    fn read_temperature_f(&mut self) -> Result<f64, Self::Error> {
        Ok(self.read_temperature_c()? * (9.0 / 5.0) + 32.0)
    }
}

/// Thermistor read through a resistor divider.
///
/// The thermistor is the pullup of the divider with a known pulldown
/// `r2_ohms` below it; the input measures the divider midpoint. Resistance
/// converts to Kelvin through the Steinhart–Hart relation
/// `1/T = a + b·ln R + c·(ln R)³`.
pub struct Thermistor<I> {
    a: f64,
    b: f64,
    c: f64,
    r2_ohms: f64,
    vin_v: f64,
    input: I,
}

impl<I> Thermistor<I> {
    /// Thermistor with explicit Steinhart–Hart coefficients.
    pub fn new(a: f64, b: f64, c: f64, r2_ohms: f64, vin_v: f64, input: I) -> Self {
        Self { a, b, c, r2_ohms, vin_v, input }
    }

    /// Thermistor from a datasheet beta value and its nominal resistance
    /// `r0_ohms` at `t0_c`, the usual two-parameter calibration.
    pub fn from_beta(
        beta: f64,
        r0_ohms: f64,
        t0_c: f64,
        r2_ohms: f64,
        vin_v: f64,
        input: I,
    ) -> Self {
        let t0_k = t0_c + ABSOLUTE_ZERO_OFFSET_C;
        let a = 1.0 / t0_k - r0_ohms.ln() / beta;
        Self::new(a, 1.0 / beta, 0.0, r2_ohms, vin_v, input)
    }

    /// Thermistor resistance implied by the divider voltage.
    fn resistance_ohms(&self, voltage_v: f64) -> f64 {
        self.r2_ohms * (self.vin_v / voltage_v - 1.0)
    }
}

impl<I: AnalogInput> TemperatureSensor for Thermistor<I> {
    type Error = I::Error;

    fn read_temperature_k(&mut self) -> Result<f64, I::Error> {
        let voltage_v = self.input.read()?;
        let ln_r = self.resistance_ohms(voltage_v).ln();
        Ok(1.0 / (self.a + self.b * ln_r + self.c * ln_r.powi(3)))
    }
}

/// Linear analog-output temperature sensor.
///
/// Calibrated from two datasheet points `(v1_v, t1_c)` and `(v2_v, t2_c)`;
/// Celsius because datasheets prefer it over Kelvin.
pub struct LinearAnalogSensor<I> {
    gain: f64,
    offset: f64,
    input: I,
}

impl<I> LinearAnalogSensor<I> {
    pub fn new(v1_v: f64, t1_c: f64, v2_v: f64, t2_c: f64, input: I) -> Self {
        let gain = (t1_c - t2_c) / (v1_v - v2_v);
        let offset = gain * (0.0 - v1_v) + t1_c;
        Self { gain, offset, input }
    }

    /// The AD8495 K-type thermocouple amplifier at its datasheet points.
    pub fn ad8495(input: I) -> Self {
        Self::new(1.25, 0.0, 1.5, 50.0, input)
    }
}

impl<I: AnalogInput> TemperatureSensor for LinearAnalogSensor<I> {
    type Error = I::Error;

    fn read_temperature_c(&mut self) -> Result<f64, I::Error> {
        let voltage_v = self.input.read()?;
        Ok(self.gain * voltage_v + self.offset)
    }

    fn read_temperature_k(&mut self) -> Result<f64, I::Error> {
        Ok(self.read_temperature_c()? + ABSOLUTE_ZERO_OFFSET_C)
    }
}
