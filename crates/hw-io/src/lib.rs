//! Capability interfaces for board I/O.
//!
//! Sensors and actuators consume these narrow read/write contracts without
//! knowing the concrete hardware behind them. Each capability comes in two
//! flavors chosen at construction time: a hardware-backed implementation
//! (e.g. an ADC channel) or a simulated one operating on an in-memory
//! value. None of these types retry or recover; a failure from the layer
//! below propagates to the caller unchanged.

use std::convert::Infallible;

/// A single analog input. Units are implementation-specific; hardware
/// implementations backed by an ADC read volts.
pub trait AnalogInput {
    type Error: std::error::Error;

    fn read(&mut self) -> Result<f64, Self::Error>;
}

/// A single digital input.
pub trait DigitalInput {
    type Error: std::error::Error;

    fn read(&mut self) -> Result<bool, Self::Error>;
}

/// A single analog output. Units are implementation-specific.
pub trait AnalogOutput {
    type Error: std::error::Error;

    fn write(&mut self, value: f64) -> Result<(), Self::Error>;
}

/// A single digital output.
pub trait DigitalOutput {
    type Error: std::error::Error;

    fn write(&mut self, value: bool) -> Result<(), Self::Error>;
}

/// Analog input that reads an in-memory value and never touches a bus.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAnalogInput {
    value: f64,
}

impl SimulatedAnalogInput {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    /// Change the value subsequent reads will return.
    pub fn set(&mut self, value: f64) {
        self.value = value;
    }
}

impl AnalogInput for SimulatedAnalogInput {
    type Error = Infallible;

    fn read(&mut self) -> Result<f64, Infallible> {
        Ok(self.value)
    }
}

/// Digital input that reads an in-memory value and never touches a bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDigitalInput {
    value: bool,
}

impl SimulatedDigitalInput {
    pub fn new(value: bool) -> Self {
        Self { value }
    }

    pub fn set(&mut self, value: bool) {
        self.value = value;
    }
}

impl DigitalInput for SimulatedDigitalInput {
    type Error = Infallible;

    fn read(&mut self) -> Result<bool, Infallible> {
        Ok(self.value)
    }
}

/// Analog output that stores writes in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAnalogOutput {
    last: f64,
}

impl SimulatedAnalogOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently written value.
    pub fn last_written(&self) -> f64 {
        self.last
    }
}

impl AnalogOutput for SimulatedAnalogOutput {
    type Error = Infallible;

    fn write(&mut self, value: f64) -> Result<(), Infallible> {
        self.last = value;
        Ok(())
    }
}

/// Digital output that stores writes in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDigitalOutput {
    last: bool,
}

impl SimulatedDigitalOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently written value.
    pub fn last_written(&self) -> bool {
        self.last
    }
}

impl DigitalOutput for SimulatedDigitalOutput {
    type Error = Infallible;

    fn write(&mut self, value: bool) -> Result<(), Infallible> {
        self.last = value;
        Ok(())
    }
}
