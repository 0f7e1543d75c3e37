//! Driver for the TI ADS1015 12-bit I2C ADC.
//!
//! Single-shot, single-ended conversions through a shared
//! [`I2cBus`](bus_registry::I2cBus) handle; the retry and locking
//! discipline of the bus layer applies to every register access made
//! here. [`VoltageInput`] adapts one channel to the
//! [`AnalogInput`](hw_io::AnalogInput) capability so sensor models can
//! consume readings in volts.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bus_registry::I2cBus;
use hw_io::AnalogInput;

pub use crate::errors::Error;
pub use crate::registers::{Channel, Config, DataRate, Gain, REG_CONFIG, REG_CONVERSION};

mod errors;
mod registers;

/// The conversion register holds a 12-bit result left-aligned in 16 bits.
const CONVERSION_SHIFT: u16 = 4;
const FULL_SCALE_COUNTS: f64 = 2048.0;

pub struct Ads1015 {
    bus: Arc<I2cBus>,
    address: u8,
    data_rate: DataRate,
}

impl Ads1015 {
    /// Default address with ADDR strapped to ground.
    pub const DEFAULT_ADDRESS: u8 = 0x48;

    pub fn new(bus: Arc<I2cBus>, address: u8) -> Self {
        Self { bus, address, data_rate: DataRate::default() }
    }

    pub fn with_data_rate(mut self, data_rate: DataRate) -> Self {
        self.data_rate = data_rate;
        self
    }

    /// Run one single-ended conversion and return the raw 12-bit count.
    pub fn read_single_ended(&self, channel: Channel, gain: Gain) -> Result<u16, Error> {
        let config = (Config::OS_SINGLE | Config::MODE_SINGLE | Config::COMP_QUE_DISABLE).bits()
            | channel.mux_bits()
            | gain.bits()
            | self.data_rate.bits();

        // SMBus words travel low byte first; the chip's registers are
        // big-endian, so both directions get swapped.
        self.bus.write_word(self.address, REG_CONFIG, config.swap_bytes())?;
        thread::sleep(self.conversion_delay());
        let raw = self.bus.read_word(self.address, REG_CONVERSION)?.swap_bytes();

        Ok(raw >> CONVERSION_SHIFT)
    }

    /// Run one single-ended conversion and scale the result to volts.
    pub fn read_voltage(&self, channel: Channel, gain: Gain) -> Result<f64, Error> {
        let counts = self.read_single_ended(channel, gain)?;
        Ok(f64::from(counts) * gain.full_scale_v() / FULL_SCALE_COUNTS)
    }

    fn conversion_delay(&self) -> Duration {
        // One conversion period plus a small guard band.
        Duration::from_micros(1_000_000 / self.data_rate.samples_per_second() + 100)
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self, Error> {
        match n {
            0 => Ok(Channel::A0),
            1 => Ok(Channel::A1),
            2 => Ok(Channel::A2),
            3 => Ok(Channel::A3),
            other => Err(Error::InvalidChannel(other)),
        }
    }
}

/// One ADC channel exposed as an analog input reading volts.
pub struct VoltageInput {
    adc: Arc<Ads1015>,
    channel: Channel,
    gain: Gain,
}

impl VoltageInput {
    pub fn new(adc: Arc<Ads1015>, channel: Channel, gain: Gain) -> Self {
        Self { adc, channel, gain }
    }
}

impl AnalogInput for VoltageInput {
    type Error = Error;

    fn read(&mut self) -> Result<f64, Error> {
        self.adc.read_voltage(self.channel, self.gain)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bus_registry::{BusId, I2cTransport, TransportError};

    use super::*;

    /// Transport that records config writes and serves a fixed conversion
    /// result, stored as the chip would hold it (big-endian semantics).
    struct ScriptedTransport {
        written: Arc<Mutex<Vec<(u8, u8, u16)>>>,
        conversion: u16,
    }

    impl I2cTransport for ScriptedTransport {
        fn write_byte(&mut self, _addr: u8, _reg: u8, _value: u8) -> Result<(), TransportError> {
            Ok(())
        }

        fn write_word(&mut self, addr: u8, reg: u8, value: u16) -> Result<(), TransportError> {
            self.written.lock().unwrap().push((addr, reg, value));
            Ok(())
        }

        fn write_block(
            &mut self,
            _addr: u8,
            _reg: u8,
            _values: &[u8],
        ) -> Result<(), TransportError> {
            Ok(())
        }

        fn read_byte(&mut self, _addr: u8, _reg: u8) -> Result<u8, TransportError> {
            Ok(0)
        }

        fn read_word(&mut self, _addr: u8, reg: u8) -> Result<u16, TransportError> {
            assert_eq!(reg, REG_CONVERSION);
            // Low byte first, as smbus delivers it.
            Ok(self.conversion.swap_bytes())
        }

        fn read_block(
            &mut self,
            _addr: u8,
            _reg: u8,
            len: usize,
        ) -> Result<Vec<u8>, TransportError> {
            Ok(vec![0; len])
        }
    }

    fn adc_with(conversion: u16) -> (Ads1015, Arc<Mutex<Vec<(u8, u8, u16)>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let transport = ScriptedTransport { written: written.clone(), conversion };
        let bus = Arc::new(I2cBus::new(BusId::Bus0, Box::new(transport)));
        let adc = Ads1015::new(bus, Ads1015::DEFAULT_ADDRESS).with_data_rate(DataRate::Sps3300);
        (adc, written)
    }

    #[test]
    fn config_word_selects_channel_gain_and_single_shot() {
        let (adc, written) = adc_with(0);
        adc.read_single_ended(Channel::A1, Gain::Two).unwrap();

        let writes = written.lock().unwrap();
        let (addr, reg, wire) = writes[0];
        assert_eq!(addr, 0x48);
        assert_eq!(reg, REG_CONFIG);

        let config = wire.swap_bytes();
        assert_eq!(config & 0x8000, 0x8000, "single conversion started");
        assert_eq!(config & 0x7000, 0x5000, "mux set to single-ended AIN1");
        assert_eq!(config & 0x0E00, 0x0400, "pga set for ±2.048 V");
        assert_eq!(config & 0x0100, 0x0100, "single-shot mode");
        assert_eq!(config & 0x00E0, 0x00C0, "data rate 3300 sps");
        assert_eq!(config & 0x0003, 0x0003, "comparator disabled");
    }

    #[test]
    fn conversion_counts_are_scaled_to_volts() {
        // 1024 counts at ±4.096 V full scale is exactly 2.048 V.
        let (adc, _) = adc_with(1024 << CONVERSION_SHIFT);
        let volts = adc.read_voltage(Channel::A0, Gain::One).unwrap();
        assert!((volts - 2.048).abs() < 1e-9);
    }

    #[test]
    fn full_scale_reading() {
        let (adc, _) = adc_with(2047 << CONVERSION_SHIFT);
        let counts = adc.read_single_ended(Channel::A3, Gain::One).unwrap();
        assert_eq!(counts, 2047);
    }

    #[test]
    fn channel_indexes_above_three_are_rejected() {
        assert!(matches!(Channel::try_from(4), Err(Error::InvalidChannel(4))));
        assert_eq!(Channel::try_from(2).unwrap(), Channel::A2);
    }

    #[test]
    fn voltage_input_reads_volts_through_the_capability_trait() {
        let (adc, _) = adc_with(1024 << CONVERSION_SHIFT);
        let mut input = VoltageInput::new(Arc::new(adc), Channel::A0, Gain::One);
        let volts = input.read().unwrap();
        assert!((volts - 2.048).abs() < 1e-9);
    }
}
