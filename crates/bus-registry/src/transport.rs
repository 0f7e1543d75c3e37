use tracing::warn;

use crate::error::TransportError;
use crate::registry::BusId;

/// Byte-level access to one I2C bus.
///
/// Implementations perform exactly one raw transfer per call and report
/// every failure as a [`TransportError`]; retry and locking live a layer
/// up in [`I2cBus`](crate::I2cBus), so implementations must not recover
/// locally. Addresses are 7-bit; block transfers are capped at the SMBus
/// limit of 32 bytes.
pub trait I2cTransport: Send {
    /// Write an 8-bit value to `reg` on the device at `addr`.
    fn write_byte(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), TransportError>;

    /// Write a 16-bit value to `reg` on the device at `addr`.
    fn write_word(&mut self, addr: u8, reg: u8, value: u16) -> Result<(), TransportError>;

    /// Write a block of bytes starting at `reg` on the device at `addr`.
    fn write_block(&mut self, addr: u8, reg: u8, values: &[u8]) -> Result<(), TransportError>;

    /// Read an 8-bit value from `reg` on the device at `addr`.
    fn read_byte(&mut self, addr: u8, reg: u8) -> Result<u8, TransportError>;

    /// Read a 16-bit value from `reg` on the device at `addr`.
    fn read_word(&mut self, addr: u8, reg: u8) -> Result<u16, TransportError>;

    /// Read `len` bytes starting at `reg` on the device at `addr`.
    fn read_block(&mut self, addr: u8, reg: u8, len: usize) -> Result<Vec<u8>, TransportError>;
}

/// Transport stand-in for machines without the real bus device.
///
/// Reads return zeroes and writes are accepted silently, so the stack
/// above keeps functioning in a degraded mode. Announces itself with a
/// single warning at construction.
pub struct StubTransport;

impl StubTransport {
    pub fn new(bus: BusId) -> Self {
        warn!(bus = %bus, "no i2c device available, continuing with a stub");
        StubTransport
    }
}

impl I2cTransport for StubTransport {
    fn write_byte(&mut self, _addr: u8, _reg: u8, _value: u8) -> Result<(), TransportError> {
        Ok(())
    }

    fn write_word(&mut self, _addr: u8, _reg: u8, _value: u16) -> Result<(), TransportError> {
        Ok(())
    }

    fn write_block(&mut self, _addr: u8, _reg: u8, _values: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }

    fn read_byte(&mut self, _addr: u8, _reg: u8) -> Result<u8, TransportError> {
        Ok(0)
    }

    fn read_word(&mut self, _addr: u8, _reg: u8) -> Result<u16, TransportError> {
        Ok(0)
    }

    fn read_block(&mut self, _addr: u8, _reg: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        Ok(vec![0; len])
    }
}

/// Opens the best transport available for `bus`.
///
/// With the `linux-i2c` feature the kernel device node is tried first and
/// the stub is only a fallback; without it the stub is all there is.
pub(crate) fn default_opener(bus: BusId) -> Result<Box<dyn I2cTransport>, TransportError> {
    #[cfg(feature = "linux-i2c")]
    {
        match crate::linux::LinuxI2c::open(bus) {
            Ok(transport) => return Ok(Box::new(transport)),
            Err(err) => {
                warn!(bus = %bus, error = %err, "cannot open i2c device node");
            }
        }
    }

    Ok(Box::new(StubTransport::new(bus)))
}
