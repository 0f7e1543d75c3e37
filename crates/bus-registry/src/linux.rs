use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};

use crate::error::TransportError;
use crate::registry::BusId;
use crate::transport::I2cTransport;

// SMBus caps block transfers at 32 bytes.
const SMBUS_BLOCK_MAX: usize = 32;

/// Transport backed by the kernel's `/dev/i2c-N` device node.
///
/// One device handle per bus; the slave address is re-targeted before
/// every transfer since callers address a different device per call.
pub struct LinuxI2c {
    device: LinuxI2CDevice,
}

impl LinuxI2c {
    pub fn open(bus: BusId) -> Result<Self, TransportError> {
        let path = format!("/dev/i2c-{}", bus.number());
        let device = LinuxI2CDevice::new(&path, 0)?;
        Ok(Self { device })
    }

    fn target(&mut self, addr: u8) -> Result<(), TransportError> {
        self.device.set_slave_address(u16::from(addr))?;
        Ok(())
    }
}

impl I2cTransport for LinuxI2c {
    fn write_byte(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), TransportError> {
        self.target(addr)?;
        self.device.smbus_write_byte_data(reg, value)?;
        Ok(())
    }

    fn write_word(&mut self, addr: u8, reg: u8, value: u16) -> Result<(), TransportError> {
        self.target(addr)?;
        self.device.smbus_write_word_data(reg, value)?;
        Ok(())
    }

    fn write_block(&mut self, addr: u8, reg: u8, values: &[u8]) -> Result<(), TransportError> {
        if values.len() > SMBUS_BLOCK_MAX {
            return Err(TransportError::Other(format!(
                "block length {} exceeds the smbus limit of {}",
                values.len(),
                SMBUS_BLOCK_MAX
            )));
        }
        self.target(addr)?;
        self.device.smbus_write_i2c_block_data(reg, values)?;
        Ok(())
    }

    fn read_byte(&mut self, addr: u8, reg: u8) -> Result<u8, TransportError> {
        self.target(addr)?;
        Ok(self.device.smbus_read_byte_data(reg)?)
    }

    fn read_word(&mut self, addr: u8, reg: u8) -> Result<u16, TransportError> {
        self.target(addr)?;
        Ok(self.device.smbus_read_word_data(reg)?)
    }

    fn read_block(&mut self, addr: u8, reg: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        if len > SMBUS_BLOCK_MAX {
            return Err(TransportError::Other(format!(
                "block length {} exceeds the smbus limit of {}",
                len, SMBUS_BLOCK_MAX
            )));
        }
        self.target(addr)?;
        Ok(self.device.smbus_read_i2c_block_data(reg, len as u8)?)
    }
}

impl From<LinuxI2CError> for TransportError {
    fn from(err: LinuxI2CError) -> Self {
        TransportError::Io(std::io::Error::other(err))
    }
}
