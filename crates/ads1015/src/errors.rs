use std::fmt;

use bus_registry::RetryExhausted;

#[derive(Debug)]
pub enum Error {
    /// The bus transaction behind a register access ultimately failed.
    Bus(RetryExhausted),
    /// Channel index outside the chip's four inputs.
    InvalidChannel(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(err) => write!(f, "bus error: {}", err),
            Error::InvalidChannel(n) => {
                write!(f, "invalid channel index {}, valid channels are 0..=3", n)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Bus(err) => Some(err),
            Error::InvalidChannel(_) => None,
        }
    }
}

impl From<RetryExhausted> for Error {
    fn from(err: RetryExhausted) -> Self {
        Error::Bus(err)
    }
}
