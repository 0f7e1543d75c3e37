use std::fmt;

use crate::registry::BusId;

/// Errors raised while validating bus configuration.
///
/// These are fatal: an unsupported bus number is a wiring mistake, not a
/// transient fault, so nothing below this layer is ever attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested bus number is outside the supported set.
    UnsupportedBus(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedBus(n) => {
                write!(f, "unsupported i2c bus {}, valid buses are 0..=2", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A single failed attempt at moving bytes over the wire.
///
/// The retry layer treats every variant uniformly as retryable; the
/// distinction only matters for diagnostics.
#[derive(Debug)]
pub enum TransportError {
    /// The device did not acknowledge the transfer.
    Nack,
    /// Electrical or protocol fault on the wire.
    BusFault,
    /// The transfer did not complete in time.
    Timeout,
    /// Operating-system failure talking to the bus device node.
    Io(std::io::Error),
    /// Driver-specific failure that fits none of the above.
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Nack => write!(f, "device did not acknowledge"),
            TransportError::BusFault => write!(f, "bus fault"),
            TransportError::Timeout => write!(f, "transfer timed out"),
            TransportError::Io(err) => write!(f, "i/o error: {}", err),
            TransportError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Returned by a bus operation once its whole retry budget is spent.
///
/// Carries the last underlying [`TransportError`] as its cause. Callers
/// must not assume any particular number of attempts occurred, only that
/// the budget was exhausted.
#[derive(Debug)]
pub struct RetryExhausted {
    /// Bus the transaction ran against.
    pub bus: BusId,
    /// Name of the operation that failed, e.g. `"read_word"`.
    pub operation: &'static str,
    /// Total attempts made before giving up.
    pub attempts: u32,
    /// The failure from the final attempt.
    pub source: TransportError,
}

impl fmt::Display for RetryExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "i2c {} on bus {} failed after {} attempts: {}",
            self.operation, self.bus, self.attempts, self.source
        )
    }
}

impl std::error::Error for RetryExhausted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
