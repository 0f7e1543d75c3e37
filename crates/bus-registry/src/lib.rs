//! Shared access to the board's I2C buses.
//!
//! Each physical bus is owned by exactly one [`I2cBus`] handle, which keeps
//! the byte-level transport behind a mutex so transactions from different
//! threads never interleave on the wire. Handles are created lazily, once
//! per bus, by the [`BusRegistry`], so every call site that asks for a bus
//! contends on the same lock. Every transaction is retried a bounded number
//! of times before the failure is surfaced to the caller.

mod error;
mod handle;
#[cfg(feature = "linux-i2c")]
mod linux;
mod registry;
mod transport;

pub use error::{ConfigError, RetryExhausted, TransportError};
pub use handle::{I2cBus, TransportLock, MAX_RETRIES};
#[cfg(feature = "linux-i2c")]
pub use linux::LinuxI2c;
pub use registry::{BusId, BusRegistry};
pub use transport::{I2cTransport, StubTransport};
