use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::{RetryExhausted, TransportError};
use crate::registry::BusId;
use crate::transport::I2cTransport;

/// Extra attempts granted to a transaction after its first failure.
///
/// A transaction runs at most `MAX_RETRIES + 1` times in total.
pub const MAX_RETRIES: u32 = 3;

/// Exclusive access to a transport for the duration of a single attempt.
///
/// The retry engine is written against this trait rather than a concrete
/// lock so the policy stays independent of how the lock is sourced.
pub trait TransportLock {
    /// Run `f` with the transport held exclusively for one attempt.
    fn with_transport<R>(
        &self,
        f: impl FnOnce(&mut dyn I2cTransport) -> Result<R, TransportError>,
    ) -> Result<R, TransportError>;
}

/// Handle to one physical I2C bus.
///
/// Owns the transport and the lock that serializes attempts on it. The
/// lock scopes exactly one attempt of one operation: it is taken right
/// before the transport call and released right after, then re-taken for
/// the next retry, so a long retry sequence from one thread does not hold
/// other threads off the bus between attempts.
///
/// Normally obtained through [`BusRegistry`](crate::BusRegistry), which
/// guarantees one handle per bus process-wide; direct construction is for
/// tests and custom transports.
pub struct I2cBus {
    id: BusId,
    transport: Mutex<Box<dyn I2cTransport>>,
}

impl I2cBus {
    pub fn new(id: BusId, transport: Box<dyn I2cTransport>) -> Self {
        Self { id, transport: Mutex::new(transport) }
    }

    pub fn id(&self) -> BusId {
        self.id
    }

    /// Write an 8-bit value, retrying per the bus policy.
    pub fn write_byte(&self, addr: u8, reg: u8, value: u8) -> Result<(), RetryExhausted> {
        transact(self, self.id, "write_byte", |t| {
            debug!(
                bus = %self.id,
                "writing {value:#04x} to register {reg:#04x} on device {addr:#04x}"
            );
            t.write_byte(addr, reg, value)
        })
    }

    /// Write a 16-bit value, retrying per the bus policy.
    pub fn write_word(&self, addr: u8, reg: u8, value: u16) -> Result<(), RetryExhausted> {
        transact(self, self.id, "write_word", |t| {
            debug!(
                bus = %self.id,
                "writing {value:#06x} to register {reg:#04x} on device {addr:#04x}"
            );
            t.write_word(addr, reg, value)
        })
    }

    /// Write a block of bytes, retrying per the bus policy.
    pub fn write_block(&self, addr: u8, reg: u8, values: &[u8]) -> Result<(), RetryExhausted> {
        transact(self, self.id, "write_block", |t| {
            debug!(
                bus = %self.id,
                "writing {values:02x?} to register {reg:#04x} on device {addr:#04x}"
            );
            t.write_block(addr, reg, values)
        })
    }

    /// Read an 8-bit value, retrying per the bus policy.
    pub fn read_byte(&self, addr: u8, reg: u8) -> Result<u8, RetryExhausted> {
        transact(self, self.id, "read_byte", |t| {
            let value = t.read_byte(addr, reg)?;
            debug!(
                bus = %self.id,
                "read {value:#04x} from register {reg:#04x} of device {addr:#04x}"
            );
            Ok(value)
        })
    }

    /// Read a 16-bit value, retrying per the bus policy.
    pub fn read_word(&self, addr: u8, reg: u8) -> Result<u16, RetryExhausted> {
        transact(self, self.id, "read_word", |t| {
            let value = t.read_word(addr, reg)?;
            debug!(
                bus = %self.id,
                "read {value:#06x} from register {reg:#04x} of device {addr:#04x}"
            );
            Ok(value)
        })
    }

    /// Read `len` bytes, retrying per the bus policy.
    pub fn read_block(&self, addr: u8, reg: u8, len: usize) -> Result<Vec<u8>, RetryExhausted> {
        transact(self, self.id, "read_block", |t| {
            let values = t.read_block(addr, reg, len)?;
            debug!(
                bus = %self.id,
                "read {values:02x?} from register {reg:#04x} of device {addr:#04x}"
            );
            Ok(values)
        })
    }
}

impl TransportLock for I2cBus {
    fn with_transport<R>(
        &self,
        f: impl FnOnce(&mut dyn I2cTransport) -> Result<R, TransportError>,
    ) -> Result<R, TransportError> {
        // The transport holds no in-memory invariants a panic could tear,
        // so a poisoned guard is safe to keep using.
        let mut guard = self.transport.lock().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_mut())
    }
}

/// Runs one transaction under the bounded-retry policy.
///
/// Each attempt acquires the lock, runs, and releases it; on failure the
/// attempt counter is bumped and the attempt repeats while the counter is
/// still `<= MAX_RETRIES`, so a failure on the fourth attempt exhausts the
/// budget. Every retry and the final exhaustion emit a warning; nothing is
/// swallowed silently.
fn transact<R>(
    lock: &impl TransportLock,
    bus: BusId,
    operation: &'static str,
    mut attempt: impl FnMut(&mut dyn I2cTransport) -> Result<R, TransportError>,
) -> Result<R, RetryExhausted> {
    let mut attempts = 0u32;
    loop {
        match lock.with_transport(&mut attempt) {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempts += 1;
                if attempts <= MAX_RETRIES {
                    warn!(
                        bus = %bus,
                        operation,
                        error = %err,
                        "i2c transaction failed, retrying"
                    );
                } else {
                    warn!(bus = %bus, operation, attempts, "giving up");
                    return Err(RetryExhausted { bus, operation, attempts, source: err });
                }
            }
        }
    }
}
