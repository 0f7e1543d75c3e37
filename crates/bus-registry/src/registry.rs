use std::fmt;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};

use crate::error::{ConfigError, TransportError};
use crate::handle::I2cBus;
use crate::transport::{self, I2cTransport};

/// Identifier of one physical I2C bus.
///
/// The board routes exactly three buses; anything else is a configuration
/// mistake and is rejected at conversion time, before any hardware is
/// touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusId {
    Bus0,
    Bus1,
    Bus2,
}

impl BusId {
    pub const ALL: [BusId; 3] = [BusId::Bus0, BusId::Bus1, BusId::Bus2];

    /// The bus number as wired, matching the `/dev/i2c-N` suffix.
    pub fn number(self) -> u8 {
        self as u8
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for BusId {
    type Error = ConfigError;

    fn try_from(n: u8) -> Result<Self, ConfigError> {
        match n {
            0 => Ok(BusId::Bus0),
            1 => Ok(BusId::Bus1),
            2 => Ok(BusId::Bus2),
            other => Err(ConfigError::UnsupportedBus(other)),
        }
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

type Opener = dyn Fn(BusId) -> Result<Box<dyn I2cTransport>, TransportError> + Send + Sync;

/// Single source of truth mapping a [`BusId`] to its [`I2cBus`] handle.
///
/// Each bus slot is a one-time cell: the transport is constructed on the
/// first successful lookup and every later lookup, from any thread, gets
/// the identical handle, so all callers share one lock per bus. A failed
/// construction leaves the slot empty and the next lookup tries again.
pub struct BusRegistry {
    slots: [OnceCell<Arc<I2cBus>>; BusId::ALL.len()],
    open: Box<Opener>,
}

impl BusRegistry {
    /// Registry backed by the default transport for this build: the Linux
    /// device node when the `linux-i2c` feature is enabled (falling back
    /// to the stub if it cannot be opened), the stub otherwise.
    pub fn new() -> Self {
        Self::with_opener(transport::default_opener)
    }

    /// Registry with an injected transport constructor, for tests and
    /// nonstandard deployments.
    pub fn with_opener(
        open: impl Fn(BusId) -> Result<Box<dyn I2cTransport>, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            slots: [OnceCell::new(), OnceCell::new(), OnceCell::new()],
            open: Box::new(open),
        }
    }

    /// Get the handle for `id`, constructing its transport on first use.
    ///
    /// Concurrent first lookups race safely: exactly one transport is
    /// constructed and the losers receive the winner's handle.
    pub fn bus(&self, id: BusId) -> Result<Arc<I2cBus>, TransportError> {
        self.slots[id.index()]
            .get_or_try_init(|| Ok(Arc::new(I2cBus::new(id, (self.open)(id)?))))
            .cloned()
    }

    /// The process-wide registry, created lazily and never torn down.
    pub fn global() -> &'static BusRegistry {
        static GLOBAL: Lazy<BusRegistry> = Lazy::new(BusRegistry::new);
        &GLOBAL
    }
}

impl Default for BusRegistry {
    fn default() -> Self {
        Self::new()
    }
}
