use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use bus_registry::{
    BusId, BusRegistry, ConfigError, I2cTransport, TransportError, MAX_RETRIES,
};

// ---------------------------------------------------------------------------
// Mock transport
// ---------------------------------------------------------------------------

/// Shared observation point for a mock transport: counts every raw call,
/// records entry/exit stamps, and fails the first `fail_first` calls.
struct MockState {
    calls: AtomicUsize,
    fail_first: usize,
    busy: Duration,
    spans: Mutex<Vec<(Instant, Instant)>>,
    read_byte_value: u8,
    read_word_value: u16,
}

impl MockState {
    fn new(fail_first: usize, busy: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_first,
            busy,
            spans: Mutex::new(Vec::new()),
            read_byte_value: 0xA5,
            read_word_value: 0xBEEF,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) -> Result<(), TransportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let entered = Instant::now();
        if !self.busy.is_zero() {
            thread::sleep(self.busy);
        }
        self.spans.lock().unwrap().push((entered, Instant::now()));
        if n < self.fail_first {
            Err(TransportError::Nack)
        } else {
            Ok(())
        }
    }

    /// True if any two recorded transport invocations ran concurrently.
    fn any_overlap(&self) -> bool {
        let spans = self.spans.lock().unwrap();
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                if a.0 < b.1 && b.0 < a.1 {
                    return true;
                }
            }
        }
        false
    }
}

struct MockTransport(Arc<MockState>);

impl I2cTransport for MockTransport {
    fn write_byte(&mut self, _addr: u8, _reg: u8, _value: u8) -> Result<(), TransportError> {
        self.0.touch()
    }

    fn write_word(&mut self, _addr: u8, _reg: u8, _value: u16) -> Result<(), TransportError> {
        self.0.touch()
    }

    fn write_block(&mut self, _addr: u8, _reg: u8, _values: &[u8]) -> Result<(), TransportError> {
        self.0.touch()
    }

    fn read_byte(&mut self, _addr: u8, _reg: u8) -> Result<u8, TransportError> {
        self.0.touch()?;
        Ok(self.0.read_byte_value)
    }

    fn read_word(&mut self, _addr: u8, _reg: u8) -> Result<u16, TransportError> {
        self.0.touch()?;
        Ok(self.0.read_word_value)
    }

    fn read_block(&mut self, _addr: u8, _reg: u8, len: usize) -> Result<Vec<u8>, TransportError> {
        self.0.touch()?;
        Ok(vec![self.0.read_byte_value; len])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Registry whose every bus shares `state`, plus a counter of opener calls.
fn registry_with(state: Arc<MockState>) -> (BusRegistry, Arc<AtomicUsize>) {
    let opens = Arc::new(AtomicUsize::new(0));
    let opens_in = opens.clone();
    let registry = BusRegistry::with_opener(move |_| {
        opens_in.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockTransport(state.clone())))
    });
    (registry, opens)
}

// ---------------------------------------------------------------------------
// Configuration validation
// ---------------------------------------------------------------------------

#[test]
fn bus_numbers_outside_the_supported_set_are_rejected() {
    for n in 3..=u8::MAX {
        assert_eq!(BusId::try_from(n), Err(ConfigError::UnsupportedBus(n)));
    }
    for n in 0..=2u8 {
        assert_eq!(BusId::try_from(n).unwrap().number(), n);
    }
}

#[test]
fn rejected_bus_numbers_construct_no_transport() {
    let state = MockState::new(0, Duration::ZERO);
    let (_registry, opens) = registry_with(state);

    assert!(BusId::try_from(7).is_err());
    assert_eq!(opens.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Singleton handles
// ---------------------------------------------------------------------------

#[test]
fn repeated_lookups_return_the_identical_handle() {
    let state = MockState::new(0, Duration::ZERO);
    let (registry, opens) = registry_with(state);

    let h1 = registry.bus(BusId::Bus1).unwrap();
    let h2 = registry.bus(BusId::Bus1).unwrap();

    assert!(Arc::ptr_eq(&h1, &h2));
    assert_eq!(opens.load(Ordering::SeqCst), 1);
}

#[test]
fn distinct_buses_get_distinct_handles() {
    let state = MockState::new(0, Duration::ZERO);
    let (registry, opens) = registry_with(state);

    let h0 = registry.bus(BusId::Bus0).unwrap();
    let h2 = registry.bus(BusId::Bus2).unwrap();

    assert!(!Arc::ptr_eq(&h0, &h2));
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_first_lookups_construct_exactly_one_transport() {
    let state = MockState::new(0, Duration::ZERO);
    let opens = Arc::new(AtomicUsize::new(0));
    let opens_in = opens.clone();
    let registry = Arc::new(BusRegistry::with_opener(move |_| {
        opens_in.fetch_add(1, Ordering::SeqCst);
        // Widen the race window.
        thread::sleep(Duration::from_millis(20));
        Ok(Box::new(MockTransport(state.clone())))
    }));

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.bus(BusId::Bus0).unwrap()
            })
        })
        .collect();

    let buses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(opens.load(Ordering::SeqCst), 1);
    for bus in &buses[1..] {
        assert!(Arc::ptr_eq(&buses[0], bus));
    }
}

#[test]
fn failed_open_leaves_the_slot_empty_for_a_later_retry() {
    let state = MockState::new(0, Duration::ZERO);
    let opens = Arc::new(AtomicUsize::new(0));
    let opens_in = opens.clone();
    let registry = BusRegistry::with_opener(move |_| {
        if opens_in.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(TransportError::Timeout)
        } else {
            Ok(Box::new(MockTransport(state.clone())))
        }
    });

    assert!(registry.bus(BusId::Bus0).is_err());
    let handle = registry.bus(BusId::Bus0).unwrap();
    assert!(Arc::ptr_eq(&handle, &registry.bus(BusId::Bus0).unwrap()));
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

#[test]
fn first_attempt_success_makes_one_transport_call() {
    let state = MockState::new(0, Duration::ZERO);
    let (registry, _) = registry_with(state.clone());
    let bus = registry.bus(BusId::Bus0).unwrap();

    assert_eq!(bus.read_byte(0x48, 0x01).unwrap(), 0xA5);
    assert_eq!(state.calls(), 1);
}

#[test]
fn transient_failures_within_the_budget_are_recovered() {
    // Fails attempts 1..=3, succeeds on the 4th and last.
    let state = MockState::new(MAX_RETRIES as usize, Duration::ZERO);
    let (registry, _) = registry_with(state.clone());
    let bus = registry.bus(BusId::Bus0).unwrap();

    assert_eq!(bus.read_word(0x48, 0x00).unwrap(), 0xBEEF);
    assert_eq!(state.calls(), 4);
}

#[test]
fn four_failed_attempts_exhaust_the_budget() {
    let state = MockState::new(4, Duration::ZERO);
    let (registry, _) = registry_with(state.clone());
    let bus = registry.bus(BusId::Bus2).unwrap();

    let err = bus.write_byte(0x48, 0x01, 0x7F).unwrap_err();
    assert_eq!(err.attempts, 4);
    assert_eq!(err.operation, "write_byte");
    assert_eq!(err.bus, BusId::Bus2);
    assert!(matches!(err.source, TransportError::Nack));
    assert_eq!(state.calls(), 4);
}

#[test]
fn a_permanently_broken_transport_is_not_hammered_past_the_budget() {
    let state = MockState::new(usize::MAX, Duration::ZERO);
    let (registry, _) = registry_with(state.clone());
    let bus = registry.bus(BusId::Bus0).unwrap();

    assert!(bus.read_block(0x48, 0x00, 4).is_err());
    assert_eq!(state.calls(), 4);
}

// ---------------------------------------------------------------------------
// Mutual exclusion
// ---------------------------------------------------------------------------

#[test]
fn same_bus_transactions_never_overlap_on_the_transport() {
    let state = MockState::new(0, Duration::from_millis(30));
    let (registry, _) = registry_with(state.clone());
    let registry = Arc::new(registry);

    let barrier = Arc::new(Barrier::new(4));
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                // Each thread looks the handle up independently; exclusion
                // only holds if the lookups share one lock.
                let bus = registry.bus(BusId::Bus1).unwrap();
                barrier.wait();
                bus.read_byte(0x48, 0x00).unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(state.calls(), 4);
    assert!(!state.any_overlap());
}

#[test]
fn distinct_buses_may_proceed_concurrently() {
    let state = MockState::new(0, Duration::from_millis(150));
    let (registry, _) = registry_with(state.clone());
    let registry = Arc::new(registry);

    let barrier = Arc::new(Barrier::new(2));
    let workers: Vec<_> = [BusId::Bus0, BusId::Bus1]
        .into_iter()
        .map(|id| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let bus = registry.bus(id).unwrap();
                barrier.wait();
                bus.read_byte(0x48, 0x00).unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert!(state.any_overlap());
}

// ---------------------------------------------------------------------------
// Data path
// ---------------------------------------------------------------------------

#[test]
fn reads_surface_the_transport_values() {
    let state = MockState::new(0, Duration::ZERO);
    let (registry, _) = registry_with(state);
    let bus = registry.bus(BusId::Bus0).unwrap();

    assert_eq!(bus.read_byte(0x50, 0x10).unwrap(), 0xA5);
    assert_eq!(bus.read_word(0x50, 0x10).unwrap(), 0xBEEF);
    assert_eq!(bus.read_block(0x50, 0x10, 3).unwrap(), vec![0xA5, 0xA5, 0xA5]);
    bus.write_word(0x50, 0x12, 0x0102).unwrap();
    bus.write_block(0x50, 0x14, &[1, 2, 3]).unwrap();
}
