//! Mock implementations of environment traits.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use storefront_core::environment::{Clock, IdGenerator};
use storefront_core::slot::{Slot, SlotError};

/// Fixed clock for deterministic tests
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use storefront_testing::mocks::FixedClock;
/// use storefront_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
///
/// # Panics
///
/// Panics if the hardcoded timestamp fails to parse, which should never
/// happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// Predictable id generator producing `id-1`, `id-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    /// Create a generator starting at `id-1`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("id-{n}")
    }
}

/// In-memory slot for tests.
///
/// Can be pre-seeded with arbitrary text (including garbage, to exercise
/// corrupt-slot handling) and can be switched to fail writes.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
    fail_writes: Mutex<bool>,
}

impl MemorySlot {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-seeded with the given contents
    #[must_use]
    pub fn seeded(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            fail_writes: Mutex::new(false),
        }
    }

    /// Make subsequent saves fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut guard) = self.fail_writes.lock() {
            *guard = fail;
        }
    }

    /// Inspect the slot's current raw contents
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Slot for MemorySlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        Ok(self.contents.lock().ok().and_then(|guard| guard.clone()))
    }

    fn save(&self, contents: &str) -> Result<(), SlotError> {
        if self.fail_writes.lock().is_ok_and(|guard| *guard) {
            return Err(SlotError::Unavailable("write failure injected".to_string()));
        }
        if let Ok(mut guard) = self.contents.lock() {
            *guard = Some(contents.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SlotError> {
        if let Ok(mut guard) = self.contents.lock() {
            *guard = None;
        }
        Ok(())
    }
}
