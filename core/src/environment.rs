//! Dependency injection traits.
//!
//! All external dependencies are abstracted behind traits and injected
//! via the reducer's Environment parameter. Production implementations
//! live here; deterministic test doubles live in `storefront-testing`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use storefront_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(clock.now() >= now);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Id generation for orders, notifications, and fabricated users.
///
/// Abstracted so tests can use predictable sequential ids.
pub trait IdGenerator: Send + Sync {
    /// Generate a new unique id
    fn next_id(&self) -> String;
}

/// Production id generator backed by random UUIDs
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
