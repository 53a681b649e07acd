//! Transient user-facing notifications with automatic expiry.
//!
//! Notifications queue in arrival order. Each one schedules its own expiry as
//! a delayed action, so the queue drains itself without a background task.
//! The queue is bounded; a push beyond the cap evicts the oldest entry.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_core::effect::Effect;
use storefront_core::environment::IdGenerator;
use storefront_core::reducer::Reducer;
use storefront_core::{SmallVec, smallvec};

/// Most notifications a queue holds before evicting the oldest
pub const MAX_QUEUE: usize = 32;

/// How long a notification stays up when no duration is given
pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

/// Visual weight of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Something completed
    Success,
    /// Something failed
    Error,
    /// Neutral information
    Info,
    /// Something needs attention
    Warning,
}

/// A queued notification
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Unique identifier used for expiry and dismissal
    pub id: String,
    /// Text shown to the shopper
    pub message: String,
    /// Visual weight
    pub severity: Severity,
    /// How long it stays up before expiring
    pub duration: Duration,
}

/// The current queue, oldest first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationState {
    queue: Vec<Notification>,
}

impl NotificationState {
    /// An empty queue
    #[must_use]
    pub const fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// The queued notifications, oldest first
    #[must_use]
    pub fn queue(&self) -> &[Notification] {
        &self.queue
    }

    fn remove(&mut self, id: &str) {
        self.queue.retain(|notification| notification.id != id);
    }
}

/// Everything the notification queue can do
#[derive(Clone, Debug, PartialEq)]
pub enum NotificationAction {
    /// Enqueue a notification and schedule its expiry
    Push {
        /// Text shown to the shopper
        message: String,
        /// Visual weight
        severity: Severity,
        /// Time on screen; `None` means [`DEFAULT_DURATION`]
        duration: Option<Duration>,
    },
    /// A notification's timer fired
    Expire {
        /// Which notification expired
        id: String,
    },
    /// The shopper closed a notification early
    Dismiss {
        /// Which notification to close
        id: String,
    },
    /// Empty the queue; pending expiry timers become no-ops
    ClearAll,
}

impl NotificationAction {
    /// A success push with the default duration
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::push(message, Severity::Success)
    }

    /// An error push with the default duration
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::push(message, Severity::Error)
    }

    /// An info push with the default duration
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::push(message, Severity::Info)
    }

    /// A warning push with the default duration
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::push(message, Severity::Warning)
    }

    fn push(message: impl Into<String>, severity: Severity) -> Self {
        Self::Push {
            message: message.into(),
            severity,
            duration: None,
        }
    }
}

/// Dependencies for the notification queue
#[derive(Clone)]
pub struct NotificationEnv {
    /// Source of notification ids
    pub ids: Arc<dyn IdGenerator>,
}

/// Maintains the bounded queue and schedules expiries.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotificationReducer;

impl Reducer for NotificationReducer {
    type State = NotificationState;
    type Action = NotificationAction;
    type Environment = NotificationEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            NotificationAction::Push {
                message,
                severity,
                duration,
            } => {
                let id = env.ids.next_id();
                let duration = duration.unwrap_or(DEFAULT_DURATION);
                if state.queue.len() >= MAX_QUEUE {
                    state.queue.remove(0);
                }
                state.queue.push(Notification {
                    id: id.clone(),
                    message,
                    severity,
                    duration,
                });
                smallvec![Effect::delay(duration, NotificationAction::Expire { id })]
            },
            NotificationAction::Expire { id } | NotificationAction::Dismiss { id } => {
                state.remove(&id);
                smallvec![]
            },
            NotificationAction::ClearAll => {
                state.queue.clear();
                smallvec![]
            },
        }
    }
}
