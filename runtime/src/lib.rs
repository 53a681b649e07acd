//! # Storefront Runtime
//!
//! Runtime implementation for the storefront state model.
//!
//! This crate provides the [`Store`] runtime that coordinates reducer
//! execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Cancellation Registry**: Tracks cancellable effects so a stale result
//!   cannot mutate state after its originating flow is gone
//!
//! ## Example
//!
//! ```ignore
//! use storefront_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::BoxFuture;
use storefront_core::effect::{Effect, EffectId};
use storefront_core::reducer::Reducer;
use tokio::sync::{RwLock, broadcast};
use tokio::task::AbortHandle;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Quiesce timed out waiting for effects to complete
        #[error("quiesce timed out with {0} effects still running")]
        IdleTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed, typically because the store is
        /// shutting down
        #[error("action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for a [`Store`]
///
/// # Example
///
/// ```
/// use storefront_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::new()
///     .with_broadcast_capacity(64)
///     .with_poll_interval(Duration::from_millis(10));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Action broadcast channel capacity
    broadcast_capacity: usize,

    /// Interval at which `shutdown`/`quiesce` poll the pending-effect counter
    poll_interval: Duration,
}

impl StoreConfig {
    /// Create a config with default settings
    ///
    /// Defaults:
    /// - `broadcast_capacity`: 16
    /// - `poll_interval`: 25ms
    #[must_use]
    pub const fn new() -> Self {
        Self {
            broadcast_capacity: 16,
            poll_interval: Duration::from_millis(25),
        }
    }

    /// Set the action broadcast channel capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the pending-effect poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the pending-effect counter when dropped, even if the effect
/// task panicked.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Registry of running cancellable effects.
///
/// Each `Effect::Cancellable` registers the abort handle of its running task
/// under its [`EffectId`]; `Effect::Cancel` aborts every handle registered
/// under that id. Registration tokens let a completed effect remove exactly
/// its own handle.
#[derive(Default)]
struct CancelRegistry {
    handles: Mutex<HashMap<EffectId, Vec<(u64, AbortHandle)>>>,
    next_token: AtomicU64,
}

impl CancelRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<EffectId, Vec<(u64, AbortHandle)>>> {
        match self.handles.lock() {
            Ok(guard) => guard,
            // An effect task panicked while holding the lock; the map itself
            // is still valid.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn register(&self, id: EffectId, handle: AbortHandle) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.lock().entry(id).or_default().push((token, handle));
        token
    }

    fn deregister(&self, id: EffectId, token: u64) {
        let mut handles = self.lock();
        if let Some(entries) = handles.get_mut(&id) {
            entries.retain(|(t, _)| *t != token);
            if entries.is_empty() {
                handles.remove(&id);
            }
        }
    }

    /// Abort all handles registered under `id`, returning how many were aborted.
    fn cancel(&self, id: EffectId) -> usize {
        let entries = self.lock().remove(&id).unwrap_or_default();
        let count = entries.len();
        for (_, handle) in entries {
            handle.abort();
        }
        count
    }
}

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock`; reducer runs hold the write lock, so mutations
///    serialize exactly like the single UI event queue they model)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop and cancellation)
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(StorefrontState::default(), StorefrontReducer, env);
///
/// store.send(StorefrontAction::Cart(CartAction::Clear)).await?;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    config: StoreConfig,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// Only actions produced by effects are broadcast, not the initial
    /// action passed to `send`. This enables request-response patterns
    /// (`send_and_wait_for`).
    action_broadcast: broadcast::Sender<A>,
    cancellations: Arc<CancelRegistry>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a new store with custom configuration
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            action_broadcast,
            cancellations: Arc::new(CancelRegistry::default()),
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce more actions (feedback loop)
    ///
    /// `send` returns after starting effect execution, not after effects
    /// complete; use [`Store::quiesce`] or [`Store::send_and_wait_for`] when
    /// a test or caller needs effects settled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<(), StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        for effect in effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    /// Send an action and wait for a matching result action
    ///
    /// Designed for request-response flows: subscribe to the action
    /// broadcast BEFORE sending (avoids races), send the initial action, and
    /// return the first effect-produced action matching the predicate.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: timeout expired before a matching action
    /// - [`StoreError::ChannelClosed`]: broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: store is shutting down
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut rx = self.action_broadcast.subscribe();
        self.send(action).await?;

        let wait = async {
            loop {
                match rx.recv().await {
                    Ok(action) => {
                        if predicate(&action) {
                            return Ok(action);
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "action observer lagged, actions dropped");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }

    /// Subscribe to actions produced by effects
    ///
    /// Initial actions passed to `send` are not broadcast, only the actions
    /// that effects feed back.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read a projection of the current state
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Number of effects currently running
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.pending_effects.load(Ordering::Acquire)
    }

    /// Wait until no effects are pending
    ///
    /// Intended for tests and scripted scenarios that need effect results
    /// applied before asserting on state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdleTimeout`] if effects are still running when
    /// the timeout expires.
    pub async fn quiesce(&self, timeout: Duration) -> Result<(), StoreError> {
        let start = std::time::Instant::now();
        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);
            if pending == 0 {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(StoreError::IdleTimeout(pending));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Initiate graceful shutdown of the store
    ///
    /// Sets the shutdown flag (rejecting new actions), then waits for
    /// pending effects to complete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("initiating graceful shutdown");
        self.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);
            if pending == 0 {
                tracing::info!("all effects completed, shutdown successful");
                return Ok(());
            }
            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "shutdown timed out");
                return Err(StoreError::ShutdownTimeout(pending));
            }
            tracing::debug!(
                pending_effects = pending,
                elapsed_ms = start.elapsed().as_millis(),
                "waiting for effects to complete"
            );
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Start executing an effect on a background task.
    ///
    /// `Effect::None` and `Effect::Cancel` complete synchronously; everything
    /// else is tracked by the pending-effect counter until it finishes.
    fn execute_effect(&self, effect: Effect<A>) {
        match effect {
            Effect::None => {
                tracing::trace!("executing Effect::None (no-op)");
            },
            Effect::Cancel(id) => {
                let cancelled = self.cancellations.cancel(id);
                tracing::debug!(%id, cancelled, "cancelled running effects");
            },
            other => {
                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let guard = PendingGuard(Arc::clone(&self.pending_effects));
                let store = self.clone();

                tokio::spawn(async move {
                    let _guard = guard;
                    Self::run_effect(store, other).await;
                });
            },
        }
    }

    /// Run an effect to completion, including any nested effects.
    ///
    /// Boxed because the effect tree recurses.
    fn run_effect(store: Self, effect: Effect<A>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {
                    tracing::trace!("executing Effect::None (no-op)");
                },
                Effect::Future(fut) => {
                    tracing::trace!("executing Effect::Future");
                    if let Some(action) = fut.await {
                        store.feed_back(action).await;
                    } else {
                        tracing::trace!("Effect::Future completed with no action");
                    }
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!(?duration, "executing Effect::Delay");
                    tokio::time::sleep(duration).await;
                    store.feed_back(*action).await;
                },
                Effect::Parallel(effects) => {
                    tracing::trace!(count = effects.len(), "executing Effect::Parallel");
                    let runs = effects
                        .into_iter()
                        .map(|effect| Self::run_effect(store.clone(), effect));
                    futures::future::join_all(runs).await;
                },
                Effect::Sequential(effects) => {
                    tracing::trace!(count = effects.len(), "executing Effect::Sequential");
                    for effect in effects {
                        Self::run_effect(store.clone(), effect).await;
                    }
                },
                Effect::Cancellable { id, effect } => {
                    tracing::trace!(%id, "executing Effect::Cancellable");
                    let task = tokio::spawn(Self::run_effect(store.clone(), *effect));
                    let token = store.cancellations.register(id, task.abort_handle());

                    let result = task.await;
                    store.cancellations.deregister(id, token);

                    match result {
                        Ok(()) => {},
                        Err(error) if error.is_cancelled() => {
                            tracing::debug!(%id, "cancellable effect aborted");
                        },
                        Err(error) => {
                            tracing::error!(%id, %error, "cancellable effect task failed");
                        },
                    }
                },
                Effect::Cancel(id) => {
                    let cancelled = store.cancellations.cancel(id);
                    tracing::debug!(%id, cancelled, "cancelled running effects");
                },
            }
        })
    }

    /// Feed an effect-produced action back into the reducer, then broadcast
    /// it. Applying before broadcasting means a waiter woken by
    /// [`Store::send_and_wait_for`] already sees the action's state change.
    async fn feed_back(&self, action: A) {
        if let Err(error) = self.send(action.clone()).await {
            tracing::debug!(%error, "dropping effect-produced action");
            return;
        }
        let _ = self.action_broadcast.send(action);
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            config: self.config.clone(),
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
            action_broadcast: self.action_broadcast.clone(),
            cancellations: Arc::clone(&self.cancellations),
        }
    }
}
