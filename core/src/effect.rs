//! Side effect descriptions.
//!
//! Effects are NOT executed immediately. They are descriptions of what should
//! happen, returned from reducers and executed by the store runtime. This keeps
//! reducers pure and lets tests assert on intended side effects as plain values.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Identifier for a cancellable unit of effect work.
///
/// Ids are tied to the flow that owns the work (for example the checkout
/// submission or an in-flight login), so leaving that flow can cancel any
/// outstanding effect before its result mutates state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectId(&'static str);

impl EffectId {
    /// Creates an effect id from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the id's name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Boxed future an [`Effect::Future`] wraps.
pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

/// Effect type - describes a side effect to be executed.
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Run effects in parallel
    Parallel(Vec<Effect<Action>>),

    /// Run effects sequentially, waiting for each to complete
    Sequential(Vec<Effect<Action>>),

    /// Delayed action (notification expiry, simulated latency)
    Delay {
        /// How long to wait
        duration: Duration,
        /// Action to dispatch after the delay
        action: Box<Action>,
    },

    /// Arbitrary async computation.
    ///
    /// Returns `Option<Action>` - if `Some`, the action is fed back into the
    /// reducer.
    Future(EffectFuture<Action>),

    /// An effect that can be aborted before completion via [`Effect::Cancel`].
    ///
    /// While the inner effect runs, the runtime keeps it registered under
    /// `id`. A cancelled effect never feeds an action back into the reducer,
    /// so a stale result cannot mutate state after its originating flow is
    /// gone.
    Cancellable {
        /// Identifier the running work is registered under
        id: EffectId,
        /// The effect to run
        effect: Box<Effect<Action>>,
    },

    /// Abort all running effects registered under the given id.
    ///
    /// A no-op when nothing is registered.
    Cancel(EffectId),
}

// Manual Debug implementation since Future doesn't implement Debug
impl<Action> fmt::Debug for Effect<Action>
where
    Action: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            Effect::Cancellable { id, effect } => f
                .debug_struct("Effect::Cancellable")
                .field("id", id)
                .field("effect", effect)
                .finish(),
            Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
        }
    }
}

impl<Action> Effect<Action> {
    /// Combine effects to run in parallel
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }

    /// Wrap an async computation as an effect
    pub fn future<F>(fut: F) -> Effect<Action>
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        Effect::Future(Box::pin(fut))
    }

    /// Dispatch an action after a delay
    #[must_use]
    pub fn delay(duration: Duration, action: Action) -> Effect<Action> {
        Effect::Delay {
            duration,
            action: Box::new(action),
        }
    }

    /// Make an effect cancellable under the given id
    #[must_use]
    pub fn cancellable(id: EffectId, effect: Effect<Action>) -> Effect<Action> {
        Effect::Cancellable {
            id,
            effect: Box::new(effect),
        }
    }

    /// Abort all running effects registered under the given id
    #[must_use]
    pub const fn cancel(id: EffectId) -> Effect<Action> {
        Effect::Cancel(id)
    }
}

impl<Action: Send + 'static> Effect<Action> {
    /// Lift this effect into a parent action type.
    ///
    /// Used when composing feature reducers into a root reducer: a child
    /// effect producing child actions becomes a root effect producing the
    /// wrapped root actions.
    #[must_use]
    pub fn map<Parent, F>(self, f: F) -> Effect<Parent>
    where
        Parent: Send + 'static,
        F: Fn(Action) -> Parent + Send + Sync + Clone + 'static,
    {
        match self {
            Effect::None => Effect::None,
            Effect::Parallel(effects) => Effect::Parallel(
                effects.into_iter().map(|e| e.map(f.clone())).collect(),
            ),
            Effect::Sequential(effects) => Effect::Sequential(
                effects.into_iter().map(|e| e.map(f.clone())).collect(),
            ),
            Effect::Delay { duration, action } => Effect::Delay {
                duration,
                action: Box::new(f(*action)),
            },
            Effect::Future(fut) => Effect::future(async move { fut.await.map(f) }),
            Effect::Cancellable { id, effect } => Effect::Cancellable {
                id,
                effect: Box::new(effect.map(f)),
            },
            Effect::Cancel(id) => Effect::Cancel(id),
        }
    }
}
