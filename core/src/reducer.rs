//! The core trait for business logic.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
//! They contain all business logic and are deterministic and testable.

use crate::effect::Effect;
use smallvec::SmallVec;

/// The Reducer trait - core abstraction for business logic
///
/// # Example
///
/// ```ignore
/// impl Reducer for CartReducer {
///     type State = CartState;
///     type Action = CartAction;
///     type Environment = CartEnvironment;
///
///     fn reduce(
///         &self,
///         state: &mut CartState,
///         action: CartAction,
///         env: &CartEnvironment,
///     ) -> SmallVec<[Effect<CartAction>; 4]> {
///         match action {
///             CartAction::Clear => {
///                 state.lines.clear();
///                 SmallVec::new()
///             }
///             _ => SmallVec::new(),
///         }
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Reduce an action into state changes and effects
    ///
    /// This is a pure function that:
    /// 1. Validates the action
    /// 2. Updates state in place
    /// 3. Returns effect descriptions to be executed
    ///
    /// # Returns
    ///
    /// A vector of effects to be executed by the runtime
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]>;
}
