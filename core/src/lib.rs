//! # Storefront Core
//!
//! Core traits and types for the storefront state model.
//!
//! The storefront is built as a functional core with an imperative shell:
//! all business logic lives in pure reducers, and every side effect is a
//! value describing what should happen, executed later by the store runtime.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature (cart, checkout, notifications, session)
//! - **Action**: All possible inputs to a reducer (user commands and effect results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use storefront_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = CartEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         env: &CartEnvironment,
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         // Business logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub mod effect;
pub mod environment;
pub mod reducer;
pub mod slot;
