//! # Storefront Testing
//!
//! Testing utilities and helpers for the storefront state model.
//!
//! This crate provides:
//! - Mock implementations of environment traits
//! - An ergonomic Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(CartReducer)
//!     .with_env(test_environment())
//!     .given_state(CartState::default())
//!     .when_action(CartAction::Clear)
//!     .then_state(|state| assert!(state.is_empty()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

pub mod mocks;
pub mod reducer_test;

// Re-export commonly used items
pub use mocks::{FixedClock, MemorySlot, SequentialIds, test_clock};
pub use reducer_test::{ReducerTest, assertions};
