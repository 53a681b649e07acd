//! # Storefront
//!
//! The storefront domain: a cart/checkout state model with notifications and
//! a session stub, built on the reducer/effect architecture.
//!
//! ## Features
//!
//! - **Cart** ([`cart`]): product/quantity lines with derived totals,
//!   persisted to a durable local slot on every mutation
//! - **Checkout** ([`checkout`]): a linear address → shipping → payment
//!   wizard ending in order submission
//! - **Notifications** ([`notification`]): ephemeral auto-expiring user
//!   messages
//! - **Session** ([`session`]): mock login/register with local persistence
//! - **Catalog** ([`catalog`]): product records and an illustrative listing
//!   interface with filter/sort parameters
//!
//! The features compose into a single root store in [`app`]: one
//! [`app::StorefrontState`], one [`app::StorefrontAction`], one
//! [`app::StorefrontReducer`] that owns the cross-feature contracts
//! (cart events raise notifications, submission clears the cart, logout
//! destroys the cart, checkout entry is guarded).
//!
//! ## Example
//!
//! ```ignore
//! use storefront::app::{StorefrontAction, StorefrontEnv, StorefrontReducer, StorefrontState};
//! use storefront::cart::CartAction;
//! use storefront_runtime::Store;
//!
//! let env = StorefrontEnv::simulated(cart_slot, session_slot);
//! let state = StorefrontState::restore(&env);
//! let store = Store::new(state, StorefrontReducer::default(), env);
//!
//! store.send(StorefrontAction::Cart(CartAction::Add { product, quantity: 1 })).await?;
//! ```

pub mod app;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod format;
pub mod notification;
pub mod pricing;
pub mod session;
