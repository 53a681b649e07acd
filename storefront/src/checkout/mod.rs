//! Checkout wizard: a linear three-step flow ending in order submission.

mod reducer;
mod types;

pub use reducer::{
    CheckoutAction, CheckoutEnv, CheckoutReducer, GatewayError, PaymentGateway, SUBMIT_EFFECT,
    SimulatedGateway,
};
pub use types::{
    Address, CheckoutState, CheckoutStep, Order, OrderId, PaymentMethod, ShippingMethod,
};
