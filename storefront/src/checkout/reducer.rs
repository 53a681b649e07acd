//! Checkout transitions and the payment gateway seam.
//!
//! The reducer owns every step transition and field edit. Submission itself
//! is coordinated one level up, where the cart snapshot lives; this reducer
//! only records the outcome actions (`Submitted` / `SubmissionFailed`).

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use storefront_core::effect::{Effect, EffectId};
use storefront_core::environment::{Clock, IdGenerator};
use storefront_core::reducer::Reducer;
use storefront_core::{SmallVec, smallvec};

use super::types::{Address, CheckoutState, CheckoutStep, Order, PaymentMethod, ShippingMethod};

/// Identifier for the in-flight submission effect, so leaving checkout or an
/// explicit cancel can abort it.
pub const SUBMIT_EFFECT: EffectId = EffectId::new("checkout-submit");

/// Failure reported by a payment gateway
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("payment gateway rejected the order: {0}")]
pub struct GatewayError(pub String);

/// Accepts a completed order for processing.
///
/// Dyn-compatible so environments can hold `Arc<dyn PaymentGateway>`.
pub trait PaymentGateway: Send + Sync {
    /// Submit an order. Resolves once the gateway accepts or rejects it.
    fn submit(&self, order: Order) -> BoxFuture<'static, Result<(), GatewayError>>;
}

/// A gateway that accepts every order after a fixed delay.
///
/// Stands in for a real payment backend during demos and tests; the delay
/// keeps the submission window observable so cancellation can be exercised.
#[derive(Clone, Debug)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    /// A gateway that resolves after the given delay
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl PaymentGateway for SimulatedGateway {
    fn submit(&self, order: Order) -> BoxFuture<'static, Result<(), GatewayError>> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(order_id = %order.id, total = %order.snapshot.total, "order accepted");
            Ok(())
        })
    }
}

/// Dependencies for the checkout flow
#[derive(Clone)]
pub struct CheckoutEnv {
    /// Source of submission timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of order ids
    pub ids: Arc<dyn IdGenerator>,
    /// Where submitted orders go
    pub gateway: Arc<dyn PaymentGateway>,
}

/// Everything the checkout wizard can do
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutAction {
    /// Replace the shipping address
    SetShippingAddress(Address),
    /// Replace the billing address; implies billing is edited separately
    SetBillingAddress(Address),
    /// Toggle reusing the shipping address for billing
    SetSameAsShipping(bool),
    /// Choose a shipping method
    SelectShippingMethod(ShippingMethod),
    /// Choose a payment method
    SelectPaymentMethod(PaymentMethod),
    /// Replace the delivery notes
    SetNotes(String),
    /// Advance to the next step, validating the current one
    NextStep,
    /// Return to the previous step
    Back,
    /// Submit the order (coordinated by the parent, which holds the cart)
    Submit,
    /// The gateway accepted the order
    Submitted {
        /// The accepted order
        order: Order,
    },
    /// The gateway rejected the order or the submission failed
    SubmissionFailed {
        /// Human-readable failure description
        reason: String,
    },
}

/// Drives the wizard through its steps.
///
/// Validation happens on `NextStep`: the address step requires a complete
/// shipping address, plus a complete billing address unless it mirrors
/// shipping. Later steps always have a valid selection, so they advance
/// freely. `Back` never validates.
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckoutReducer;

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CheckoutAction::SetShippingAddress(address) => {
                state.shipping_address = address;
                if state.same_as_shipping {
                    state.billing_address = state.shipping_address.clone();
                }
            },
            CheckoutAction::SetBillingAddress(address) => {
                state.billing_address = address;
                state.same_as_shipping = false;
            },
            CheckoutAction::SetSameAsShipping(same) => {
                state.same_as_shipping = same;
                if same {
                    state.billing_address = state.shipping_address.clone();
                }
            },
            CheckoutAction::SelectShippingMethod(method) => {
                state.shipping_method = method;
            },
            CheckoutAction::SelectPaymentMethod(method) => {
                state.payment_method = method;
            },
            CheckoutAction::SetNotes(notes) => {
                state.notes = notes;
            },
            CheckoutAction::NextStep => advance(state),
            CheckoutAction::Back => {
                state.step = match state.step {
                    CheckoutStep::ShippingMethod => CheckoutStep::Address,
                    CheckoutStep::Payment => CheckoutStep::ShippingMethod,
                    current @ (CheckoutStep::Address | CheckoutStep::Submitted) => current,
                };
            },
            // Coordinated by the parent, which owns the cart snapshot.
            CheckoutAction::Submit => {},
            // A result with no submission in flight is stale; the submission
            // was aborted after the gateway already answered.
            CheckoutAction::Submitted { .. } | CheckoutAction::SubmissionFailed { .. }
                if !state.submitting => {},
            CheckoutAction::Submitted { order } => {
                state.submitting = false;
                state.last_error = None;
                state.step = CheckoutStep::Submitted;
                state.last_order = Some(order);
            },
            CheckoutAction::SubmissionFailed { reason } => {
                state.submitting = false;
                state.last_error = Some(reason);
            },
        }
        smallvec![]
    }
}

fn advance(state: &mut CheckoutState) {
    match state.step {
        CheckoutStep::Address => {
            if !state.shipping_address.is_complete() {
                state.last_error = Some("Please fill in the shipping address".to_string());
                return;
            }
            if !state.same_as_shipping && !state.billing_address.is_complete() {
                state.last_error = Some("Please fill in the billing address".to_string());
                return;
            }
            state.last_error = None;
            state.step = CheckoutStep::ShippingMethod;
        },
        CheckoutStep::ShippingMethod => {
            state.last_error = None;
            state.step = CheckoutStep::Payment;
        },
        // Payment advances through Submit, and Submitted is terminal.
        CheckoutStep::Payment | CheckoutStep::Submitted => {},
    }
}
