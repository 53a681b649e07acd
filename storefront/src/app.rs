//! Root composition: a single state tree, action enum, and reducer wiring
//! the cart, checkout, notification, and session features together.
//!
//! Cross-feature rules live here and nowhere else: checkout entry guards,
//! order submission (which needs the cart snapshot), clearing the cart when
//! an order lands or the shopper signs out, and turning feature outcomes
//! into notifications.

use std::sync::Arc;

use storefront_core::effect::Effect;
use storefront_core::environment::{SystemClock, UuidIds};
use storefront_core::reducer::Reducer;
use storefront_core::slot::{self, Slot};
use storefront_core::{SmallVec, smallvec};

use crate::cart::{CartAction, CartEnv, CartReducer, CartState};
use crate::checkout::{
    CheckoutAction, CheckoutEnv, CheckoutReducer, CheckoutState, CheckoutStep, Order, OrderId,
    SUBMIT_EFFECT, SimulatedGateway,
};
use crate::notification::{
    NotificationAction, NotificationEnv, NotificationReducer, NotificationState,
};
use crate::pricing::PricingConfig;
use crate::session::{SessionAction, SessionEnv, SessionReducer, SessionState, SimulatedAuth};

/// Where the shopper should be sent when a checkout guard fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redirect {
    /// Back to the cart: there is nothing to check out
    Cart,
    /// To the sign-in flow: checkout requires authentication
    Login,
}

/// The whole application's state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorefrontState {
    /// The shopping cart
    pub cart: CartState,
    /// The checkout wizard, present only while checkout is underway
    pub checkout: Option<CheckoutState>,
    /// The notification queue
    pub notifications: NotificationState,
    /// The shopper's session
    pub session: SessionState,
    /// Destination of the most recent failed checkout-entry guard
    pub last_redirect: Option<Redirect>,
}

impl StorefrontState {
    /// Rebuild state from the environment's slots. Cart and session survive
    /// a restart; checkout and notifications always start empty.
    #[must_use]
    pub fn restore(env: &StorefrontEnv) -> Self {
        Self {
            cart: CartState::restore(env.cart.slot.as_ref()),
            checkout: None,
            notifications: NotificationState::new(),
            session: SessionState::restore(env.session.slot.as_ref()),
            last_redirect: None,
        }
    }
}

/// Every action the application handles
#[derive(Clone, Debug)]
pub enum StorefrontAction {
    /// A cart mutation
    Cart(CartAction),
    /// Enter checkout, subject to the guards
    BeginCheckout,
    /// Abandon checkout, discarding the wizard and any in-flight submission
    LeaveCheckout,
    /// A checkout wizard action
    Checkout(CheckoutAction),
    /// A notification queue action
    Notification(NotificationAction),
    /// A session action
    Session(SessionAction),
}

/// Dependencies for the whole application
#[derive(Clone)]
pub struct StorefrontEnv {
    /// Cart dependencies
    pub cart: CartEnv,
    /// Checkout dependencies
    pub checkout: CheckoutEnv,
    /// Session dependencies
    pub session: SessionEnv,
    /// Notification dependencies
    pub notifications: NotificationEnv,
}

impl StorefrontEnv {
    /// An environment with simulated auth and payment backends, suitable for
    /// demos. Cart and session persistence use the given slots.
    #[must_use]
    pub fn simulated(cart_slot: Arc<dyn Slot>, session_slot: Arc<dyn Slot>) -> Self {
        Self {
            cart: CartEnv {
                slot: cart_slot,
                pricing: PricingConfig::new(),
            },
            checkout: CheckoutEnv {
                clock: Arc::new(SystemClock),
                ids: Arc::new(UuidIds),
                gateway: Arc::new(SimulatedGateway::default()),
            },
            session: SessionEnv {
                auth: Arc::new(SimulatedAuth::default()),
                slot: session_slot,
            },
            notifications: NotificationEnv {
                ids: Arc::new(UuidIds),
            },
        }
    }
}

type RootEffects = SmallVec<[Effect<StorefrontAction>; 4]>;

/// Delegates to the feature reducers and applies the cross-feature rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct StorefrontReducer {
    cart: CartReducer,
    checkout: CheckoutReducer,
    notifications: NotificationReducer,
    session: SessionReducer,
}

impl Reducer for StorefrontReducer {
    type State = StorefrontState;
    type Action = StorefrontAction;
    type Environment = StorefrontEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> RootEffects {
        match action {
            StorefrontAction::Cart(action) => self.reduce_cart(state, action, env),
            StorefrontAction::BeginCheckout => self.begin_checkout(state, env),
            StorefrontAction::LeaveCheckout => {
                if state.checkout.take().is_some() {
                    smallvec![Effect::cancel(SUBMIT_EFFECT)]
                } else {
                    smallvec![]
                }
            },
            StorefrontAction::Checkout(action) => self.reduce_checkout(state, action, env),
            StorefrontAction::Notification(action) => self.notify(state, env, action),
            StorefrontAction::Session(action) => self.reduce_session(state, action, env),
        }
    }
}

impl StorefrontReducer {
    fn reduce_cart(
        &self,
        state: &mut StorefrontState,
        action: CartAction,
        env: &StorefrontEnv,
    ) -> RootEffects {
        let feedback = match &action {
            CartAction::Add { product, quantity }
                if *quantity > 0 && !state.cart.contains(&product.id) =>
            {
                Some(NotificationAction::success(format!(
                    "{} added to cart",
                    product.name
                )))
            },
            CartAction::Remove { product_id } | CartAction::SetQuantity { product_id, quantity: 0 } => {
                state.cart.line(product_id).map(|line| {
                    NotificationAction::info(format!("{} removed from cart", line.product.name))
                })
            },
            CartAction::Clear if !state.cart.is_empty() => {
                Some(NotificationAction::info("Cart cleared"))
            },
            _ => None,
        };

        let mut effects: RootEffects = self
            .cart
            .reduce(&mut state.cart, action, &env.cart)
            .into_iter()
            .map(|effect| effect.map(StorefrontAction::Cart))
            .collect();
        if let Some(notification) = feedback {
            effects.extend(self.notify(state, env, notification));
        }
        effects
    }

    fn begin_checkout(&self, state: &mut StorefrontState, env: &StorefrontEnv) -> RootEffects {
        if !state.session.is_authenticated() {
            state.last_redirect = Some(Redirect::Login);
            return self.notify(
                state,
                env,
                NotificationAction::warning("Please sign in to check out"),
            );
        }
        if state.cart.is_empty() {
            state.last_redirect = Some(Redirect::Cart);
            return self.notify(state, env, NotificationAction::warning("Your cart is empty"));
        }
        state.last_redirect = None;
        // Replacing an open wizard aborts its submission, if one is running;
        // the stale gateway result must not land in the fresh wizard.
        if state.checkout.replace(CheckoutState::new()).is_some() {
            smallvec![Effect::cancel(SUBMIT_EFFECT)]
        } else {
            smallvec![]
        }
    }

    fn reduce_checkout(
        &self,
        state: &mut StorefrontState,
        action: CheckoutAction,
        env: &StorefrontEnv,
    ) -> RootEffects {
        let Some(checkout) = state.checkout.as_mut() else {
            tracing::warn!(?action, "dropping checkout action outside checkout");
            return smallvec![];
        };

        match action {
            CheckoutAction::Submit => {
                if checkout.step != CheckoutStep::Payment
                    || checkout.submitting
                    || state.cart.is_empty()
                {
                    return smallvec![];
                }
                let order = Order {
                    id: OrderId::generate(env.checkout.ids.as_ref()),
                    snapshot: state.cart.snapshot(&env.cart.pricing),
                    shipping_address: checkout.shipping_address.clone(),
                    billing_address: checkout.effective_billing().clone(),
                    shipping_method: checkout.shipping_method,
                    payment_method: checkout.payment_method,
                    notes: checkout.notes.clone(),
                    created_at: env.checkout.clock.now(),
                };
                checkout.submitting = true;
                checkout.last_error = None;
                let gateway = env.checkout.gateway.clone();
                smallvec![Effect::cancellable(
                    SUBMIT_EFFECT,
                    Effect::future(async move {
                        let outcome = match gateway.submit(order.clone()).await {
                            Ok(()) => CheckoutAction::Submitted { order },
                            Err(error) => CheckoutAction::SubmissionFailed {
                                reason: error.to_string(),
                            },
                        };
                        Some(StorefrontAction::Checkout(outcome))
                    }),
                )]
            },
            // A gateway result arriving while no submission is in flight is
            // stale (the wizard was replaced or the submission aborted) and
            // must not touch the cart or the wizard.
            CheckoutAction::Submitted { .. } | CheckoutAction::SubmissionFailed { .. }
                if !checkout.submitting =>
            {
                tracing::debug!("dropping stale submission result");
                smallvec![]
            },
            CheckoutAction::Submitted { order } => {
                self.checkout.reduce(
                    checkout,
                    CheckoutAction::Submitted { order },
                    &env.checkout,
                );
                self.cart.reduce(&mut state.cart, CartAction::Clear, &env.cart);
                self.notify(
                    state,
                    env,
                    NotificationAction::success("Order placed successfully!"),
                )
            },
            CheckoutAction::SubmissionFailed { reason } => {
                self.checkout.reduce(
                    checkout,
                    CheckoutAction::SubmissionFailed {
                        reason: reason.clone(),
                    },
                    &env.checkout,
                );
                self.notify(state, env, NotificationAction::error(reason))
            },
            other => {
                let error_before = checkout.last_error.clone();
                self.checkout.reduce(checkout, other, &env.checkout);
                let error_after = checkout.last_error.clone();
                match error_after {
                    Some(message) if error_before.as_ref() != Some(&message) => {
                        self.notify(state, env, NotificationAction::error(message))
                    },
                    _ => smallvec![],
                }
            },
        }
    }

    fn reduce_session(
        &self,
        state: &mut StorefrontState,
        action: SessionAction,
        env: &StorefrontEnv,
    ) -> RootEffects {
        // Auth outcomes are stale once the request was cancelled; the child
        // reducer drops them, so no feedback either.
        let feedback = match &action {
            SessionAction::LoggedIn { user } if state.session.authenticating => Some(
                NotificationAction::success(format!("Welcome, {}!", user.name)),
            ),
            SessionAction::AuthFailed { reason } if state.session.authenticating => {
                Some(NotificationAction::error(reason.clone()))
            },
            SessionAction::Logout if state.session.is_authenticated() => {
                Some(NotificationAction::info("Signed out"))
            },
            _ => None,
        };
        let signing_out = matches!(action, SessionAction::Logout);
        let error_before = state.session.last_error.clone();

        let mut effects: RootEffects = self
            .session
            .reduce(&mut state.session, action, &env.session)
            .into_iter()
            .map(|effect| effect.map(StorefrontAction::Session))
            .collect();

        // Signing out also abandons the cart, in memory and on disk.
        if signing_out {
            self.cart.reduce(&mut state.cart, CartAction::Clear, &env.cart);
            slot::clear_slot(env.cart.slot.as_ref(), "cart");
        }

        if let Some(notification) = feedback {
            effects.extend(self.notify(state, env, notification));
        } else if let Some(message) = state.session.last_error.clone() {
            if error_before.as_ref() != Some(&message) {
                effects.extend(self.notify(state, env, NotificationAction::error(message)));
            }
        }
        effects
    }

    fn notify(
        &self,
        state: &mut StorefrontState,
        env: &StorefrontEnv,
        action: NotificationAction,
    ) -> RootEffects {
        self.notifications
            .reduce(&mut state.notifications, action, &env.notifications)
            .into_iter()
            .map(|effect| effect.map(StorefrontAction::Notification))
            .collect()
    }
}
