//! End-to-end flows through the composed store: sign in, shop, check out,
//! and the cancellation path.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use storefront::app::{StorefrontAction, StorefrontEnv, StorefrontReducer, StorefrontState};
use storefront::cart::CartAction;
use storefront::catalog::{Product, ProductId};
use storefront::checkout::{
    Address, CheckoutAction, CheckoutEnv, CheckoutStep, ShippingMethod, SimulatedGateway,
};
use storefront::notification::Severity;
use storefront::pricing::PricingConfig;
use storefront::session::{SessionAction, SessionEnv, SimulatedAuth};
use storefront_runtime::Store;
use storefront_testing::{MemorySlot, SequentialIds, test_clock};

fn test_env(gateway_delay: Duration) -> StorefrontEnv {
    StorefrontEnv {
        cart: storefront::cart::CartEnv {
            slot: Arc::new(MemorySlot::new()),
            pricing: PricingConfig::new(),
        },
        checkout: CheckoutEnv {
            clock: Arc::new(test_clock()),
            ids: Arc::new(SequentialIds::new()),
            gateway: Arc::new(SimulatedGateway::new(gateway_delay)),
        },
        session: SessionEnv {
            auth: Arc::new(SimulatedAuth::new(Duration::from_millis(1))),
            slot: Arc::new(MemorySlot::new()),
        },
        notifications: storefront::notification::NotificationEnv {
            ids: Arc::new(SequentialIds::new()),
        },
    }
}

fn store(gateway_delay: Duration) -> Store<StorefrontState, StorefrontAction, StorefrontEnv, StorefrontReducer> {
    Store::new(
        StorefrontState::default(),
        StorefrontReducer::default(),
        test_env(gateway_delay),
    )
}

fn product(id: &str, price: Decimal) -> Product {
    Product::new(ProductId::new(id), format!("Product {id}"), price)
}

fn address() -> Address {
    Address {
        name: "May Fung".to_string(),
        street: "1 Harbor Rd".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip: "62701".to_string(),
        country: "US".to_string(),
    }
}

async fn sign_in(
    store: &Store<StorefrontState, StorefrontAction, StorefrontEnv, StorefrontReducer>,
) {
    store
        .send_and_wait_for(
            StorefrontAction::Session(SessionAction::Login {
                email: "may@example.com".to_string(),
                password: "playtime".to_string(),
            }),
            |action| {
                matches!(
                    action,
                    StorefrontAction::Session(SessionAction::LoggedIn { .. })
                )
            },
            Duration::from_secs(2),
        )
        .await
        .expect("login should land");
}

#[tokio::test]
async fn full_checkout_places_an_order_and_empties_the_cart() {
    let store = store(Duration::from_millis(10));
    sign_in(&store).await;

    store
        .send(StorefrontAction::Cart(CartAction::Add {
            product: product("p1", Decimal::new(5999, 2)),
            quantity: 1,
        }))
        .await
        .unwrap();
    store
        .send(StorefrontAction::Cart(CartAction::Add {
            product: product("p2", Decimal::new(8999, 2)),
            quantity: 2,
        }))
        .await
        .unwrap();

    store.send(StorefrontAction::BeginCheckout).await.unwrap();
    for action in [
        CheckoutAction::SetShippingAddress(address()),
        CheckoutAction::NextStep,
        CheckoutAction::SelectShippingMethod(ShippingMethod::Express),
        CheckoutAction::NextStep,
    ] {
        store.send(StorefrontAction::Checkout(action)).await.unwrap();
    }

    let outcome = store
        .send_and_wait_for(
            StorefrontAction::Checkout(CheckoutAction::Submit),
            |action| {
                matches!(
                    action,
                    StorefrontAction::Checkout(CheckoutAction::Submitted { .. })
                )
            },
            Duration::from_secs(2),
        )
        .await
        .expect("submission should land");

    let StorefrontAction::Checkout(CheckoutAction::Submitted { order }) = outcome else {
        panic!("expected a submitted order");
    };
    assert!(order.id.as_str().starts_with("ORD-"));
    assert_eq!(order.snapshot.subtotal, Decimal::new(23_997, 2));
    assert_eq!(order.snapshot.tax, Decimal::new(191_976, 4));
    assert_eq!(order.shipping_method, ShippingMethod::Express);

    store
        .state(|state| {
            assert!(state.cart.is_empty());
            let checkout = state.checkout.as_ref().expect("wizard still open");
            assert_eq!(checkout.step, CheckoutStep::Submitted);
            assert!(
                state
                    .notifications
                    .queue()
                    .iter()
                    .any(|n| n.severity == Severity::Success
                        && n.message == "Order placed successfully!")
            );
        })
        .await;
}

#[tokio::test]
async fn leaving_checkout_cancels_the_inflight_submission() {
    let store = store(Duration::from_millis(200));
    sign_in(&store).await;

    store
        .send(StorefrontAction::Cart(CartAction::Add {
            product: product("p1", Decimal::new(5999, 2)),
            quantity: 1,
        }))
        .await
        .unwrap();
    store.send(StorefrontAction::BeginCheckout).await.unwrap();
    for action in [
        CheckoutAction::SetShippingAddress(address()),
        CheckoutAction::NextStep,
        CheckoutAction::NextStep,
    ] {
        store.send(StorefrontAction::Checkout(action)).await.unwrap();
    }

    store
        .send(StorefrontAction::Checkout(CheckoutAction::Submit))
        .await
        .unwrap();
    // Let the submission start before abandoning it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.send(StorefrontAction::LeaveCheckout).await.unwrap();

    // Wait past the gateway delay; the aborted call must not land.
    tokio::time::sleep(Duration::from_millis(400)).await;
    store
        .state(|state| {
            assert!(state.checkout.is_none());
            assert!(!state.cart.is_empty(), "cart survives an abandoned checkout");
        })
        .await;
}

#[tokio::test]
async fn reentering_checkout_discards_the_previous_submission() {
    let store = store(Duration::from_millis(100));
    sign_in(&store).await;

    store
        .send(StorefrontAction::Cart(CartAction::Add {
            product: product("p1", Decimal::new(5999, 2)),
            quantity: 1,
        }))
        .await
        .unwrap();
    store.send(StorefrontAction::BeginCheckout).await.unwrap();
    for action in [
        CheckoutAction::SetShippingAddress(address()),
        CheckoutAction::NextStep,
        CheckoutAction::NextStep,
    ] {
        store.send(StorefrontAction::Checkout(action)).await.unwrap();
    }
    store
        .send(StorefrontAction::Checkout(CheckoutAction::Submit))
        .await
        .unwrap();

    // Start over mid-submission; the old gateway call must not land in the
    // fresh wizard.
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.send(StorefrontAction::BeginCheckout).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    store
        .state(|state| {
            let checkout = state.checkout.as_ref().expect("fresh wizard open");
            assert_eq!(checkout.step, CheckoutStep::Address);
            assert!(checkout.last_order.is_none());
            assert!(!state.cart.is_empty());
        })
        .await;
}

#[tokio::test]
async fn guards_keep_checkout_closed() {
    let store = store(Duration::from_millis(10));

    store.send(StorefrontAction::BeginCheckout).await.unwrap();
    store
        .state(|state| {
            assert!(state.checkout.is_none());
            assert_eq!(
                state.last_redirect,
                Some(storefront::app::Redirect::Login)
            );
        })
        .await;

    sign_in(&store).await;
    store.send(StorefrontAction::BeginCheckout).await.unwrap();
    store
        .state(|state| {
            assert!(state.checkout.is_none());
            assert_eq!(state.last_redirect, Some(storefront::app::Redirect::Cart));
        })
        .await;
}

#[tokio::test]
async fn notifications_expire_on_their_own() {
    let store = store(Duration::from_millis(10));

    store
        .send(StorefrontAction::Notification(
            storefront::notification::NotificationAction::Push {
                message: "blink and you miss it".to_string(),
                severity: Severity::Info,
                duration: Some(Duration::from_millis(30)),
            },
        ))
        .await
        .unwrap();
    store
        .state(|state| assert_eq!(state.notifications.queue().len(), 1))
        .await;

    store
        .quiesce(Duration::from_secs(2))
        .await
        .expect("expiry timer should drain");
    store
        .state(|state| assert!(state.notifications.queue().is_empty()))
        .await;
}
