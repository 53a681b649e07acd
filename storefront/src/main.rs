//! Scripted storefront walkthrough.
//!
//! Drives the composed reducer through a full shopping session: browse the
//! catalog, sign in, fill a cart, walk the checkout wizard, and submit the
//! order through the simulated gateway. State persists to JSON slots under
//! a local data directory, so running it twice restores the session.
//!
//! ```bash
//! cargo run --bin storefront-demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront::app::{StorefrontAction, StorefrontEnv, StorefrontReducer, StorefrontState};
use storefront::cart::CartAction;
use storefront::catalog::{MemoryCatalog, Product, ProductCatalog, ProductId, ProductQuery};
use storefront::checkout::{Address, CheckoutAction, ShippingMethod};
use storefront::format::format_currency;
use storefront::session::SessionAction;
use storefront_core::slot::FileSlot;
use storefront_runtime::Store;

fn demo_catalog() -> MemoryCatalog {
    MemoryCatalog::new(vec![
        Product {
            brand: "Brickworks".to_string(),
            category: "building-sets".to_string(),
            ..Product::new(
                ProductId::new("castle-set"),
                "Castle Building Set",
                Decimal::new(5999, 2),
            )
        },
        Product {
            brand: "Orbit Toys".to_string(),
            category: "science".to_string(),
            is_new: true,
            ..Product::new(
                ProductId::new("rocket-lab"),
                "Rocket Lab Kit",
                Decimal::new(8999, 2),
            )
        },
    ])
}

fn demo_address() -> Address {
    Address {
        name: "May Fung".to_string(),
        street: "1 Harbor Rd".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip: "62701".to_string(),
        country: "US".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = std::env::temp_dir().join("storefront-demo");
    let cart_slot = Arc::new(FileSlot::new(data_dir.join("cart.json")));
    let session_slot = Arc::new(FileSlot::new(data_dir.join("session.json")));
    info!(path = %data_dir.display(), "persisting slots");

    let env = StorefrontEnv::simulated(cart_slot, session_slot);
    let pricing = env.cart.pricing.clone();
    let initial = StorefrontState::restore(&env);
    if initial.session.is_authenticated() {
        info!("restored a signed-in session from a previous run");
    }
    let store = Store::new(initial, StorefrontReducer::default(), env);

    // Browse.
    let catalog = demo_catalog();
    let products = catalog
        .list(ProductQuery::default())
        .await
        .context("listing products")?;
    for product in &products {
        info!(
            name = %product.name,
            price = %format_currency(product.price),
            "catalog item"
        );
    }

    // Sign in and wait for the auth round trip to land.
    store
        .send_and_wait_for(
            StorefrontAction::Session(SessionAction::Login {
                email: "may@example.com".to_string(),
                password: "playtime".to_string(),
            }),
            |action| {
                matches!(
                    action,
                    StorefrontAction::Session(
                        SessionAction::LoggedIn { .. } | SessionAction::AuthFailed { .. }
                    )
                )
            },
            Duration::from_secs(5),
        )
        .await
        .context("signing in")?;

    // Fill the cart.
    for (product, quantity) in [(products[0].clone(), 1), (products[1].clone(), 2)] {
        store
            .send(StorefrontAction::Cart(CartAction::Add { product, quantity }))
            .await
            .context("adding to cart")?;
    }
    let snapshot = store
        .state(|state| state.cart.snapshot(&pricing))
        .await;
    info!(
        items = snapshot.item_count,
        subtotal = %format_currency(snapshot.subtotal),
        tax = %format_currency(snapshot.tax),
        shipping = %format_currency(snapshot.shipping_fee),
        total = %format_currency(snapshot.total),
        "cart totals"
    );

    // Walk the wizard.
    store.send(StorefrontAction::BeginCheckout).await?;
    for action in [
        CheckoutAction::SetShippingAddress(demo_address()),
        CheckoutAction::NextStep,
        CheckoutAction::SelectShippingMethod(ShippingMethod::Express),
        CheckoutAction::NextStep,
        CheckoutAction::SetNotes("Leave at the front door".to_string()),
    ] {
        store.send(StorefrontAction::Checkout(action)).await?;
    }

    // Submit and wait for the gateway's verdict.
    let outcome = store
        .send_and_wait_for(
            StorefrontAction::Checkout(CheckoutAction::Submit),
            |action| {
                matches!(
                    action,
                    StorefrontAction::Checkout(
                        CheckoutAction::Submitted { .. } | CheckoutAction::SubmissionFailed { .. }
                    )
                )
            },
            Duration::from_secs(5),
        )
        .await
        .context("submitting order")?;

    match outcome {
        StorefrontAction::Checkout(CheckoutAction::Submitted { order }) => {
            info!(
                order_id = %order.id,
                total = %format_currency(order.snapshot.total),
                "order confirmed"
            );
        },
        StorefrontAction::Checkout(CheckoutAction::SubmissionFailed { reason }) => {
            anyhow::bail!("order rejected: {reason}");
        },
        other => anyhow::bail!("unexpected outcome: {other:?}"),
    }

    let pending = store
        .state(|state| state.notifications.queue().len())
        .await;
    info!(notifications = pending, "queued notifications at exit");

    store
        .shutdown(Duration::from_secs(5))
        .await
        .context("shutting down")?;
    Ok(())
}
