//! Property tests for cart invariants: any sequence of mutations keeps the
//! derived totals consistent with the line items.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use storefront::cart::{CartAction, CartEnv, CartLine, CartReducer, CartState};
use storefront::catalog::{Product, ProductId};
use storefront::pricing::PricingConfig;
use storefront_core::reducer::Reducer;
use storefront_testing::MemorySlot;

fn product_strategy() -> impl Strategy<Value = Product> {
    (0..5u8, 1..50_000i64).prop_map(|(id, cents)| {
        Product::new(
            ProductId::new(format!("p{id}")),
            format!("Product p{id}"),
            Decimal::new(cents, 2),
        )
    })
}

fn action_strategy() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        (product_strategy(), 0..5u32)
            .prop_map(|(product, quantity)| CartAction::Add { product, quantity }),
        (0..5u8).prop_map(|id| CartAction::Remove {
            product_id: ProductId::new(format!("p{id}")),
        }),
        ((0..5u8), 0..5u32).prop_map(|(id, quantity)| CartAction::SetQuantity {
            product_id: ProductId::new(format!("p{id}")),
            quantity,
        }),
        Just(CartAction::Clear),
    ]
}

fn apply(actions: Vec<CartAction>) -> CartState {
    let env = CartEnv {
        slot: Arc::new(MemorySlot::new()),
        pricing: PricingConfig::new(),
    };
    let mut cart = CartState::new();
    for action in actions {
        CartReducer.reduce(&mut cart, action, &env);
    }
    cart
}

proptest! {
    #[test]
    fn every_line_has_positive_quantity(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let cart = apply(actions);
        prop_assert!(cart.lines().iter().all(|line| line.quantity >= 1));
    }

    #[test]
    fn product_ids_stay_unique(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let cart = apply(actions);
        let mut ids: Vec<_> = cart.lines().iter().map(|line| line.product.id.clone()).collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        prop_assert_eq!(ids.len(), cart.lines().len());
    }

    #[test]
    fn totals_are_consistent(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let pricing = PricingConfig::new();
        let cart = apply(actions);
        let snapshot = cart.snapshot(&pricing);

        let expected_count: u32 = cart.lines().iter().map(|line| line.quantity).sum();
        let expected_subtotal: Decimal = cart.lines().iter().map(CartLine::line_total).sum();

        prop_assert_eq!(snapshot.item_count, expected_count);
        prop_assert_eq!(snapshot.subtotal, expected_subtotal);
        prop_assert_eq!(snapshot.tax, expected_subtotal * Decimal::new(8, 2));
        prop_assert_eq!(
            snapshot.total,
            snapshot.subtotal + snapshot.tax + snapshot.shipping_fee
        );
    }

    #[test]
    fn shipping_follows_the_threshold(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let cart = apply(actions);
        let snapshot = cart.snapshot(&PricingConfig::new());
        if snapshot.subtotal >= Decimal::new(500, 0) {
            prop_assert_eq!(snapshot.shipping_fee, Decimal::ZERO);
        } else {
            prop_assert_eq!(snapshot.shipping_fee, Decimal::new(49, 0));
        }
    }

    #[test]
    fn persisted_cart_restores_identically(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let slot = Arc::new(MemorySlot::new());
        let env = CartEnv { slot: slot.clone(), pricing: PricingConfig::new() };
        let mut cart = CartState::new();
        for action in actions {
            CartReducer.reduce(&mut cart, action, &env);
        }
        cart.persist(slot.as_ref());
        prop_assert_eq!(CartState::restore(slot.as_ref()), cart);
    }
}
