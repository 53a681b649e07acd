//! Cart mutations: pure reducer plus synchronous persistence.

use std::sync::Arc;

use storefront_core::effect::Effect;
use storefront_core::reducer::Reducer;
use storefront_core::slot::Slot;
use storefront_core::{SmallVec, smallvec};

use crate::catalog::{Product, ProductId};
use crate::pricing::PricingConfig;

use super::types::CartState;

/// Everything a cart mutation can do
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    /// Add units of a product; merges into an existing line
    Add {
        /// The product to add
        product: Product,
        /// How many units to add
        quantity: u32,
    },
    /// Remove a product's line entirely
    Remove {
        /// The product to remove
        product_id: ProductId,
    },
    /// Overwrite a line's quantity; zero removes the line
    SetQuantity {
        /// The product whose line to update
        product_id: ProductId,
        /// The new quantity
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

/// Dependencies for cart mutations
#[derive(Clone)]
pub struct CartEnv {
    /// Where the cart lines are persisted after every mutation
    pub slot: Arc<dyn Slot>,
    /// Rules for derived totals
    pub pricing: PricingConfig,
}

/// Applies cart mutations and persists the result.
///
/// Every action that changes the line list writes the slot before returning;
/// a mutation that leaves the lines untouched (removing an absent product,
/// adding zero units) skips the write.
#[derive(Clone, Copy, Debug, Default)]
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let changed = match action {
            CartAction::Add { quantity: 0, .. } => false,
            CartAction::Add { product, quantity } => {
                state.upsert(product, quantity);
                true
            },
            CartAction::Remove { product_id } => state.remove(&product_id),
            CartAction::SetQuantity {
                product_id,
                quantity,
            } => state.set_quantity(&product_id, quantity),
            CartAction::Clear => {
                let had_lines = !state.is_empty();
                state.clear();
                had_lines
            },
        };

        if changed {
            state.persist(env.slot.as_ref());
        }
        smallvec![]
    }
}
