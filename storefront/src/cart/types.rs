//! Cart state, line items, and the derived totals snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::slot::{self, Slot};

use crate::catalog::{Product, ProductId};
use crate::pricing::PricingConfig;

/// A product in the cart together with how many of it the shopper wants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to
    pub product: Product,
    /// How many units; always at least one while the line exists
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The cart's persistent state: only the lines
///
/// Item counts and money totals are derived on demand via [`CartState::snapshot`]
/// and never serialized.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// An empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from a slot, falling back to empty when the slot is
    /// missing, unreadable, or holds malformed data
    #[must_use]
    pub fn restore(slot: &dyn Slot) -> Self {
        let lines = slot::load_json::<Vec<CartLine>>(slot, "cart").unwrap_or_default();
        Self { lines }
    }

    /// Write the current lines to a slot; failures are logged, not surfaced
    pub fn persist(&self, slot: &dyn Slot) {
        slot::store_json(slot, "cart", &self.lines);
    }

    /// Whether the cart holds no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines currently in the cart, in insertion order
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if present
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product.id == product_id)
    }

    /// Whether a product is already in the cart
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }

    /// Total units across all lines, saturating at `u32::MAX`
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    pub(crate) fn upsert(&mut self, product: Product, quantity: u32) {
        match self.lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine { product, quantity }),
        }
    }

    pub(crate) fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product.id != product_id);
        self.lines.len() != before
    }

    pub(crate) fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|line| &line.product.id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }

    /// Compute totals for the current lines under the given pricing rules
    #[must_use]
    pub fn snapshot(&self, pricing: &PricingConfig) -> CartSnapshot {
        let subtotal: Decimal = self.lines.iter().map(CartLine::line_total).sum();
        let tax = pricing.tax_for(subtotal);
        let shipping_fee = pricing.shipping_fee_for(subtotal);
        CartSnapshot {
            lines: self.lines.clone(),
            item_count: self.item_count(),
            subtotal,
            tax,
            shipping_fee,
            total: subtotal + tax + shipping_fee,
        }
    }
}

/// Point-in-time view of the cart with all derived amounts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// The lines the totals were computed from
    pub lines: Vec<CartLine>,
    /// Total units across all lines
    pub item_count: u32,
    /// Sum of line totals
    pub subtotal: Decimal,
    /// Tax on the subtotal
    pub tax: Decimal,
    /// Shipping fee, zero once the free-shipping threshold is met
    pub shipping_fee: Decimal,
    /// Subtotal plus tax plus shipping
    pub total: Decimal,
}
