//! Pricing configuration for derived cart totals.
//!
//! Tax is a flat rate on the subtotal. Shipping is a flat fee waived once the
//! subtotal reaches the free-shipping threshold. Totals are always recomputed
//! from these rules, never stored.

use rust_decimal::Decimal;

/// Pricing rules applied when computing a cart snapshot
///
/// # Example
///
/// ```
/// use storefront::pricing::PricingConfig;
/// use rust_decimal::Decimal;
///
/// let pricing = PricingConfig::new().with_shipping_fee(Decimal::new(999, 2));
/// assert_eq!(pricing.shipping_fee_for(Decimal::new(10000, 2)), Decimal::new(999, 2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig {
    tax_rate: Decimal,
    shipping_fee: Decimal,
    free_shipping_threshold: Decimal,
}

impl PricingConfig {
    /// Create pricing rules with default settings
    ///
    /// Defaults:
    /// - `tax_rate`: 0.08
    /// - `shipping_fee`: 49.00 flat
    /// - `free_shipping_threshold`: 500.00
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tax_rate: Decimal::from_parts(8, 0, 0, false, 2),
            shipping_fee: Decimal::from_parts(49, 0, 0, false, 0),
            free_shipping_threshold: Decimal::from_parts(500, 0, 0, false, 0),
        }
    }

    /// Set the tax rate
    #[must_use]
    pub const fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Set the flat shipping fee
    #[must_use]
    pub const fn with_shipping_fee(mut self, fee: Decimal) -> Self {
        self.shipping_fee = fee;
        self
    }

    /// Set the subtotal at which shipping is waived
    #[must_use]
    pub const fn with_free_shipping_threshold(mut self, threshold: Decimal) -> Self {
        self.free_shipping_threshold = threshold;
        self
    }

    /// The configured tax rate
    #[must_use]
    pub const fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Tax owed on a subtotal
    #[must_use]
    pub fn tax_for(&self, subtotal: Decimal) -> Decimal {
        subtotal * self.tax_rate
    }

    /// Shipping fee for a subtotal: flat, or zero at/above the threshold
    #[must_use]
    pub fn shipping_fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.shipping_fee
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::new()
    }
}
