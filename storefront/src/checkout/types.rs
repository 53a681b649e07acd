//! Checkout state machine types and the immutable order record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use storefront_core::environment::IdGenerator;

use crate::cart::CartSnapshot;

/// A postal address. All fields are required before the wizard advances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient's full name
    pub name: String,
    /// Street address
    pub street: String,
    /// City
    pub city: String,
    /// State or province
    pub state: String,
    /// Postal code
    pub zip: String,
    /// Country
    pub country: String,
}

impl Address {
    /// Whether every field is filled in
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let fields = [
            &self.name,
            &self.street,
            &self.city,
            &self.state,
            &self.zip,
            &self.country,
        ];
        fields.iter().all(|field| !field.trim().is_empty())
    }
}

/// Where the shopper is in the wizard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Collecting shipping and billing addresses
    #[default]
    Address,
    /// Choosing a shipping method
    ShippingMethod,
    /// Choosing a payment method and submitting
    Payment,
    /// The order has been accepted
    Submitted,
}

impl CheckoutStep {
    /// One-based step number for display
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Address => 1,
            Self::ShippingMethod => 2,
            Self::Payment => 3,
            Self::Submitted => 4,
        }
    }
}

/// How the order ships
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShippingMethod {
    /// Five to seven business days
    #[default]
    Standard,
    /// One to two business days
    Express,
}

impl ShippingMethod {
    /// The method's flat fee
    #[must_use]
    pub fn fee(self) -> Decimal {
        match self {
            Self::Standard => Decimal::new(10, 0),
            Self::Express => Decimal::new(20, 0),
        }
    }
}

/// How the shopper pays
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Credit or debit card
    #[default]
    CreditCard,
    /// `PayPal` account
    PayPal,
}

/// Unique order identifier with an `ORD-` prefix
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Mint a fresh order id from the environment's generator
    #[must_use]
    pub fn generate(ids: &dyn IdGenerator) -> Self {
        Self(format!("ORD-{}", ids.next_id()))
    }

    /// The id as a string, including the prefix
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The immutable record produced when checkout submits.
///
/// Freezes the cart snapshot's amounts at submission time; the chosen
/// shipping method is recorded but its fee is informational, the charged
/// shipping fee comes from the cart's own shipping rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: OrderId,
    /// The cart contents and amounts at submission time
    pub snapshot: CartSnapshot,
    /// Where the order ships
    pub shipping_address: Address,
    /// Who is billed; equals the shipping address when reuse was chosen
    pub billing_address: Address,
    /// The selected shipping method
    pub shipping_method: ShippingMethod,
    /// The selected payment method
    pub payment_method: PaymentMethod,
    /// Free-form delivery notes
    pub notes: String,
    /// When the order was submitted
    pub created_at: DateTime<Utc>,
}

/// The wizard's mutable state. Created fresh on entry, discarded on exit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckoutState {
    /// Current wizard step
    pub step: CheckoutStep,
    /// Shipping address under construction
    pub shipping_address: Address,
    /// Billing address under construction; mirrors shipping while
    /// `same_as_shipping` holds
    pub billing_address: Address,
    /// Reuse the shipping address for billing
    pub same_as_shipping: bool,
    /// Chosen shipping method
    pub shipping_method: ShippingMethod,
    /// Chosen payment method
    pub payment_method: PaymentMethod,
    /// Free-form delivery notes
    pub notes: String,
    /// A submission is in flight
    pub submitting: bool,
    /// The most recent validation or submission failure, cleared on the
    /// next successful transition
    pub last_error: Option<String>,
    /// The accepted order, once submitted
    pub last_order: Option<Order>,
}

impl CheckoutState {
    /// A fresh wizard at the address step with billing mirroring shipping
    #[must_use]
    pub fn new() -> Self {
        Self {
            same_as_shipping: true,
            ..Self::default()
        }
    }

    /// The billing address that would go on an order right now
    #[must_use]
    pub fn effective_billing(&self) -> &Address {
        if self.same_as_shipping {
            &self.shipping_address
        } else {
            &self.billing_address
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_testing::SequentialIds;

    fn complete_address() -> Address {
        Address {
            name: "May Fung".to_string(),
            street: "1 Harbor Rd".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn address_requires_every_field() {
        let mut address = complete_address();
        assert!(address.is_complete());
        address.zip = "   ".to_string();
        assert!(!address.is_complete());
    }

    #[test]
    fn order_ids_carry_the_prefix() {
        let ids = SequentialIds::new();
        assert_eq!(OrderId::generate(&ids).as_str(), "ORD-id-1");
        assert_eq!(OrderId::generate(&ids).as_str(), "ORD-id-2");
    }

    #[test]
    fn fresh_checkout_mirrors_billing() {
        let mut checkout = CheckoutState::new();
        assert!(checkout.same_as_shipping);
        checkout.shipping_address = complete_address();
        assert_eq!(checkout.effective_billing(), &checkout.shipping_address);
    }

    #[test]
    fn shipping_method_fees() {
        assert_eq!(ShippingMethod::Standard.fee(), Decimal::new(10, 0));
        assert_eq!(ShippingMethod::Express.fee(), Decimal::new(20, 0));
    }
}
