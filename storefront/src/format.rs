//! Display formatting for monetary amounts.

use rust_decimal::Decimal;

/// Format an amount as a dollar string with two decimal places
///
/// Amounts with more precision than cents (tax, for example) are rounded
/// half-up for display only; stored values keep full precision.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    format!("${rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_dollars_with_cents() {
        assert_eq!(format_currency(Decimal::new(49, 0)), "$49.00");
    }

    #[test]
    fn formats_cents() {
        assert_eq!(format_currency(Decimal::new(5999, 2)), "$59.99");
    }

    #[test]
    fn rounds_sub_cent_precision_for_display() {
        assert_eq!(format_currency(Decimal::new(191_976, 4)), "$19.20");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    }
}
