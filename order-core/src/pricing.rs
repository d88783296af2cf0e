//! Pricing engine
//!
//! Pure price computation over cart lines, using `rust_decimal` for
//! precision. Stored monetary amounts round to 2 decimal places, half
//! away from zero.

use crate::error::{OrderError, OrderResult};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::order::CartLine;

/// Rounding for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price
pub(crate) const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Maximum allowed quantity per line
pub(crate) const MAX_QUANTITY: i32 = 9999;

/// Round a monetary amount for storage
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Per-unit price of a line
///
/// Weighed lines reinterpret the product price as price per kilogram and
/// carry no extras. Otherwise the variety price replaces the base price
/// and each extra adds price × quantity.
pub fn unit_price(line: &CartLine) -> Decimal {
    if line.is_weighed() {
        return line.product.price;
    }

    let base = line
        .variety
        .as_ref()
        .map(|v| v.price)
        .unwrap_or(line.product.price);
    let extras: Decimal = line
        .extras
        .iter()
        .map(|e| e.price * Decimal::from(e.quantity))
        .sum();

    base + extras
}

/// Extended (line-total) price: unit × weight for weighed lines,
/// unit × quantity otherwise
pub fn extended_price(line: &CartLine) -> Decimal {
    let total = match line.weight {
        Some(weight) => unit_price(line) * weight,
        None => unit_price(line) * Decimal::from(line.quantity),
    };
    round_money(total)
}

/// Sum of extended prices plus the delivery fee
pub fn order_total<'a, I>(lines: I, delivery_fee: Decimal) -> Decimal
where
    I: IntoIterator<Item = &'a CartLine>,
{
    let subtotal: Decimal = lines.into_iter().map(extended_price).sum();
    round_money(subtotal + delivery_fee)
}

/// Reject negative or absurdly large prices at the mutation boundary
pub(crate) fn require_price(value: Decimal) -> OrderResult<()> {
    if value < Decimal::ZERO || value > MAX_PRICE {
        return Err(OrderError::InvalidPrice(value));
    }
    Ok(())
}

/// Reject non-positive or absurdly large quantities
pub(crate) fn require_quantity(value: i32) -> OrderResult<()> {
    if value <= 0 || value > MAX_QUANTITY {
        return Err(OrderError::InvalidQuantity(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{ExtraChoice, ProductRef, VarietyChoice};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn plain_line(price: &str, quantity: i32) -> CartLine {
        CartLine {
            line_key: "k1".to_string(),
            product: ProductRef {
                id: "p-1".to_string(),
                name: "Item".to_string(),
                price: d(price),
            },
            variety: None,
            extras: vec![],
            quantity,
            weight: None,
            note: None,
        }
    }

    #[test]
    fn test_unit_price_base_only() {
        assert_eq!(unit_price(&plain_line("20.00", 1)), d("20.00"));
    }

    #[test]
    fn test_unit_price_variety_replaces_base() {
        let mut line = plain_line("20.00", 1);
        line.variety = Some(VarietyChoice {
            id: "v-large".to_string(),
            name: "Large".to_string(),
            price: d("25.00"),
        });
        line.extras = vec![ExtraChoice {
            id: "e-bacon".to_string(),
            name: "Bacon".to_string(),
            price: d("3.00"),
            quantity: 1,
        }];

        // Variety price replaces the base, extras add on top
        assert_eq!(unit_price(&line), d("28.00"));
        assert_eq!(extended_price(&line), d("28.00"));
    }

    #[test]
    fn test_unit_price_extras_scale_by_quantity() {
        let mut line = plain_line("10.00", 1);
        line.extras = vec![
            ExtraChoice {
                id: "e-1".to_string(),
                name: "A".to_string(),
                price: d("3.00"),
                quantity: 2,
            },
            ExtraChoice {
                id: "e-2".to_string(),
                name: "B".to_string(),
                price: d("1.50"),
                quantity: 1,
            },
        ];

        assert_eq!(unit_price(&line), d("17.50"));
    }

    #[test]
    fn test_extended_price_scales_by_quantity() {
        assert_eq!(extended_price(&plain_line("10.99", 3)), d("32.97"));
    }

    #[test]
    fn test_weighed_line_ignores_quantity() {
        let mut line = plain_line("12.50", 1);
        line.weight = Some(d("0.340"));

        assert_eq!(unit_price(&line), d("12.50"));
        assert_eq!(extended_price(&line), d("4.25"));

        // Quantity has no effect on a weighed line
        line.quantity = 7;
        assert_eq!(extended_price(&line), d("4.25"));
    }

    #[test]
    fn test_weighed_line_half_kilo() {
        let mut line = plain_line("39.90", 1);
        line.weight = Some(d("0.500"));
        assert_eq!(extended_price(&line), d("19.95"));
    }

    #[test]
    fn test_order_total_with_delivery_fee() {
        let lines = [plain_line("10.00", 2), plain_line("5.50", 1)];
        assert_eq!(order_total(&lines, d("3.00")), d("28.50"));
        assert_eq!(order_total(&lines, Decimal::ZERO), d("25.50"));
    }

    #[test]
    fn test_require_price_bounds() {
        assert!(require_price(Decimal::ZERO).is_ok());
        assert!(require_price(d("99.99")).is_ok());
        assert!(require_price(d("-0.01")).is_err());
        assert!(require_price(MAX_PRICE + Decimal::ONE).is_err());
    }

    #[test]
    fn test_require_quantity_bounds() {
        assert!(require_quantity(1).is_ok());
        assert!(require_quantity(MAX_QUANTITY).is_ok());
        assert!(require_quantity(0).is_err());
        assert!(require_quantity(-1).is_err());
        assert!(require_quantity(MAX_QUANTITY + 1).is_err());
    }
}
