//! Legacy weight encoding in the item note field
//!
//! Rows written before `weight`/`price_per_unit` became first-class
//! fields carry the weighed-sale parameters as note text of the form
//! `"0.500 kg x 39.90/kg"`, optionally followed by `" - <free text>"`.
//! Kept for hydrating old records only; new rows always use the
//! first-class fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Weighed-sale parameters recovered from a legacy note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeighedNote {
    pub weight: Decimal,
    pub price_per_kg: Decimal,
    /// Free text that followed the encoded prefix, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
}

/// Render the legacy note prefix for a weighed sale
pub fn format_weighed_note(weight: Decimal, price_per_kg: Decimal) -> String {
    format!("{} kg x {}/kg", weight, price_per_kg)
}

/// Parse a legacy weighed note; `None` when the text does not carry the
/// encoding or the encoded values are not usable
pub fn parse_weighed_note(note: &str) -> Option<WeighedNote> {
    let (head, rest) = match note.split_once(" - ") {
        Some((head, rest)) => (head.trim(), Some(rest.trim())),
        None => (note.trim(), None),
    };

    let (weight_part, price_part) = head.split_once(" kg x ")?;
    let price_part = price_part.strip_suffix("/kg")?;

    let weight = Decimal::from_str(weight_part.trim()).ok()?;
    let price_per_kg = Decimal::from_str(price_part.trim()).ok()?;
    if weight <= Decimal::ZERO || price_per_kg <= Decimal::ZERO {
        return None;
    }

    Some(WeighedNote {
        weight,
        price_per_kg,
        rest: rest.filter(|r| !r.is_empty()).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let note = format_weighed_note(d("0.500"), d("39.90"));
        assert_eq!(note, "0.500 kg x 39.90/kg");

        let parsed = parse_weighed_note(&note).unwrap();
        assert_eq!(parsed.weight, d("0.500"));
        assert_eq!(parsed.price_per_kg, d("39.90"));
        assert_eq!(parsed.rest, None);
    }

    #[test]
    fn test_parse_with_trailing_text() {
        let parsed = parse_weighed_note("0.340 kg x 12.50/kg - no sauce").unwrap();
        assert_eq!(parsed.weight, d("0.340"));
        assert_eq!(parsed.price_per_kg, d("12.50"));
        assert_eq!(parsed.rest.as_deref(), Some("no sauce"));
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert_eq!(parse_weighed_note("extra napkins please"), None);
    }

    #[test]
    fn test_parse_rejects_non_positive_values() {
        assert_eq!(parse_weighed_note("0 kg x 39.90/kg"), None);
        assert_eq!(parse_weighed_note("0.500 kg x 0/kg"), None);
    }

    #[test]
    fn test_parse_rejects_garbled_numbers() {
        assert_eq!(parse_weighed_note("abc kg x 39.90/kg"), None);
        assert_eq!(parse_weighed_note("0.500 kg x abc/kg"), None);
    }
}
