//! Cart line shapes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only product snapshot captured at selection time
///
/// For weighed lines `name` holds the free-text description and `price`
/// holds the price per kilogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

/// Selected variety snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VarietyChoice {
    pub id: String,
    pub name: String,
    /// Absolute price; replaces the product base price
    pub price: Decimal,
}

/// Selected extra with quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraChoice {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// One cart/order entry
///
/// `line_key` is assigned at construction: a content-addressed hash of
/// product + variety + extras for quantity-priced lines, a fresh unique
/// id for weighed lines (which never merge).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub line_key: String,
    pub product: ProductRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety: Option<VarietyChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ExtraChoice>,
    pub quantity: i32,
    /// Weight in kilograms; present means the line is weight-priced and
    /// `product.price` is a price per kilogram
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CartLine {
    pub fn is_weighed(&self) -> bool {
        self.weight.is_some()
    }
}
