//! Product Model

use super::extra::Extra;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Base price; reinterpreted as price per kilogram when the product
    /// is sold by weight
    pub price: Decimal,
    /// Embedded size/version options
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub varieties: Vec<Variety>,
    /// Embedded add-ons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<Extra>,
    /// Max distinct extras per line (null = unconstrained)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_extras: Option<u32>,
    pub is_active: bool,
}

impl Product {
    /// Look up an embedded variety by id
    pub fn variety(&self, variety_id: &str) -> Option<&Variety> {
        self.varieties.iter().find(|v| v.id == variety_id)
    }

    /// Look up an embedded extra by id
    pub fn extra(&self, extra_id: &str) -> Option<&Extra> {
        self.extras.iter().find(|e| e.id == extra_id)
    }
}

/// Product variety entity
///
/// An absolute-priced option: when selected its price replaces the
/// product's base price instead of adding to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variety {
    pub id: String,
    /// Owning product reference
    pub product: String,
    pub name: String,
    pub price: Decimal,
    pub is_active: bool,
}
