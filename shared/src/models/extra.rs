//! Extra (add-on) Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Extra entity — an additive add-on priced per unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extra {
    pub id: String,
    /// Owning product reference
    pub product: String,
    pub name: String,
    /// Price per unit of the extra
    pub price: Decimal,
    /// Max units of this extra on a single line
    pub max_quantity: u32,
    pub is_active: bool,
}
