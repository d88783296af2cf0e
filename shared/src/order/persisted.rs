//! Persisted order records and gateway payloads
//!
//! These are the shapes the external record store hands back and the
//! closed create/update payloads the gateway accepts. `subtotal` on a
//! persisted item is authoritative: for weighed items it bakes in the
//! weight and cannot be recomputed as price × quantity.

use super::line::{ExtraChoice, VarietyChoice};
use super::types::{OrderInfo, OrderStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order as fetched from the record store, items included
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedOrder {
    pub id: String,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub info: OrderInfo,
    /// Authoritative order total
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<PersistedOrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Persisted line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedOrderItem {
    pub id: String,
    /// Product reference; absent when the product left the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Name snapshot at sale time
    pub name: String,
    /// Unit price snapshot (price per kilogram for weighed items)
    pub price: Decimal,
    pub quantity: i32,
    /// Authoritative extended price
    pub subtotal: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety: Option<VarietyChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<PersistedOrderItemExtra>,
    /// Weight in kilograms; legacy rows encode this in `note` instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Persisted extra row belonging to a line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedOrderItemExtra {
    pub id: String,
    /// Owning item reference
    pub order_item: String,
    pub extra_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Insert payload for a line item (id assigned by the store)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety: Option<VarietyChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Insert payload for an extra row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemExtraCreate {
    /// Owning persisted item id
    pub order_item: String,
    pub extra_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItemExtraCreate {
    /// Build an insert row from a selection snapshot
    pub fn from_choice(order_item: impl Into<String>, choice: &ExtraChoice) -> Self {
        Self {
            order_item: order_item.into(),
            extra_id: choice.id.clone(),
            name: choice.name.clone(),
            price: choice.price,
            quantity: choice.quantity,
        }
    }
}

/// Partial update for a persisted line item
///
/// `None` fields are left untouched. The snapshot fields (`product_id`,
/// `price`, `variety`) are set together when the underlying product was
/// swapped; `replace_variety` makes clearing the variety expressible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Replacement variety; only applied when `replace_variety` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety: Option<VarietyChoice>,
    /// When true the stored variety is replaced by `variety`, clearing
    /// it if `variety` is absent
    #[serde(default)]
    pub replace_variety: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Partial update for the order row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<super::types::OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<super::types::PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<Decimal>,
}
