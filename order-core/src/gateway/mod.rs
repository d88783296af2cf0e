//! Persistence gateway contract
//!
//! The core is storage-agnostic: it consumes this trait and an external
//! record store implements it. Calls are individual and independent —
//! the contract promises no atomicity across them, and the engine does
//! not assume any (see the reconcile module).

use async_trait::async_trait;
use shared::order::{
    OrderItemCreate, OrderItemExtraCreate, OrderItemUpdate, OrderUpdate, PersistedOrder,
    PersistedOrderItem,
};
use thiserror::Error;

pub mod memory;

pub use memory::InMemoryGateway;

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// External record store for orders, line items, and line-item extras
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Bulk-insert line items; each created row echoes its assigned id
    async fn create_order_items(
        &self,
        order_id: &str,
        items: Vec<OrderItemCreate>,
    ) -> GatewayResult<Vec<PersistedOrderItem>>;

    /// Bulk-insert extra rows
    async fn create_order_item_extras(
        &self,
        extras: Vec<OrderItemExtraCreate>,
    ) -> GatewayResult<()>;

    /// Delete every extra row belonging to the given items. Items with
    /// no extras are a no-op, not an error.
    async fn delete_order_item_extras(&self, order_item_ids: &[String]) -> GatewayResult<()>;

    /// Delete line items by id
    async fn delete_order_items(&self, ids: &[String]) -> GatewayResult<()>;

    /// Apply a partial update to one line item
    async fn update_order_item(&self, id: &str, fields: OrderItemUpdate) -> GatewayResult<()>;

    /// Apply a partial update to the order row
    async fn update_order(&self, order_id: &str, fields: OrderUpdate) -> GatewayResult<()>;

    /// Fetch an order with its items and their extras
    async fn fetch_order_with_items(&self, order_id: &str) -> GatewayResult<PersistedOrder>;
}
