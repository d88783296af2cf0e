//! Domain errors
//!
//! Validation errors are raised synchronously at mutation boundaries and
//! leave state untouched. Gateway failures surface with the index of the
//! reconciliation step that failed; earlier steps are already applied
//! and are never compensated.

use crate::gateway::GatewayError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Invalid weight: {0}")]
    InvalidWeight(Decimal),

    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Extra {extra} exceeds max quantity {max}")]
    ExtraQuantityExceeded { extra: String, max: u32 },

    #[error("Product allows at most {max} distinct extras")]
    TooManyExtras { max: u32 },

    #[error("Inactive catalog entry: {0}")]
    InactiveSelection(String),

    #[error("Line not found: {0}")]
    LineNotFound(String),

    #[error("Order already completed: {0}")]
    OrderAlreadyCompleted(String),

    #[error("Order already voided: {0}")]
    OrderAlreadyVoided(String),

    #[error("An order must keep at least one line")]
    WouldEmptyOrder,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Failed to fetch order: {0}")]
    Fetch(#[source] GatewayError),

    #[error("Gateway call failed at step {op_index}: {source}")]
    Gateway {
        op_index: usize,
        #[source]
        source: GatewayError,
    },

    #[error("Order snapshot is stale: {0}")]
    InconsistentSnapshot(String),
}

pub type OrderResult<T> = Result<T, OrderError>;
