//! Shared types for the ordering core
//!
//! Data shapes used across the workspace: catalog models (products,
//! varieties, extras), cart/order line shapes, persisted order records,
//! and the partial-update payloads consumed by the persistence gateway.

pub mod models;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};
