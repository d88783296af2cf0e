//! Order and line shapes
//!
//! The central `CartLine` shape shared by the customer cart, staff order
//! entry, and staff order editing; the persisted records read back from
//! the external store; and the closed partial-update payloads the
//! persistence gateway consumes.

pub mod line;
pub mod notes;
pub mod persisted;
pub mod types;

// Re-exports
pub use line::{CartLine, ExtraChoice, ProductRef, VarietyChoice};
pub use notes::{WeighedNote, format_weighed_note, parse_weighed_note};
pub use persisted::{
    OrderItemCreate, OrderItemExtraCreate, OrderItemUpdate, OrderUpdate, PersistedOrder,
    PersistedOrderItem, PersistedOrderItemExtra,
};
pub use types::{OrderInfo, OrderStatus, OrderType, PaymentMethod};
