//! Order composition and reconciliation core
//!
//! The part of the ordering system with real algorithmic content:
//! deriving unit prices and stable identities for cart lines, and
//! reconciling an edited order against its persisted line items.
//!
//! # Module structure
//!
//! ```text
//! order-core/src/
//! ├── pricing      # unit/extended prices, totals, monetary bounds
//! ├── keying       # content-addressed line identity
//! ├── cart         # customer/staff cart draft (merge-or-append)
//! ├── draft        # edit session over a persisted order
//! ├── reconcile    # diff → ordered gateway operations → totals
//! ├── gateway/     # persistence gateway contract + in-memory impl
//! ├── scratchpad   # extras clipboard (injectable, scoped)
//! └── error        # domain error taxonomy
//! ```
//!
//! # Data flow
//!
//! 1. UI event mutates a [`CartDraft`] or [`OrderDraft`] (synchronous,
//!    validated at the boundary)
//! 2. New orders bulk-create through the gateway ([`reconcile::submit_cart`])
//! 3. Edited orders diff against the fetched snapshot
//!    ([`reconcile::plan`]) and execute as an ordered, non-transactional
//!    call sequence ([`reconcile::execute`])

pub mod cart;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod keying;
pub mod pricing;
pub mod reconcile;
pub mod scratchpad;

// Re-exports
pub use cart::CartDraft;
pub use draft::{DraftEntry, EntryId, OrderDraft};
pub use error::{OrderError, OrderResult};
pub use gateway::{GatewayError, GatewayResult, OrderGateway};
pub use reconcile::{CreateItemOp, GatewayOp, ReconcilePlan};
pub use scratchpad::ExtrasClipboard;
