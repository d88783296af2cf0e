//! Line identity
//!
//! Two selections with the same product, variety and extras must collapse
//! into one cart line, so the key is a content-addressed hash with the
//! extras sorted by id before hashing — toggling extras in a different
//! order on screen yields the same key. Weighed lines always receive a
//! fresh unique key: two visually identical weighed entries are distinct
//! sales and must never merge.

use sha2::{Digest, Sha256};
use shared::order::ExtraChoice;

/// Hashed in place of a variety id when none is selected
const NO_VARIETY: &[u8] = b"-";

/// Derive the content key for a quantity-priced line
pub fn line_key(product_id: &str, variety_id: Option<&str>, extras: &[ExtraChoice]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(product_id.as_bytes());
    hasher.update([0u8]);
    match variety_id {
        Some(variety) => hasher.update(variety.as_bytes()),
        None => hasher.update(NO_VARIETY),
    }
    hasher.update([0u8]);

    // Canonical order: sort by extra id so selection order is irrelevant
    let mut sorted: Vec<(&str, u32)> = extras
        .iter()
        .map(|e| (e.id.as_str(), e.quantity))
        .collect();
    sorted.sort_unstable();

    for (extra_id, quantity) in sorted {
        hasher.update(extra_id.as_bytes());
        hasher.update(quantity.to_be_bytes());
        hasher.update([0u8]);
    }

    let digest = hasher.finalize();
    hex::encode(&digest[..16]) // First 16 bytes keep the key short
}

/// Fresh key for lines that must never merge: weighed lines, and
/// hydrated rows whose product left the catalog
pub fn unique_line_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
