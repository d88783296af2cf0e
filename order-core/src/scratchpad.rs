//! Extras clipboard
//!
//! Staff screens let an operator copy one line's extras onto another.
//! The bucket is constructed by whoever owns the edit flow and passed
//! in explicitly; its lifetime is that owner's, never the process's.

use dashmap::DashMap;
use shared::order::ExtraChoice;

/// Slot-keyed store of copied extras
#[derive(Debug, Default)]
pub struct ExtrasClipboard {
    slots: DashMap<String, Vec<ExtraChoice>>,
}

impl ExtrasClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copied extras set under a slot, replacing prior contents
    pub fn store(&self, slot: impl Into<String>, extras: Vec<ExtraChoice>) {
        self.slots.insert(slot.into(), extras);
    }

    /// Read a slot's extras without consuming them
    pub fn recall(&self, slot: &str) -> Option<Vec<ExtraChoice>> {
        self.slots.get(slot).map(|e| e.value().clone())
    }

    pub fn clear(&self, slot: &str) {
        self.slots.remove(slot);
    }
}
