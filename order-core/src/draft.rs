//! Order edit session
//!
//! An `OrderDraft` wraps a persisted order being edited: the working
//! entry list, order-level info, and the item snapshot fetched at
//! session start. Entries carry a tagged id — `Existing` with the
//! persisted row id, `New` with a locally generated temporary id — so
//! reconciliation partitions by pattern match, never by string sniffing.
//!
//! Existing entries also keep baselines (persisted subtotal, weight,
//! quantity): a weighed line whose weight was not touched must keep its
//! stored subtotal, which is not recomputable from price × quantity.

use crate::cart::{build_selection, build_weighed};
use crate::error::{OrderError, OrderResult};
use crate::gateway::OrderGateway;
use crate::keying;
use crate::pricing;
use crate::scratchpad::ExtrasClipboard;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::Product;
use shared::order::{
    CartLine, OrderInfo, OrderStatus, PersistedOrder, PersistedOrderItem, ProductRef,
    VarietyChoice, notes,
};
use tracing::{debug, warn};

/// Tagged identity of a working entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryId {
    /// Backed by a persisted row
    Existing { id: String },
    /// Created during this edit session
    New { temp_id: String },
}

impl EntryId {
    fn new_temp() -> Self {
        Self::New {
            temp_id: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn persisted_id(&self) -> Option<&str> {
        match self {
            Self::Existing { id } => Some(id),
            Self::New { .. } => None,
        }
    }
}

/// One working entry of an edit session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftEntry {
    pub id: EntryId,
    pub line: CartLine,
    /// Set when the underlying product was swapped while keeping the
    /// persisted row identity
    pub replaced: bool,
    pub(crate) persisted_subtotal: Option<Decimal>,
    pub(crate) baseline_weight: Option<Decimal>,
    pub(crate) baseline_quantity: Option<i32>,
}

impl DraftEntry {
    fn new_line(line: CartLine) -> Self {
        Self {
            id: EntryId::new_temp(),
            line,
            replaced: false,
            persisted_subtotal: None,
            baseline_weight: None,
            baseline_quantity: None,
        }
    }

    /// Authoritative subtotal for this entry.
    ///
    /// An untouched weighed entry keeps the persisted subtotal; anything
    /// else is recomputed from the line.
    pub fn subtotal(&self) -> Decimal {
        if let Some(persisted) = self.persisted_subtotal
            && self.line.is_weighed()
            && self.line.weight == self.baseline_weight
            && Some(self.line.quantity) == self.baseline_quantity
            && !self.replaced
        {
            return persisted;
        }
        pricing::extended_price(&self.line)
    }
}

/// Edit session over a persisted order
#[derive(Debug, Clone)]
pub struct OrderDraft {
    order_id: String,
    status: OrderStatus,
    /// Order-level fields, mutated directly by the editing screen
    pub info: OrderInfo,
    entries: Vec<DraftEntry>,
    original_items: Vec<PersistedOrderItem>,
    original_info: OrderInfo,
}

impl OrderDraft {
    /// Fetch an order through the gateway and open an edit session on it
    pub async fn load(order_id: &str, gateway: &dyn OrderGateway) -> OrderResult<Self> {
        let order = gateway
            .fetch_order_with_items(order_id)
            .await
            .map_err(OrderError::Fetch)?;
        Ok(Self::hydrate(order))
    }

    /// Open an edit session from an already-fetched order
    pub fn hydrate(order: PersistedOrder) -> Self {
        let entries = order.items.iter().map(entry_from_item).collect();
        Self {
            order_id: order.id,
            status: order.status,
            info: order.info.clone(),
            entries,
            original_items: order.items,
            original_info: order.info,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn entries(&self) -> &[DraftEntry] {
        &self.entries
    }

    /// The item snapshot fetched when the session opened
    pub fn original_items(&self) -> &[PersistedOrderItem] {
        &self.original_items
    }

    pub(crate) fn original_info(&self) -> &OrderInfo {
        &self.original_info
    }

    pub fn get(&self, line_key: &str) -> Option<&DraftEntry> {
        self.entries.iter().find(|e| e.line.line_key == line_key)
    }

    /// Working subtotal across all entries
    pub fn subtotal(&self) -> Decimal {
        pricing::round_money(self.entries.iter().map(DraftEntry::subtotal).sum())
    }

    /// Add a catalog selection; merges into any quantity-priced entry
    /// with the same content key, existing or new. Returns the line key.
    pub fn add_selection(
        &mut self,
        product: &Product,
        variety_id: Option<&str>,
        extras: &[(&str, u32)],
        quantity: i32,
    ) -> OrderResult<String> {
        pricing::require_quantity(quantity)?;
        let (product_ref, variety, extra_choices) =
            build_selection(product, variety_id, extras)?;
        let key = keying::line_key(
            &product_ref.id,
            variety.as_ref().map(|v| v.id.as_str()),
            &extra_choices,
        );

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| !e.line.is_weighed() && e.line.line_key == key)
        {
            let merged = entry.line.quantity + quantity;
            pricing::require_quantity(merged)?;
            entry.line.quantity = merged;
            entry.line.product = product_ref;
            entry.line.variety = variety;
            entry.line.extras = extra_choices;
            debug!(line_key = %key, quantity = merged, "merged selection into draft entry");
            return Ok(key);
        }

        self.entries.push(DraftEntry::new_line(CartLine {
            line_key: key.clone(),
            product: product_ref,
            variety,
            extras: extra_choices,
            quantity,
            weight: None,
            note: None,
        }));
        Ok(key)
    }

    /// Add a weighed sale as a new entry. Returns the line key.
    pub fn add_weighed_item(
        &mut self,
        product: &Product,
        weight_kg: Decimal,
        price_per_kg: Decimal,
        description: &str,
    ) -> OrderResult<String> {
        let product_ref = build_weighed(product, weight_kg, price_per_kg, description)?;
        let key = keying::unique_line_key();
        self.entries.push(DraftEntry::new_line(CartLine {
            line_key: key.clone(),
            product: product_ref,
            variety: None,
            extras: vec![],
            quantity: 1,
            weight: Some(weight_kg),
            note: None,
        }));
        Ok(key)
    }

    /// Set an entry's quantity; 0 removes the entry
    pub fn set_quantity(&mut self, line_key: &str, quantity: i32) -> OrderResult<()> {
        if quantity < 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        let idx = self.position(line_key)?;
        if quantity == 0 {
            self.entries.remove(idx);
            return Ok(());
        }
        let entry = &mut self.entries[idx];
        if entry.line.is_weighed() {
            return Err(OrderError::InvalidOperation(
                "quantity is fixed at 1 for weighed lines".to_string(),
            ));
        }
        pricing::require_quantity(quantity)?;
        entry.line.quantity = quantity;
        Ok(())
    }

    /// Re-weigh a weighed entry; its subtotal is recomputed from here on
    pub fn set_weight(&mut self, line_key: &str, weight_kg: Decimal) -> OrderResult<()> {
        if weight_kg <= Decimal::ZERO {
            return Err(OrderError::InvalidWeight(weight_kg));
        }
        let idx = self.position(line_key)?;
        let entry = &mut self.entries[idx];
        if !entry.line.is_weighed() {
            return Err(OrderError::InvalidOperation(
                "line is not weight-priced".to_string(),
            ));
        }
        entry.line.weight = Some(weight_kg);
        Ok(())
    }

    /// Remove an entry
    pub fn remove_line(&mut self, line_key: &str) -> OrderResult<()> {
        let idx = self.position(line_key)?;
        self.entries.remove(idx);
        Ok(())
    }

    /// Set an entry's free-text note
    pub fn set_line_note(&mut self, line_key: &str, note: Option<String>) -> OrderResult<()> {
        let idx = self.position(line_key)?;
        self.entries[idx].line.note = note;
        Ok(())
    }

    /// Swap the underlying product of an entry while keeping its
    /// identity. An existing entry is tagged replaced: its persisted
    /// extras no longer correlate to the new product, so reconciliation
    /// rewrites its snapshot fields and fully replaces its extras.
    pub fn replace_product(
        &mut self,
        line_key: &str,
        product: &Product,
        variety_id: Option<&str>,
        extras: &[(&str, u32)],
    ) -> OrderResult<String> {
        let idx = self.position(line_key)?;
        let (product_ref, variety, extra_choices) =
            build_selection(product, variety_id, extras)?;
        let key = keying::line_key(
            &product_ref.id,
            variety.as_ref().map(|v| v.id.as_str()),
            &extra_choices,
        );

        let entry = &mut self.entries[idx];
        entry.line.product = product_ref;
        entry.line.variety = variety;
        entry.line.extras = extra_choices;
        entry.line.weight = None;
        entry.line.line_key = key.clone();
        if entry.id.persisted_id().is_some() {
            entry.replaced = true;
        }
        debug!(line_key = %key, replaced = entry.replaced, "replaced entry product");
        Ok(key)
    }

    /// Copy an entry's extras into a clipboard slot
    pub fn copy_extras(
        &self,
        line_key: &str,
        clipboard: &ExtrasClipboard,
        slot: &str,
    ) -> OrderResult<()> {
        let entry = self
            .get(line_key)
            .ok_or_else(|| OrderError::LineNotFound(line_key.to_string()))?;
        clipboard.store(slot, entry.line.extras.clone());
        Ok(())
    }

    /// Apply a clipboard slot's extras to an entry, re-validating the
    /// quantities and prices against the target product's catalog data
    pub fn paste_extras(
        &mut self,
        line_key: &str,
        clipboard: &ExtrasClipboard,
        slot: &str,
        product: &Product,
    ) -> OrderResult<String> {
        let recalled = clipboard
            .recall(slot)
            .ok_or_else(|| OrderError::InvalidOperation(format!("empty clipboard slot {slot}")))?;
        let idx = self.position(line_key)?;
        if self.entries[idx].line.product.id != product.id {
            return Err(OrderError::InvalidOperation(
                "clipboard target product mismatch".to_string(),
            ));
        }
        if self.entries[idx].line.is_weighed() {
            return Err(OrderError::InvalidOperation(
                "weighed lines carry no extras".to_string(),
            ));
        }

        let pairs: Vec<(&str, u32)> = recalled
            .iter()
            .map(|c| (c.id.as_str(), c.quantity))
            .collect();
        let variety_id = self.entries[idx].line.variety.as_ref().map(|v| v.id.clone());
        let (_, _, extra_choices) = build_selection(product, variety_id.as_deref(), &pairs)?;
        let key = keying::line_key(&product.id, variety_id.as_deref(), &extra_choices);

        let entry = &mut self.entries[idx];
        entry.line.extras = extra_choices;
        entry.line.line_key = key.clone();
        Ok(key)
    }

    fn position(&self, line_key: &str) -> OrderResult<usize> {
        self.entries
            .iter()
            .position(|e| e.line.line_key == line_key)
            .ok_or_else(|| OrderError::LineNotFound(line_key.to_string()))
    }
}

/// Rebuild a working entry from a persisted row.
///
/// Weight comes from the first-class fields when present; legacy rows
/// fall back to the note-encoded parameters.
fn entry_from_item(item: &PersistedOrderItem) -> DraftEntry {
    let (weight, price_per_kg, note) = resolve_weight(item);

    let variety: Option<VarietyChoice> = item.variety.clone();
    let extras: Vec<_> = item
        .extras
        .iter()
        .map(|e| shared::order::ExtraChoice {
            id: e.extra_id.clone(),
            name: e.name.clone(),
            price: e.price,
            quantity: e.quantity,
        })
        .collect();

    let line_key = match (&item.product_id, weight) {
        // Weighed rows and orphaned snapshots never merge
        (_, Some(_)) | (None, None) => keying::unique_line_key(),
        (Some(product_id), None) => keying::line_key(
            product_id,
            variety.as_ref().map(|v| v.id.as_str()),
            &extras,
        ),
    };

    let line = CartLine {
        line_key,
        product: ProductRef {
            id: item.product_id.clone().unwrap_or_default(),
            name: item.name.clone(),
            price: price_per_kg.unwrap_or(item.price),
        },
        variety,
        extras,
        quantity: if weight.is_some() { 1 } else { item.quantity },
        weight,
        note,
    };

    DraftEntry {
        id: EntryId::Existing {
            id: item.id.clone(),
        },
        line,
        replaced: false,
        persisted_subtotal: Some(item.subtotal),
        baseline_weight: weight,
        baseline_quantity: Some(if weight.is_some() { 1 } else { item.quantity }),
    }
}

/// Recover (weight, price_per_kg, display note) from a persisted row
fn resolve_weight(
    item: &PersistedOrderItem,
) -> (Option<Decimal>, Option<Decimal>, Option<String>) {
    if let Some(weight) = item.weight {
        let price_per_kg = item.price_per_unit.unwrap_or(item.price);
        return (Some(weight), Some(price_per_kg), item.note.clone());
    }
    if let Some(note) = &item.note
        && let Some(parsed) = notes::parse_weighed_note(note)
    {
        warn!(item_id = %item.id, "recovered weighed-sale parameters from legacy note");
        return (Some(parsed.weight), Some(parsed.price_per_kg), parsed.rest);
    }
    (None, None, item.note.clone())
}
