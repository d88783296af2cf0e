//! Reconciliation engine
//!
//! Diffs an edit session's working entries against the order's persisted
//! items and produces the ordered operation batch to bring the store in
//! line, plus the new authoritative total. Planning is pure; execution
//! awaits each gateway call sequentially with no transaction, no retry,
//! and no compensation — a failure partway through leaves the persisted
//! order mixing old and new line items, and the error reports how far
//! the sequence got.

use crate::cart::CartDraft;
use crate::draft::{DraftEntry, OrderDraft};
use crate::error::{OrderError, OrderResult};
use crate::gateway::{GatewayError, OrderGateway};
use crate::pricing;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::order::{
    CartLine, ExtraChoice, OrderInfo, OrderItemCreate, OrderItemExtraCreate, OrderItemUpdate,
    OrderStatus, OrderType, OrderUpdate, PersistedOrderItem,
};
use std::collections::HashSet;
use tracing::{debug, error};

/// A line item to insert, with the extra rows that follow once the
/// store echoes the assigned item id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateItemOp {
    pub item: OrderItemCreate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ExtraChoice>,
}

/// One step of the reconciliation batch
///
/// Steps execute in list order. A future gateway implementation may
/// consume the whole batch inside a real transaction; the engine assumes
/// nothing either way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayOp {
    /// Clear the extras of every item about to be deleted
    DeleteItemExtras { order_item_ids: Vec<String> },
    DeleteItems { ids: Vec<String> },
    /// Bulk-create new items, then their extra rows
    CreateItems { items: Vec<CreateItemOp> },
    /// Unconditional field update; `replace_extras` rewrites the item's
    /// extras wholesale (set for replaced entries)
    UpdateItem {
        id: String,
        update: OrderItemUpdate,
        #[serde(skip_serializing_if = "Option::is_none")]
        replace_extras: Option<Vec<ExtraChoice>>,
    },
    UpdateOrder { update: OrderUpdate },
}

/// Ordered reconciliation batch plus the total it establishes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconcilePlan {
    pub order_id: String,
    pub ops: Vec<GatewayOp>,
    /// Authoritative order total carried by the final order update
    pub total: Decimal,
}

/// Compute the reconciliation batch for an edit session.
///
/// Pure and synchronous; refuses to plan an empty working set (deleting
/// every line means deleting the order, which is a different operation)
/// or an order that is no longer active.
pub fn plan(draft: &OrderDraft) -> OrderResult<ReconcilePlan> {
    match draft.status() {
        OrderStatus::Completed => {
            return Err(OrderError::OrderAlreadyCompleted(draft.order_id().to_string()));
        }
        OrderStatus::Void => {
            return Err(OrderError::OrderAlreadyVoided(draft.order_id().to_string()));
        }
        OrderStatus::Active => {}
    }
    if draft.entries().is_empty() {
        return Err(OrderError::WouldEmptyOrder);
    }

    let kept: HashSet<&str> = draft
        .entries()
        .iter()
        .filter_map(|e| e.id.persisted_id())
        .collect();
    let to_delete: Vec<String> = draft
        .original_items()
        .iter()
        .map(|i| i.id.clone())
        .filter(|id| !kept.contains(id.as_str()))
        .collect();

    let mut ops = Vec::new();
    if !to_delete.is_empty() {
        ops.push(GatewayOp::DeleteItemExtras {
            order_item_ids: to_delete.clone(),
        });
        ops.push(GatewayOp::DeleteItems { ids: to_delete });
    }

    let creates: Vec<CreateItemOp> = draft
        .entries()
        .iter()
        .filter(|e| e.id.persisted_id().is_none())
        .map(|e| CreateItemOp {
            item: item_create_for(&e.line, e.subtotal()),
            extras: e.line.extras.clone(),
        })
        .collect();
    if !creates.is_empty() {
        ops.push(GatewayOp::CreateItems { items: creates });
    }

    for entry in draft.entries() {
        let Some(id) = entry.id.persisted_id() else {
            continue;
        };
        ops.push(GatewayOp::UpdateItem {
            id: id.to_string(),
            update: item_update_for(entry),
            replace_extras: entry.replaced.then(|| entry.line.extras.clone()),
        });
    }

    let subtotal: Decimal = draft.entries().iter().map(DraftEntry::subtotal).sum();
    let delivery_fee = if draft.info.order_type == OrderType::Delivery {
        draft.info.delivery_fee
    } else {
        Decimal::ZERO
    };
    let total = pricing::round_money(subtotal + delivery_fee);
    ops.push(GatewayOp::UpdateOrder {
        update: order_update_for(draft, total),
    });

    debug!(
        order_id = %draft.order_id(),
        ops = ops.len(),
        total = %total,
        "planned reconciliation batch"
    );
    Ok(ReconcilePlan {
        order_id: draft.order_id().to_string(),
        ops,
        total,
    })
}

/// Execute a batch sequentially. The first failing step aborts the run;
/// steps before it remain applied.
pub async fn execute(plan: &ReconcilePlan, gateway: &dyn OrderGateway) -> OrderResult<()> {
    for (op_index, op) in plan.ops.iter().enumerate() {
        if let Err(source) = run_op(&plan.order_id, op, gateway).await {
            error!(
                order_id = %plan.order_id,
                op_index,
                error = %source,
                "reconciliation stopped mid-sequence"
            );
            return Err(OrderError::Gateway { op_index, source });
        }
    }
    Ok(())
}

/// Plan and execute in one call, returning the executed plan
pub async fn reconcile(
    draft: &OrderDraft,
    gateway: &dyn OrderGateway,
) -> OrderResult<ReconcilePlan> {
    let plan = plan(draft)?;
    execute(&plan, gateway).await?;
    Ok(plan)
}

/// Plan the new-order path: bulk-create every cart line under an order
/// row created elsewhere, then set the order's total and metadata.
pub fn plan_new_order(
    cart: &CartDraft,
    order_id: &str,
    info: &OrderInfo,
) -> OrderResult<ReconcilePlan> {
    if cart.is_empty() {
        return Err(OrderError::WouldEmptyOrder);
    }

    let items: Vec<CreateItemOp> = cart
        .lines()
        .iter()
        .map(|line| CreateItemOp {
            item: item_create_for(line, pricing::extended_price(line)),
            extras: line.extras.clone(),
        })
        .collect();

    let delivery_fee = if info.order_type == OrderType::Delivery {
        info.delivery_fee
    } else {
        Decimal::ZERO
    };
    let total = pricing::order_total(cart.lines(), delivery_fee);

    let ops = vec![
        GatewayOp::CreateItems { items },
        GatewayOp::UpdateOrder {
            update: OrderUpdate {
                total: Some(total),
                order_type: Some(info.order_type),
                table: info.table.clone(),
                customer_name: info.customer_name.clone(),
                customer_phone: info.customer_phone.clone(),
                delivery_address: info.delivery_address.clone(),
                payment_method: Some(info.payment_method),
                note: info.note.clone(),
                delivery_fee: Some(info.delivery_fee),
                status: None,
            },
        },
    ];

    Ok(ReconcilePlan {
        order_id: order_id.to_string(),
        ops,
        total,
    })
}

/// Submit a cart as a new order, returning the stored total
pub async fn submit_cart(
    cart: &CartDraft,
    order_id: &str,
    info: &OrderInfo,
    gateway: &dyn OrderGateway,
) -> OrderResult<Decimal> {
    let plan = plan_new_order(cart, order_id, info)?;
    execute(&plan, gateway).await?;
    Ok(plan.total)
}

/// Compare the edit session's fetched snapshot against a re-fetched item
/// list. A mismatch means another writer touched the order after the
/// session opened, and a plan built from the stale snapshot would diff
/// incorrectly.
pub fn verify_snapshot(
    original: &[PersistedOrderItem],
    refetched: &[PersistedOrderItem],
) -> OrderResult<()> {
    if original.len() != refetched.len() {
        return Err(OrderError::InconsistentSnapshot(format!(
            "item count changed from {} to {}",
            original.len(),
            refetched.len()
        )));
    }
    for item in original {
        let Some(current) = refetched.iter().find(|r| r.id == item.id) else {
            return Err(OrderError::InconsistentSnapshot(format!(
                "item {} disappeared",
                item.id
            )));
        };
        if current.quantity != item.quantity || current.subtotal != item.subtotal {
            return Err(OrderError::InconsistentSnapshot(format!(
                "item {} was modified",
                item.id
            )));
        }
    }
    Ok(())
}

/// Base-price snapshot stored in the item's `price` column: the variety
/// price when one is selected, else the product price (price per
/// kilogram for weighed lines). Extras live in their own rows.
fn base_price(line: &CartLine) -> Decimal {
    line.variety
        .as_ref()
        .map(|v| v.price)
        .unwrap_or(line.product.price)
}

fn item_create_for(line: &CartLine, subtotal: Decimal) -> OrderItemCreate {
    OrderItemCreate {
        product_id: (!line.product.id.is_empty()).then(|| line.product.id.clone()),
        name: line.product.name.clone(),
        price: base_price(line),
        quantity: line.quantity,
        subtotal,
        variety: line.variety.clone(),
        weight: line.weight,
        price_per_unit: line.weight.is_some().then_some(line.product.price),
        note: line.note.clone(),
    }
}

fn item_update_for(entry: &DraftEntry) -> OrderItemUpdate {
    let line = &entry.line;
    let mut update = OrderItemUpdate {
        name: Some(line.product.name.clone()),
        quantity: Some(line.quantity),
        subtotal: Some(entry.subtotal()),
        ..OrderItemUpdate::default()
    };
    if entry.replaced {
        update.product_id = Some(line.product.id.clone());
        update.price = Some(base_price(line));
        update.variety = line.variety.clone();
        update.replace_variety = true;
    }
    if let Some(weight) = line.weight {
        update.weight = Some(weight);
        update.price_per_unit = Some(line.product.price);
    }
    update
}

fn order_update_for(draft: &OrderDraft, total: Decimal) -> OrderUpdate {
    let current = &draft.info;
    let original = draft.original_info();
    let mut update = OrderUpdate {
        total: Some(total),
        ..OrderUpdate::default()
    };
    if current.order_type != original.order_type {
        update.order_type = Some(current.order_type);
    }
    if current.table != original.table {
        update.table = current.table.clone();
    }
    if current.customer_name != original.customer_name {
        update.customer_name = current.customer_name.clone();
    }
    if current.customer_phone != original.customer_phone {
        update.customer_phone = current.customer_phone.clone();
    }
    if current.delivery_address != original.delivery_address {
        update.delivery_address = current.delivery_address.clone();
    }
    if current.payment_method != original.payment_method {
        update.payment_method = Some(current.payment_method);
    }
    if current.note != original.note {
        update.note = current.note.clone();
    }
    if current.delivery_fee != original.delivery_fee {
        update.delivery_fee = Some(current.delivery_fee);
    }
    update
}

async fn run_op(
    order_id: &str,
    op: &GatewayOp,
    gateway: &dyn OrderGateway,
) -> Result<(), GatewayError> {
    match op {
        GatewayOp::DeleteItemExtras { order_item_ids } => {
            gateway.delete_order_item_extras(order_item_ids).await
        }
        GatewayOp::DeleteItems { ids } => gateway.delete_order_items(ids).await,
        GatewayOp::CreateItems { items } => {
            let rows: Vec<OrderItemCreate> = items.iter().map(|i| i.item.clone()).collect();
            let created = gateway.create_order_items(order_id, rows).await?;

            let mut extra_rows = Vec::new();
            for (row, op_item) in created.iter().zip(items) {
                for choice in &op_item.extras {
                    extra_rows.push(OrderItemExtraCreate::from_choice(row.id.clone(), choice));
                }
            }
            if extra_rows.is_empty() {
                Ok(())
            } else {
                gateway.create_order_item_extras(extra_rows).await
            }
        }
        GatewayOp::UpdateItem {
            id,
            update,
            replace_extras,
        } => {
            gateway.update_order_item(id, update.clone()).await?;
            if let Some(extras) = replace_extras {
                // Product swap: the old extras no longer correlate to the
                // new product, so rewrite them wholesale
                gateway
                    .delete_order_item_extras(std::slice::from_ref(id))
                    .await?;
                if !extras.is_empty() {
                    let rows = extras
                        .iter()
                        .map(|choice| OrderItemExtraCreate::from_choice(id.clone(), choice))
                        .collect();
                    gateway.create_order_item_extras(rows).await?;
                }
            }
            Ok(())
        }
        GatewayOp::UpdateOrder { update } => gateway.update_order(order_id, update.clone()).await,
    }
}
