//! In-memory gateway
//!
//! Backs tests and demos. Ids are assigned sequentially; a failure can
//! be injected per call name to exercise the partial-progress behavior
//! of reconciliation.

use super::{GatewayError, GatewayResult, OrderGateway};
use async_trait::async_trait;
use dashmap::DashMap;
use shared::order::{
    OrderItemCreate, OrderItemExtraCreate, OrderItemUpdate, OrderUpdate, PersistedOrder,
    PersistedOrderItem, PersistedOrderItemExtra,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hash-map-backed record store
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    orders: DashMap<String, PersistedOrder>,
    next_id: AtomicU64,
    fail_on: Mutex<Option<String>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order wholesale (test fixture setup)
    pub fn seed_order(&self, order: PersistedOrder) {
        self.orders.insert(order.id.clone(), order);
    }

    /// Make the named call fail until cleared
    pub fn inject_failure(&self, call: &str) {
        *self.fail_on.lock().unwrap() = Some(call.to_string());
    }

    pub fn clear_failure(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    fn next(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn check(&self, call: &str) -> GatewayResult<()> {
        if self.fail_on.lock().unwrap().as_deref() == Some(call) {
            return Err(GatewayError::Storage(format!("injected failure in {call}")));
        }
        Ok(())
    }
}

fn apply_item_update(item: &mut PersistedOrderItem, fields: &OrderItemUpdate) {
    if let Some(name) = &fields.name {
        item.name = name.clone();
    }
    if let Some(quantity) = fields.quantity {
        item.quantity = quantity;
    }
    if let Some(subtotal) = fields.subtotal {
        item.subtotal = subtotal;
    }
    if let Some(product_id) = &fields.product_id {
        item.product_id = Some(product_id.clone());
    }
    if let Some(price) = fields.price {
        item.price = price;
    }
    if fields.replace_variety {
        item.variety = fields.variety.clone();
    }
    if let Some(weight) = fields.weight {
        item.weight = Some(weight);
    }
    if let Some(price_per_unit) = fields.price_per_unit {
        item.price_per_unit = Some(price_per_unit);
    }
    if let Some(note) = &fields.note {
        item.note = Some(note.clone());
    }
}

fn apply_order_update(order: &mut PersistedOrder, fields: &OrderUpdate) {
    if let Some(total) = fields.total {
        order.total = total;
    }
    if let Some(status) = fields.status {
        order.status = status;
    }
    if let Some(order_type) = fields.order_type {
        order.info.order_type = order_type;
    }
    if let Some(table) = &fields.table {
        order.info.table = Some(table.clone());
    }
    if let Some(name) = &fields.customer_name {
        order.info.customer_name = Some(name.clone());
    }
    if let Some(phone) = &fields.customer_phone {
        order.info.customer_phone = Some(phone.clone());
    }
    if let Some(address) = &fields.delivery_address {
        order.info.delivery_address = Some(address.clone());
    }
    if let Some(method) = fields.payment_method {
        order.info.payment_method = method;
    }
    if let Some(note) = &fields.note {
        order.info.note = Some(note.clone());
    }
    if let Some(fee) = fields.delivery_fee {
        order.info.delivery_fee = fee;
    }
}

#[async_trait]
impl OrderGateway for InMemoryGateway {
    async fn create_order_items(
        &self,
        order_id: &str,
        items: Vec<OrderItemCreate>,
    ) -> GatewayResult<Vec<PersistedOrderItem>> {
        self.check("create_order_items")?;
        let mut order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| GatewayError::NotFound(format!("order {order_id}")))?;

        let mut created = Vec::with_capacity(items.len());
        for payload in items {
            let row = PersistedOrderItem {
                id: self.next("item"),
                product_id: payload.product_id,
                name: payload.name,
                price: payload.price,
                quantity: payload.quantity,
                subtotal: payload.subtotal,
                variety: payload.variety,
                extras: vec![],
                weight: payload.weight,
                price_per_unit: payload.price_per_unit,
                note: payload.note,
            };
            order.items.push(row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn create_order_item_extras(
        &self,
        extras: Vec<OrderItemExtraCreate>,
    ) -> GatewayResult<()> {
        self.check("create_order_item_extras")?;
        for payload in extras {
            let mut found = false;
            for mut order in self.orders.iter_mut() {
                if let Some(item) = order
                    .items
                    .iter_mut()
                    .find(|i| i.id == payload.order_item)
                {
                    item.extras.push(PersistedOrderItemExtra {
                        id: self.next("extra"),
                        order_item: payload.order_item.clone(),
                        extra_id: payload.extra_id.clone(),
                        name: payload.name.clone(),
                        price: payload.price,
                        quantity: payload.quantity,
                    });
                    found = true;
                    break;
                }
            }
            if !found {
                return Err(GatewayError::NotFound(format!(
                    "order item {}",
                    payload.order_item
                )));
            }
        }
        Ok(())
    }

    async fn delete_order_item_extras(&self, order_item_ids: &[String]) -> GatewayResult<()> {
        self.check("delete_order_item_extras")?;
        for mut order in self.orders.iter_mut() {
            for item in order.items.iter_mut() {
                if order_item_ids.contains(&item.id) {
                    item.extras.clear();
                }
            }
        }
        Ok(())
    }

    async fn delete_order_items(&self, ids: &[String]) -> GatewayResult<()> {
        self.check("delete_order_items")?;
        for id in ids {
            let mut found = false;
            for mut order in self.orders.iter_mut() {
                let before = order.items.len();
                order.items.retain(|i| &i.id != id);
                if order.items.len() != before {
                    found = true;
                    break;
                }
            }
            if !found {
                return Err(GatewayError::NotFound(format!("order item {id}")));
            }
        }
        Ok(())
    }

    async fn update_order_item(&self, id: &str, fields: OrderItemUpdate) -> GatewayResult<()> {
        self.check("update_order_item")?;
        for mut order in self.orders.iter_mut() {
            if let Some(item) = order.items.iter_mut().find(|i| i.id == id) {
                apply_item_update(item, &fields);
                return Ok(());
            }
        }
        Err(GatewayError::NotFound(format!("order item {id}")))
    }

    async fn update_order(&self, order_id: &str, fields: OrderUpdate) -> GatewayResult<()> {
        self.check("update_order")?;
        let mut order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| GatewayError::NotFound(format!("order {order_id}")))?;
        apply_order_update(&mut order, &fields);
        Ok(())
    }

    async fn fetch_order_with_items(&self, order_id: &str) -> GatewayResult<PersistedOrder> {
        self.check("fetch_order_with_items")?;
        self.orders
            .get(order_id)
            .map(|o| o.value().clone())
            .ok_or_else(|| GatewayError::NotFound(format!("order {order_id}")))
    }
}
