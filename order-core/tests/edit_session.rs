//! End-to-end edit sessions against the in-memory gateway:
//! hydrate → mutate → plan → execute → re-fetch.

use order_core::gateway::InMemoryGateway;
use order_core::{CartDraft, OrderDraft, OrderError, OrderGateway, reconcile};
use rust_decimal::Decimal;
use shared::models::{Extra, Product, Variety};
use shared::order::{
    OrderInfo, OrderStatus, OrderType, PersistedOrder, PersistedOrderItem,
    PersistedOrderItemExtra,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("order_core=debug")
        .with_test_writer()
        .try_init();
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn pizza() -> Product {
    Product {
        id: "p-pizza".to_string(),
        name: "Pizza".to_string(),
        price: d("15.00"),
        varieties: vec![],
        extras: vec![Extra {
            id: "e-olives".to_string(),
            product: "p-pizza".to_string(),
            name: "Olives".to_string(),
            price: d("1.00"),
            max_quantity: 5,
            is_active: true,
        }],
        max_extras: None,
        is_active: true,
    }
}

fn cola() -> Product {
    Product {
        id: "p-cola".to_string(),
        name: "Cola".to_string(),
        price: d("2.50"),
        varieties: vec![],
        extras: vec![],
        max_extras: None,
        is_active: true,
    }
}

fn burger() -> Product {
    Product {
        id: "p-burger".to_string(),
        name: "Burger".to_string(),
        price: d("20.00"),
        varieties: vec![Variety {
            id: "v-large".to_string(),
            product: "p-burger".to_string(),
            name: "Large".to_string(),
            price: d("25.00"),
            is_active: true,
        }],
        extras: vec![Extra {
            id: "e-bacon".to_string(),
            product: "p-burger".to_string(),
            name: "Bacon".to_string(),
            price: d("3.00"),
            max_quantity: 3,
            is_active: true,
        }],
        max_extras: Some(3),
        is_active: true,
    }
}

fn buffet() -> Product {
    Product {
        id: "p-buffet".to_string(),
        name: "Buffet".to_string(),
        price: d("39.90"),
        varieties: vec![],
        extras: vec![],
        max_extras: None,
        is_active: true,
    }
}

fn empty_order(id: &str) -> PersistedOrder {
    PersistedOrder {
        id: id.to_string(),
        status: OrderStatus::Active,
        info: OrderInfo::default(),
        total: Decimal::ZERO,
        items: vec![],
        created_at: None,
    }
}

/// Order with a pizza (olives ×2), a salad, and a legacy weighed plate
fn seeded_gateway() -> InMemoryGateway {
    let gateway = InMemoryGateway::new();
    let mut order = empty_order("order-1");
    order.items = vec![
        PersistedOrderItem {
            id: "item-1".to_string(),
            product_id: Some("p-pizza".to_string()),
            name: "Pizza".to_string(),
            price: d("15.00"),
            quantity: 1,
            subtotal: d("17.00"),
            variety: None,
            extras: vec![PersistedOrderItemExtra {
                id: "extra-1".to_string(),
                order_item: "item-1".to_string(),
                extra_id: "e-olives".to_string(),
                name: "Olives".to_string(),
                price: d("1.00"),
                quantity: 2,
            }],
            weight: None,
            price_per_unit: None,
            note: None,
        },
        PersistedOrderItem {
            id: "item-2".to_string(),
            product_id: Some("p-salad".to_string()),
            name: "Salad".to_string(),
            price: d("8.00"),
            quantity: 1,
            subtotal: d("8.00"),
            variety: None,
            extras: vec![],
            weight: None,
            price_per_unit: None,
            note: None,
        },
        PersistedOrderItem {
            id: "item-3".to_string(),
            product_id: Some("p-buffet".to_string()),
            name: "Buffet plate".to_string(),
            price: d("39.90"),
            quantity: 1,
            subtotal: d("19.95"),
            variety: None,
            extras: vec![],
            weight: None,
            price_per_unit: None,
            // Legacy row: weight only encoded in the note
            note: Some("0.500 kg x 39.90/kg".to_string()),
        },
    ];
    order.total = d("44.95");
    gateway.seed_order(order);
    gateway
}

#[tokio::test]
async fn test_full_edit_session() {
    init_tracing();
    let gateway = seeded_gateway();

    let mut draft = OrderDraft::load("order-1", &gateway).await.unwrap();
    assert_eq!(draft.entries().len(), 3);
    assert_eq!(draft.subtotal(), d("44.95"));

    // Pizza 1 → 3, drop the salad, add two colas
    let pizza_key = draft.entries()[0].line.line_key.clone();
    let salad_key = draft.entries()[1].line.line_key.clone();
    draft.set_quantity(&pizza_key, 3).unwrap();
    draft.remove_line(&salad_key).unwrap();
    draft.add_selection(&cola(), None, &[], 2).unwrap();

    let plan = reconcile::reconcile(&draft, &gateway).await.unwrap();
    // pizza 17.00×3 + buffet 19.95 + cola 2.50×2
    assert_eq!(plan.total, d("75.95"));

    let stored = gateway.fetch_order_with_items("order-1").await.unwrap();
    assert_eq!(stored.total, d("75.95"));
    assert_eq!(stored.items.len(), 3);
    assert!(!stored.items.iter().any(|i| i.id == "item-2"));

    let pizza_row = stored.items.iter().find(|i| i.id == "item-1").unwrap();
    assert_eq!(pizza_row.quantity, 3);
    assert_eq!(pizza_row.subtotal, d("51.00"));
    // Extras untouched on a plain quantity change
    assert_eq!(pizza_row.extras.len(), 1);

    // The legacy weighed row was promoted to first-class weight fields
    let buffet_row = stored.items.iter().find(|i| i.id == "item-3").unwrap();
    assert_eq!(buffet_row.subtotal, d("19.95"));
    assert_eq!(buffet_row.weight, Some(d("0.500")));
    assert_eq!(buffet_row.price_per_unit, Some(d("39.90")));

    let cola_row = stored
        .items
        .iter()
        .find(|i| i.product_id.as_deref() == Some("p-cola"))
        .unwrap();
    assert_eq!(cola_row.quantity, 2);
    assert_eq!(cola_row.subtotal, d("5.00"));
}

#[tokio::test]
async fn test_failure_mid_sequence_leaves_partial_state() {
    init_tracing();
    let gateway = seeded_gateway();

    let mut draft = OrderDraft::load("order-1", &gateway).await.unwrap();
    let salad_key = draft.entries()[1].line.line_key.clone();
    draft.remove_line(&salad_key).unwrap();
    let pizza_key = draft.entries()[0].line.line_key.clone();
    draft.set_quantity(&pizza_key, 2).unwrap();

    // Step 0 deletes the doomed item's extras, step 1 deletes the item
    gateway.inject_failure("delete_order_items");
    let result = reconcile::reconcile(&draft, &gateway).await;
    let Err(OrderError::Gateway { op_index, .. }) = &result else {
        panic!("expected gateway error, got {result:?}");
    };
    assert_eq!(*op_index, 1);

    // Mixed state, no compensation: the salad row survived, the pizza
    // update and order total never ran
    let stored = gateway.fetch_order_with_items("order-1").await.unwrap();
    assert!(stored.items.iter().any(|i| i.id == "item-2"));
    assert_eq!(
        stored.items.iter().find(|i| i.id == "item-1").unwrap().quantity,
        1
    );
    assert_eq!(stored.total, d("44.95"));

    // The caller may retry after a fresh fetch
    gateway.clear_failure();
    let mut retry = OrderDraft::load("order-1", &gateway).await.unwrap();
    let salad_key = retry
        .entries()
        .iter()
        .find(|e| e.id.persisted_id() == Some("item-2"))
        .unwrap()
        .line
        .line_key
        .clone();
    retry.remove_line(&salad_key).unwrap();
    let pizza_key = retry
        .entries()
        .iter()
        .find(|e| e.id.persisted_id() == Some("item-1"))
        .unwrap()
        .line
        .line_key
        .clone();
    retry.set_quantity(&pizza_key, 2).unwrap();
    reconcile::reconcile(&retry, &gateway).await.unwrap();

    let stored = gateway.fetch_order_with_items("order-1").await.unwrap();
    assert!(!stored.items.iter().any(|i| i.id == "item-2"));
    assert_eq!(stored.total, d("53.95")); // 17.00×2 + 19.95
}

#[tokio::test]
async fn test_submit_cart_creates_items_extras_and_total() {
    init_tracing();
    let gateway = InMemoryGateway::new();
    gateway.seed_order(empty_order("order-9"));

    let mut cart = CartDraft::new();
    cart.add_selection(&burger(), Some("v-large"), &[("e-bacon", 1)], 1)
        .unwrap();
    cart.add_weighed_item(&buffet(), d("0.500"), d("39.90"), "Buffet plate")
        .unwrap();

    let info = OrderInfo {
        order_type: OrderType::Delivery,
        delivery_address: Some("12 Harbor St".to_string()),
        delivery_fee: d("3.00"),
        ..OrderInfo::default()
    };
    let total = reconcile::submit_cart(&cart, "order-9", &info, &gateway)
        .await
        .unwrap();
    assert_eq!(total, d("50.95")); // 28.00 + 19.95 + 3.00

    let stored = gateway.fetch_order_with_items("order-9").await.unwrap();
    assert_eq!(stored.total, d("50.95"));
    assert_eq!(stored.info.order_type, OrderType::Delivery);
    assert_eq!(stored.items.len(), 2);

    let burger_row = stored
        .items
        .iter()
        .find(|i| i.product_id.as_deref() == Some("p-burger"))
        .unwrap();
    assert_eq!(burger_row.price, d("25.00")); // Variety base; bacon is an extra row
    assert_eq!(burger_row.subtotal, d("28.00"));
    assert_eq!(burger_row.extras.len(), 1);
    assert_eq!(burger_row.extras[0].extra_id, "e-bacon");
    assert_eq!(burger_row.variety.as_ref().unwrap().id, "v-large");

    let plate_row = stored
        .items
        .iter()
        .find(|i| i.product_id.as_deref() == Some("p-buffet"))
        .unwrap();
    assert_eq!(plate_row.weight, Some(d("0.500")));
    assert_eq!(plate_row.subtotal, d("19.95"));
}

#[tokio::test]
async fn test_stale_snapshot_is_detectable_by_refetch() {
    init_tracing();
    let gateway = seeded_gateway();
    let draft = OrderDraft::load("order-1", &gateway).await.unwrap();

    // Another writer bumps a quantity while the session is open
    gateway
        .update_order_item(
            "item-2",
            shared::order::OrderItemUpdate {
                quantity: Some(4),
                subtotal: Some(d("32.00")),
                ..shared::order::OrderItemUpdate::default()
            },
        )
        .await
        .unwrap();

    let refetched = gateway.fetch_order_with_items("order-1").await.unwrap();
    let result = reconcile::verify_snapshot(draft.original_items(), &refetched.items);
    assert!(matches!(
        result,
        Err(OrderError::InconsistentSnapshot(_))
    ));
}

#[tokio::test]
async fn test_replace_product_rewrites_extras_in_store() {
    init_tracing();
    let gateway = seeded_gateway();

    let mut draft = OrderDraft::load("order-1", &gateway).await.unwrap();
    let pizza_key = draft.entries()[0].line.line_key.clone();
    draft
        .replace_product(&pizza_key, &burger(), Some("v-large"), &[("e-bacon", 2)])
        .unwrap();

    reconcile::reconcile(&draft, &gateway).await.unwrap();

    let stored = gateway.fetch_order_with_items("order-1").await.unwrap();
    let row = stored.items.iter().find(|i| i.id == "item-1").unwrap();
    assert_eq!(row.product_id.as_deref(), Some("p-burger"));
    assert_eq!(row.price, d("25.00"));
    assert_eq!(row.subtotal, d("31.00")); // 25.00 + 2 × 3.00
    assert_eq!(row.variety.as_ref().unwrap().id, "v-large");
    // Old olives rows are gone, replaced wholesale by bacon
    assert_eq!(row.extras.len(), 1);
    assert_eq!(row.extras[0].extra_id, "e-bacon");
}
