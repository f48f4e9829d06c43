//! Drives the desk through a full order lifecycle against the JSON store.

use chrono::{TimeZone, Utc};
use orderdesk_application::{AccessGate, OrderDesk, presentation};
use orderdesk_core::action::{Command, Incoming};
use orderdesk_core::clock::{Clock, FixedClock};
use orderdesk_core::order::{Order, OrderRepository, OrderStatus};
use orderdesk_core::transport::Outgoing;
use orderdesk_infrastructure::JsonOrderRepository;
use std::sync::Arc;
use tempfile::TempDir;

const USER: i64 = 100;

struct Harness {
    desk: OrderDesk,
    repo: Arc<JsonOrderRepository>,
    _temp_dir: TempDir,
}

async fn admitted_harness() -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let repo = Arc::new(JsonOrderRepository::new(temp_dir.path()));
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
    ));
    let gate = AccessGate::new("%d*%m*%Y", clock.clone()).unwrap();
    let secret = gate.expected_secret();
    let registry = Arc::new(orderdesk_core::order::FormRegistry::new().unwrap());
    let desk = OrderDesk::new(registry, repo.clone(), clock, gate);

    desk.handle(USER, Incoming::Command(Command::Start)).await;
    let out = desk.handle(USER, Incoming::Text(secret)).await;
    assert_eq!(first_text(&out), presentation::SECRET_ACCEPTED);

    Harness {
        desk,
        repo,
        _temp_dir: temp_dir,
    }
}

fn first_text(out: &[Outgoing]) -> String {
    out.first()
        .and_then(Outgoing::message)
        .map(|m| m.text.clone())
        .unwrap_or_default()
}

async fn say(h: &Harness, text: &str) -> Vec<Outgoing> {
    h.desk.handle(USER, Incoming::from_text(text)).await
}

async fn press(h: &Harness, token: &str) -> Vec<Outgoing> {
    h.desk
        .handle(USER, Incoming::callback(token, Some(1)).unwrap())
        .await
}

async fn only_order(h: &Harness, status: OrderStatus) -> Order {
    let mut orders = h.repo.list_by_status(status, true).await.unwrap();
    assert_eq!(orders.len(), 1);
    orders.remove(0)
}

async fn create_order(h: &Harness) -> Order {
    let out = press(h, "add_order").await;
    assert_eq!(first_text(&out), "Customer -> Full name:");

    for answer in ["Olena", "+380501112233", "Kyiv, branch 12", "https://shop.example"] {
        say(h, answer).await;
    }
    let out = say(h, "A").await;
    assert_eq!(first_text(&out), presentation::LIST_ITEM_ADDED);
    say(h, "B").await;
    let out = say(h, "/skip").await;
    assert_eq!(first_text(&out), "Paid by customer:");
    say(h, "1200").await;
    say(h, "1000").await;
    let out = say(h, "Nova Poshta").await;
    assert_eq!(first_text(&out), presentation::ORDER_SAVED);

    only_order(h, OrderStatus::New).await
}

#[tokio::test]
async fn test_new_order_flow_persists_untracked_order() {
    let h = admitted_harness().await;
    let order = create_order(&h).await;

    assert_eq!(order.products, vec!["A", "B"]);
    assert_eq!(order.products_tracking, vec![false, false]);
    assert_eq!(order.customer_info.shipping_address.as_deref(), Some("Kyiv, branch 12"));

    let out = press(&h, "new_orders").await;
    assert_eq!(out.len(), 1);
    assert!(first_text(&out).contains("Products:\n  - A\n  - B"));
}

#[tokio::test]
async fn test_full_lifecycle() {
    let h = admitted_harness().await;
    let order = create_order(&h).await;
    let id = order.id;

    press(&h, &format!("fill_tracking.{}.0", id)).await;
    let tracked = only_order(&h, OrderStatus::New).await;
    assert_eq!(tracked.products_tracking, vec![true, false]);
    assert_eq!(tracked.available_actions()[0], orderdesk_core::order::OrderAction::FillTracking);

    press(&h, &format!("fill_tracking.{}.1", id)).await;

    let out = press(&h, &format!("continue.{}", id)).await;
    assert_eq!(first_text(&out), "Delivery price:");
    say(&h, "80").await;
    say(&h, "50").await;

    let progressing = only_order(&h, OrderStatus::InProgress).await;
    assert_eq!(progressing.delivery_price.as_deref(), Some("80"));
    assert_eq!(progressing.service_fee.as_deref(), Some("50"));
    assert_eq!(progressing.products, order.products);
    assert_eq!(progressing.customer_info, order.customer_info);

    let out = press(&h, &format!("receive.{}.customer", id)).await;
    assert!(matches!(out.as_slice(), [Outgoing::EditOrigin(_)]));
    let done = only_order(&h, OrderStatus::Done).await;
    assert!(done.received_at.is_some());
    assert_eq!(done.received_at, done.received_by_customer_at);

    press(&h, &format!("receive.{}.customer", id)).await;
    assert_eq!(only_order(&h, OrderStatus::Done).await.received_at, done.received_at);

    assert_eq!(press(&h, &format!("archive.{}", id)).await, vec![Outgoing::DeleteOrigin]);
    assert!(h.repo.list_by_status(OrderStatus::Done, false).await.unwrap().is_empty());
    assert_eq!(h.repo.list_archived().await.unwrap().len(), 1);
    assert_eq!(first_text(&press(&h, "done_orders").await), presentation::NO_ORDERS);

    press(&h, &format!("restore.{}", id)).await;
    let restored = only_order(&h, OrderStatus::Done).await;
    assert!(restored.archived_at.is_none());
    assert!(h.repo.list_archived().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_continue_before_tracking_is_refused() {
    let h = admitted_harness().await;
    let order = create_order(&h).await;

    let out = press(&h, &format!("continue.{}", order.id)).await;
    assert_eq!(
        first_text(&out),
        format!("This action is no longer available for order {}", order.id)
    );
    assert_eq!(only_order(&h, OrderStatus::New).await, order);
}
