//! Text and keyboards shown to the operator.

use chrono::{DateTime, Local};
use orderdesk_core::action::{CallbackAction, OrderView, Receiver};
use orderdesk_core::error::Result;
use orderdesk_core::form::{DescriptorKind, FieldDescriptor, FieldKind, ModelDefinition};
use orderdesk_core::order::{Order, OrderAction, OrderStatus};
use orderdesk_core::transport::{Button, OutgoingMessage};
use serde_json::Value;

pub const SECRET_PROMPT: &str = "Tell me the secret";
pub const SECRET_ACCEPTED: &str = "Great!";
pub const SECRET_REJECTED: &str = "Go away, robber!";
pub const MENU_TITLE: &str = "Choose an action";
pub const LIST_ITEM_ADDED: &str = "Added! Add more or send /skip to finish";
pub const NO_ORDERS: &str = "No orders found";
pub const ORDER_SAVED: &str = "Order saved";
pub const TRACKING_PROMPT: &str = "Which product has a shipment document?";
pub const ALL_TRACKED: &str = "All products have shipment documents";
pub const FORM_IN_PROGRESS: &str = "Finish the current form first, or send /start to drop it";
pub const OPERATION_FAILED: &str = "Operation failed, nothing was changed";

const TRACKED_MARKER: &str = " (tracking)";
const EMPTY_VALUE: &str = "-";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Prompt text for a form field.
pub fn field_prompt(descriptor: &FieldDescriptor) -> String {
    match descriptor.kind {
        DescriptorKind::Scalar => format!("{}:", descriptor.prompt),
        DescriptorKind::ListOfScalar => format!(
            "{}: send one item per message, /skip when done",
            descriptor.prompt
        ),
    }
}

pub fn main_menu() -> OutgoingMessage {
    OutgoingMessage::with_keyboard(
        MENU_TITLE,
        vec![
            Button::new("Add order", CallbackAction::AddOrder),
            Button::new(
                "New orders",
                CallbackAction::ShowOrders(OrderView::Status(OrderStatus::New)),
            ),
            Button::new(
                "Orders in progress",
                CallbackAction::ShowOrders(OrderView::Status(OrderStatus::InProgress)),
            ),
            Button::new(
                "Completed orders",
                CallbackAction::ShowOrders(OrderView::Status(OrderStatus::Done)),
            ),
            Button::new("Archive", CallbackAction::ShowOrders(OrderView::Archived)),
        ],
    )
}

/// Buttons for the actions the order currently allows.
pub fn order_keyboard(order: &Order) -> Vec<Button> {
    let id = order.id;
    order
        .available_actions()
        .into_iter()
        .map(|action| match action {
            OrderAction::FillTracking => Button::new(
                "Mark shipment documents",
                CallbackAction::FillTracking {
                    order_id: id,
                    item: None,
                },
            ),
            OrderAction::ContinueEdit => Button::new("Continue", CallbackAction::Continue(id)),
            OrderAction::ReceivedByMe => Button::new(
                "Received by me",
                CallbackAction::Receive {
                    order_id: id,
                    by: Receiver::Me,
                },
            ),
            OrderAction::ReceivedByCustomer => Button::new(
                "Received by customer",
                CallbackAction::Receive {
                    order_id: id,
                    by: Receiver::Customer,
                },
            ),
            OrderAction::Archive => Button::new("Archive", CallbackAction::Archive(id)),
            OrderAction::Restore => Button::new("Restore", CallbackAction::Restore(id)),
        })
        .collect()
}

/// One button per product in `untracked`, labelled with the product name.
pub fn tracking_keyboard(order: &Order, untracked: &[usize]) -> Vec<Button> {
    untracked
        .iter()
        .filter_map(|&idx| {
            order.products.get(idx).map(|name| {
                Button::new(
                    name.clone(),
                    CallbackAction::FillTracking {
                        order_id: order.id,
                        item: Some(idx),
                    },
                )
            })
        })
        .collect()
}

/// The rendered order with its action keyboard.
pub fn order_message(order: &Order, definition: &ModelDefinition) -> Result<OutgoingMessage> {
    Ok(OutgoingMessage::with_keyboard(
        render_order(order, definition)?,
        order_keyboard(order),
    ))
}

/// Renders `order` as `Title: value` lines following `definition`.
///
/// Nested records are indented under their title, list items get one line
/// each, and products with a shipment document carry a marker. The tracking
/// flags themselves are not printed.
pub fn render_order(order: &Order, definition: &ModelDefinition) -> Result<String> {
    let value = serde_json::to_value(order)?;
    let mut lines = Vec::new();
    render_fields(definition, &value, order, 0, &mut lines);
    Ok(lines.join("\n"))
}

fn render_fields(
    definition: &ModelDefinition,
    value: &Value,
    order: &Order,
    depth: usize,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    for field in definition.fields() {
        if field.name == "products_tracking" {
            continue;
        }
        let raw = value.get(field.name).unwrap_or(&Value::Null);
        match &field.kind {
            FieldKind::Nested(nested) => {
                lines.push(format!("{}{}:", indent, field.title));
                render_fields(nested, raw, order, depth + 1, lines);
            }
            FieldKind::List => {
                let items = raw.as_array().map(Vec::as_slice).unwrap_or_default();
                if items.is_empty() {
                    lines.push(format!("{}{}: {}", indent, field.title, EMPTY_VALUE));
                    continue;
                }
                lines.push(format!("{}{}:", indent, field.title));
                for (idx, item) in items.iter().enumerate() {
                    let tracked = field.name == "products"
                        && order.products_tracking.get(idx).copied().unwrap_or(false);
                    lines.push(format!(
                        "{}  - {}{}",
                        indent,
                        scalar_text(field.name, item),
                        if tracked { TRACKED_MARKER } else { "" }
                    ));
                }
            }
            FieldKind::Scalar => {
                lines.push(format!(
                    "{}{}: {}",
                    indent,
                    field.title,
                    scalar_text(field.name, raw)
                ));
            }
        }
    }
}

const TIMESTAMP_FIELDS: [&str; 4] = [
    "created_at",
    "received_at",
    "received_by_customer_at",
    "archived_at",
];

fn scalar_text(name: &str, value: &Value) -> String {
    match value {
        Value::Null => EMPTY_VALUE.to_string(),
        Value::String(text) if name == "status" => text
            .parse::<OrderStatus>()
            .map(|status| status.label().to_string())
            .unwrap_or_else(|_| text.clone()),
        Value::String(text) if TIMESTAMP_FIELDS.contains(&name) => {
            match DateTime::parse_from_rfc3339(text) {
                Ok(instant) => instant.with_timezone(&Local).format(DATE_FORMAT).to_string(),
                Err(_) => text.clone(),
            }
        }
        other => other.to_string(),
    }
}
