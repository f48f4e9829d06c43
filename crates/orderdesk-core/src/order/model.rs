//! Order domain model.
//!
//! The persisted `Order` aggregate plus the two form shapes the operator
//! fills in: `NewOrder` (draft of a fresh order) and `InProgressOrder`
//! (patch applied when an order moves to in-progress).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::error::{OrderdeskError, Result};

/// Numeric order identifier, generated once and never changed.
pub type OrderId = u64;

/// Generates a fresh random order identifier.
pub fn new_order_id() -> OrderId {
    (Uuid::new_v4().as_u128() >> 64) as u64
}

/// Processing status of an order.
///
/// Archiving is orthogonal to status and tracked by `Order::archived_at`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    /// Created from the new-order form, waiting for shipment documents.
    New,
    /// Delivery price and fee are known, waiting for the parcel.
    InProgress,
    /// Received by the customer.
    Done,
}

impl OrderStatus {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::InProgress => "In progress",
            OrderStatus::Done => "Done",
        }
    }
}

fn default_status() -> OrderStatus {
    OrderStatus::New
}

fn in_progress_status() -> OrderStatus {
    OrderStatus::InProgress
}

/// Customer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub shipping_address: Option<String>,
}

/// The persisted order aggregate.
///
/// Serializes to a flat record keyed by field name; timestamps are RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    pub shop_url: Option<String>,
    #[serde(default)]
    pub products: Vec<String>,
    pub income: Option<String>,
    pub price: Option<String>,
    pub delivery_service: Option<String>,
    pub delivery_price: Option<String>,
    pub service_fee: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub received_by_customer_at: Option<DateTime<Utc>>,
    #[serde(default = "default_status")]
    pub status: OrderStatus,
    /// One flag per product: whether a shipment document exists for it.
    #[serde(default)]
    pub products_tracking: Vec<bool>,
    /// Soft-delete marker; `None` means the order is active.
    pub archived_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a NEW order from a completed draft.
    ///
    /// The tracking list gets one `false` flag per product.
    pub fn from_draft(draft: NewOrder, id: OrderId, now: DateTime<Utc>) -> Self {
        let products_tracking = vec![false; draft.products.len()];
        Self {
            id,
            created_at: now,
            customer_info: draft.customer_info,
            shop_url: draft.shop_url,
            products: draft.products,
            income: draft.income,
            price: draft.price,
            delivery_service: draft.delivery_service,
            delivery_price: None,
            service_fee: None,
            received_at: None,
            received_by_customer_at: None,
            status: OrderStatus::New,
            products_tracking,
            archived_at: None,
        }
    }

    /// Overlays every field present in `patch` onto this order.
    ///
    /// Fields the patch does not declare keep their current value. The
    /// identifier can not be changed through an overlay.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the patch targets another order or the merged
    /// record no longer forms a valid order.
    pub fn overlay<P: Serialize>(self, patch: &P) -> Result<Self> {
        let id = self.id;
        let Value::Object(patch) = serde_json::to_value(patch)? else {
            return Err(OrderdeskError::validation("order patch must be a record"));
        };
        if let Some(patch_id) = patch.get("id")
            && patch_id.as_u64() != Some(id)
        {
            return Err(OrderdeskError::validation(format!(
                "patch for order {} applied to order {}",
                patch_id, id
            )));
        }

        let mut merged = serde_json::to_value(self)?;
        if let Value::Object(record) = &mut merged {
            record.extend(patch);
        }
        serde_json::from_value(merged)
            .map_err(|e| OrderdeskError::validation(format!("merged order is invalid: {}", e)))
    }
}

/// Draft of a fresh order, as collected by the new-order form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewOrder {
    pub customer_info: CustomerInfo,
    pub shop_url: Option<String>,
    pub products: Vec<String>,
    pub income: Option<String>,
    pub price: Option<String>,
    pub delivery_service: Option<String>,
}

/// Patch collected when an order moves from NEW to IN_PROGRESS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InProgressOrder {
    pub id: OrderId,
    #[serde(default)]
    pub delivery_price: Option<String>,
    #[serde(default)]
    pub service_fee: Option<String>,
    #[serde(default = "in_progress_status")]
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::str::FromStr;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
    }

    fn draft(products: &[&str]) -> NewOrder {
        NewOrder {
            customer_info: CustomerInfo {
                full_name: Some("Olena".to_string()),
                phone_number: Some("+380501112233".to_string()),
                shipping_address: Some("Kyiv, branch 12".to_string()),
            },
            shop_url: Some("https://shop.example".to_string()),
            products: products.iter().map(|p| p.to_string()).collect(),
            income: Some("1200".to_string()),
            price: Some("1000".to_string()),
            delivery_service: Some("Nova Poshta".to_string()),
        }
    }

    #[test]
    fn test_from_draft_initializes_tracking() {
        let order = Order::from_draft(draft(&["A", "B"]), 7, now());
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.products_tracking, vec![false, false]);
        assert_eq!(order.created_at, now());
        assert!(order.archived_at.is_none());
    }

    #[test]
    fn test_overlay_keeps_fields_outside_patch() {
        let order = Order::from_draft(draft(&["A"]), 7, now());
        let patch = InProgressOrder {
            id: 7,
            delivery_price: Some("80".to_string()),
            service_fee: Some("20".to_string()),
            status: OrderStatus::InProgress,
        };

        let updated = order.clone().overlay(&patch).unwrap();
        assert_eq!(updated.status, OrderStatus::InProgress);
        assert_eq!(updated.delivery_price.as_deref(), Some("80"));
        assert_eq!(updated.products, order.products);
        assert_eq!(updated.customer_info, order.customer_info);
        assert_eq!(updated.products_tracking, order.products_tracking);
    }

    #[test]
    fn test_overlay_rejects_foreign_patch() {
        let order = Order::from_draft(draft(&[]), 7, now());
        let patch = InProgressOrder {
            id: 8,
            delivery_price: None,
            service_fee: None,
            status: OrderStatus::InProgress,
        };
        let err = order.overlay(&patch).unwrap_err();
        assert!(matches!(err, OrderdeskError::Validation(_)));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(OrderStatus::InProgress).unwrap(),
            json!("in_progress")
        );
        assert_eq!(OrderStatus::from_str("done").unwrap(), OrderStatus::Done);
        assert_eq!(OrderStatus::New.to_string(), "new");
    }

    #[test]
    fn test_order_record_reads_missing_optional_fields() {
        let record = json!({
            "id": 5,
            "created_at": "2024-03-01T10:30:00Z",
            "status": "new",
        });
        let order: Order = serde_json::from_value(record).unwrap();
        assert!(order.products.is_empty());
        assert!(order.customer_info.full_name.is_none());
        assert!(order.archived_at.is_none());
    }

    #[test]
    fn test_in_progress_patch_defaults_status() {
        let patch: InProgressOrder = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(patch.status, OrderStatus::InProgress);
        assert!(patch.delivery_price.is_none());
    }
}
