//! JSON-document OrderRepository implementation.

use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use orderdesk_core::error::{OrderdeskError, Result};
use orderdesk_core::order::{Order, OrderId, OrderRepository, OrderStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File name of the order document inside the data directory.
pub const ORDERS_FILE: &str = "orders.json";

/// On-disk shape: every order keyed by its id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OrderDocument {
    #[serde(default)]
    orders: BTreeMap<OrderId, Order>,
}

/// Order repository backed by a single JSON document.
///
/// ```text
/// data_dir/
/// └── orders.json      # {"orders": {"<id>": {...}, ...}}
/// ```
///
/// Lists are returned oldest first (by `created_at`, then id).
pub struct JsonOrderRepository {
    file: AtomicJsonFile<OrderDocument>,
    /// Serializes access from this process; the file lock covers other processes.
    guard: Mutex<()>,
}

impl JsonOrderRepository {
    /// Creates a repository storing `orders.json` under `data_dir`.
    ///
    /// The directory is created on first write.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_file(data_dir.join(ORDERS_FILE))
    }

    pub fn with_file(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn read_document(&self) -> Result<OrderDocument> {
        let _guard = self.guard.lock().await;
        let file = self.file.clone();
        let document = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| OrderdeskError::internal(format!("storage task failed: {}", e)))?
            .map_err(|e| OrderdeskError::data_access(format!("Failed to read orders: {}", e)))?;
        Ok(document.unwrap_or_default())
    }

    async fn list_where<F>(&self, predicate: F) -> Result<Vec<Order>>
    where
        F: Fn(&Order) -> bool,
    {
        let document = self.read_document().await?;
        let mut orders: Vec<Order> = document
            .orders
            .into_values()
            .filter(|order| predicate(order))
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }
}

#[async_trait]
impl OrderRepository for JsonOrderRepository {
    async fn upsert(&self, order: &Order) -> Result<OrderId> {
        let _guard = self.guard.lock().await;
        let file = self.file.clone();
        let record = order.clone();
        let id = record.id;

        tokio::task::spawn_blocking(move || {
            file.update(OrderDocument::default(), |document| {
                document.orders.insert(record.id, record);
                Ok(())
            })
        })
        .await
        .map_err(|e| OrderdeskError::internal(format!("storage task failed: {}", e)))?
        .map_err(|e| OrderdeskError::data_access(format!("Failed to save order {}: {}", id, e)))?;

        tracing::debug!(order_id = id, status = %order.status, "order stored");
        Ok(id)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let mut document = self.read_document().await?;
        Ok(document.orders.remove(&id))
    }

    async fn list_by_status(
        &self,
        status: OrderStatus,
        include_archived: bool,
    ) -> Result<Vec<Order>> {
        self.list_where(|order| {
            order.status == status && (include_archived || !order.is_archived())
        })
        .await
    }

    async fn list_archived(&self) -> Result<Vec<Order>> {
        self.list_where(Order::is_archived).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use orderdesk_core::order::NewOrder;
    use tempfile::TempDir;

    fn create_test_repository() -> (JsonOrderRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonOrderRepository::new(temp_dir.path());
        (repo, temp_dir)
    }

    fn create_test_order(id: OrderId, minutes: i64, products: &[&str]) -> Order {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        let draft = NewOrder {
            products: products.iter().map(|p| p.to_string()).collect(),
            shop_url: Some("https://shop.example".to_string()),
            ..NewOrder::default()
        };
        Order::from_draft(draft, id, created)
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let (repo, _temp_dir) = create_test_repository();
        let order = create_test_order(u64::MAX - 7, 0, &["boots"]);

        let id = repo.upsert(&order).await.unwrap();
        assert_eq!(id, order.id);

        let found = repo.get(id).await.unwrap().unwrap();
        assert_eq!(found, order);
        assert!(repo.get(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_record() {
        let (repo, _temp_dir) = create_test_repository();
        let mut order = create_test_order(3, 0, &["boots", "scarf"]);
        repo.upsert(&order).await.unwrap();

        order.mark_tracked(0).unwrap();
        order.delivery_price = Some("80".to_string());
        repo.upsert(&order).await.unwrap();

        let found = repo.get(3).await.unwrap().unwrap();
        assert_eq!(found.products_tracking, vec![true, false]);
        assert_eq!(found.delivery_price.as_deref(), Some("80"));
        assert_eq!(repo.list_by_status(OrderStatus::New, false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_status_filters_and_sorts() {
        let (repo, _temp_dir) = create_test_repository();

        let late = create_test_order(1, 30, &[]);
        let early = create_test_order(2, 10, &[]);
        let mut progressing = create_test_order(3, 20, &[]);
        progressing.status = OrderStatus::InProgress;
        let mut archived = create_test_order(4, 5, &[]);
        archived.archive(Utc::now());

        for order in [&late, &early, &progressing, &archived] {
            repo.upsert(order).await.unwrap();
        }

        let active: Vec<OrderId> = repo
            .list_by_status(OrderStatus::New, false)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(active, vec![2, 1]);

        let with_archived: Vec<OrderId> = repo
            .list_by_status(OrderStatus::New, true)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(with_archived, vec![4, 2, 1]);

        let archived_ids: Vec<OrderId> =
            repo.list_archived().await.unwrap().iter().map(|o| o.id).collect();
        assert_eq!(archived_ids, vec![4]);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let (repo, _temp_dir) = create_test_repository();
        assert!(repo.list_by_status(OrderStatus::Done, true).await.unwrap().is_empty());
        assert!(repo.list_archived().await.unwrap().is_empty());
        assert!(!repo.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_store_surfaces_data_access_error() {
        let (repo, _temp_dir) = create_test_repository();
        std::fs::write(repo.path(), "{\"orders\": 7").unwrap();

        let err = repo.get(1).await.unwrap_err();
        assert!(err.is_storage_failure());

        let err = repo.upsert(&create_test_order(1, 0, &[])).await.unwrap_err();
        assert!(err.is_storage_failure());
    }

    #[tokio::test]
    async fn test_reopened_repository_sees_orders() {
        let (repo, temp_dir) = create_test_repository();
        repo.upsert(&create_test_order(9, 0, &["hat"])).await.unwrap();
        drop(repo);

        let reopened = JsonOrderRepository::new(temp_dir.path());
        assert_eq!(reopened.get(9).await.unwrap().unwrap().products, vec!["hat"]);
    }
}
