//! Order lifecycle use cases.
//!
//! Loads an order, applies one transition from the domain rules and writes
//! it back. A transition that the rules reject leaves the stored order
//! untouched.

use orderdesk_core::action::{OrderView, Receiver};
use orderdesk_core::clock::Clock;
use orderdesk_core::error::{OrderdeskError, Result};
use orderdesk_core::form::FlatValues;
use orderdesk_core::order::{Order, OrderId, OrderRepository, OrderStatus};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct OrderLifecycleService {
    repository: Arc<dyn OrderRepository>,
    clock: Arc<dyn Clock>,
}

impl OrderLifecycleService {
    pub fn new(repository: Arc<dyn OrderRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Orders shown for a list view, oldest first.
    pub async fn list(&self, view: OrderView) -> Result<Vec<Order>> {
        match view {
            OrderView::Status(status) => self.repository.list_by_status(status, false).await,
            OrderView::Archived => self.repository.list_archived().await,
        }
    }

    /// The order and the indices of its products still lacking a shipment document.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such order
    /// - `InvalidTransition`: the order is archived or no longer NEW
    pub async fn untracked_products(&self, id: OrderId) -> Result<(Order, Vec<usize>)> {
        let order = self.load(id).await?;
        order.ensure_trackable()?;
        let untracked = order.untracked_products();
        Ok((order, untracked))
    }

    /// Marks product `idx` of order `id` as having a shipment document.
    pub async fn fill_tracking(&self, id: OrderId, idx: usize) -> Result<Order> {
        let mut order = self.load(id).await?;
        if order.mark_tracked(idx)? {
            self.repository.upsert(&order).await?;
            info!(order_id = id, product = idx, "shipment document recorded");
        }
        Ok(order)
    }

    pub async fn receive(&self, id: OrderId, by: Receiver) -> Result<Order> {
        let mut order = self.load(id).await?;
        let now = self.clock.now();
        match by {
            Receiver::Me => order.mark_received_by_me(now)?,
            Receiver::Customer => order.mark_received_by_customer(now)?,
        }
        self.repository.upsert(&order).await?;
        info!(order_id = id, by = %by, status = %order.status, "order received");
        Ok(order)
    }

    pub async fn archive(&self, id: OrderId) -> Result<Order> {
        let mut order = self.load(id).await?;
        order.archive(self.clock.now());
        self.repository.upsert(&order).await?;
        info!(order_id = id, "order archived");
        Ok(order)
    }

    pub async fn restore(&self, id: OrderId) -> Result<Order> {
        let mut order = self.load(id).await?;
        order.restore();
        self.repository.upsert(&order).await?;
        info!(order_id = id, "order restored");
        Ok(order)
    }

    /// Seed for the in-progress form of order `id`: its identifier and the
    /// target status.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the order is active, NEW and fully tracked.
    pub async fn continue_candidate(&self, id: OrderId) -> Result<FlatValues> {
        let order = self.load(id).await?;
        order.ensure_ready_for_progress()?;

        let mut seed = FlatValues::new();
        seed.insert("id".to_string(), json!(order.id));
        seed.insert("status".to_string(), json!(OrderStatus::InProgress));
        Ok(seed)
    }

    async fn load(&self, id: OrderId) -> Result<Order> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| OrderdeskError::not_found("order", id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryOrderRepository, fixed_clock, sample_order};

    async fn service_with(orders: &[Order]) -> (OrderLifecycleService, Arc<MemoryOrderRepository>) {
        let repo = Arc::new(MemoryOrderRepository::default());
        for order in orders {
            repo.upsert(order).await.unwrap();
        }
        let service = OrderLifecycleService::new(repo.clone(), Arc::new(fixed_clock()));
        (service, repo)
    }

    #[tokio::test]
    async fn test_fill_tracking_persists_flag() {
        let (service, repo) = service_with(&[sample_order(1, &["A", "B"])]).await;

        let order = service.fill_tracking(1, 0).await.unwrap();
        assert_eq!(order.products_tracking, vec![true, false]);
        assert_eq!(order.status, OrderStatus::New);

        let stored = repo.get(1).await.unwrap().unwrap();
        assert_eq!(stored.products_tracking, vec![true, false]);

        let (_, untracked) = service.untracked_products(1).await.unwrap();
        assert_eq!(untracked, vec![1]);
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let (service, _repo) = service_with(&[]).await;

        assert!(service.fill_tracking(5, 0).await.unwrap_err().is_not_found());
        assert!(service.archive(5).await.unwrap_err().is_not_found());
        assert!(service.restore(5).await.unwrap_err().is_not_found());
        assert!(service.receive(5, Receiver::Me).await.unwrap_err().is_not_found());
        assert!(service.continue_candidate(5).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_receive_by_customer_completes() {
        let mut order = sample_order(1, &["A"]);
        order.status = OrderStatus::InProgress;
        order.products_tracking = vec![true];
        let (service, repo) = service_with(&[order]).await;

        let done = service.receive(1, Receiver::Customer).await.unwrap();
        assert_eq!(done.status, OrderStatus::Done);
        assert_eq!(done.received_at, Some(fixed_clock().0));
        assert_eq!(done.received_by_customer_at, Some(fixed_clock().0));
        assert_eq!(repo.get(1).await.unwrap().unwrap(), done);
    }

    #[tokio::test]
    async fn test_rejected_transition_leaves_store_untouched() {
        let (service, repo) = service_with(&[sample_order(1, &["A"])]).await;

        let err = service.receive(1, Receiver::Me).await.unwrap_err();
        assert!(matches!(err, OrderdeskError::InvalidTransition { .. }));
        assert_eq!(repo.get(1).await.unwrap().unwrap().received_at, None);
    }

    #[tokio::test]
    async fn test_archive_hides_from_status_list_until_restored() {
        let (service, _repo) = service_with(&[sample_order(1, &[]), sample_order(2, &[])]).await;

        service.archive(1).await.unwrap();
        let new_ids: Vec<OrderId> = service
            .list(OrderView::Status(OrderStatus::New))
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(new_ids, vec![2]);
        assert_eq!(service.list(OrderView::Archived).await.unwrap().len(), 1);

        let restored = service.restore(1).await.unwrap();
        assert!(restored.archived_at.is_none());
        assert_eq!(restored.status, OrderStatus::New);
        assert!(service.list(OrderView::Archived).await.unwrap().is_empty());
        assert_eq!(
            service.list(OrderView::Status(OrderStatus::New)).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_continue_candidate_requires_tracking() {
        let (service, _repo) = service_with(&[sample_order(1, &["A"])]).await;
        assert!(matches!(
            service.continue_candidate(1).await.unwrap_err(),
            OrderdeskError::InvalidTransition { .. }
        ));

        service.fill_tracking(1, 0).await.unwrap();
        let seed = service.continue_candidate(1).await.unwrap();
        assert_eq!(seed["id"], json!(1));
        assert_eq!(seed["status"], json!("in_progress"));
    }

    #[tokio::test]
    async fn test_tracking_archived_order_is_rejected() {
        let (service, _repo) = service_with(&[sample_order(1, &["A"])]).await;
        service.archive(1).await.unwrap();

        assert!(matches!(
            service.untracked_products(1).await.unwrap_err(),
            OrderdeskError::InvalidTransition { .. }
        ));
    }
}
