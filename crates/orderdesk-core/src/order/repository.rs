//! Order repository trait.
//!
//! Defines the interface for order persistence operations.

use super::model::{Order, OrderId, OrderStatus};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing order persistence.
///
/// Decouples the conversation and lifecycle logic from the storage
/// mechanism (JSON document, database, remote API).
///
/// # Implementation Notes
///
/// - Writes are whole-entity upserts keyed by `Order::id` (last write wins)
/// - Archived orders are never physically removed
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Creates or replaces an order.
    ///
    /// # Returns
    ///
    /// - `Ok(OrderId)`: Identifier of the stored order
    /// - `Err(_)`: Error occurred during the write
    async fn upsert(&self, order: &Order) -> Result<OrderId>;

    /// Finds an order by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Order))`: Order found
    /// - `Ok(None)`: Order not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders with the given status.
    ///
    /// Archived orders are only included when `include_archived` is set.
    async fn list_by_status(&self, status: OrderStatus, include_archived: bool)
    -> Result<Vec<Order>>;

    /// Lists every archived order regardless of status.
    async fn list_archived(&self) -> Result<Vec<Order>>;
}
