//! Order lifecycle rules.
//!
//! Status transitions (NEW → IN_PROGRESS → DONE), the orthogonal archive
//! flag and the per-status action menu.

use chrono::{DateTime, Utc};

use super::model::{Order, OrderStatus};
use crate::error::{OrderdeskError, Result};

/// An action the operator can take on a listed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    /// Mark products that already have a shipment document.
    FillTracking,
    /// Fill the in-progress form (delivery price, service fee).
    ContinueEdit,
    /// The parcel reached the operator.
    ReceivedByMe,
    /// The parcel reached the customer; completes the order.
    ReceivedByCustomer,
    Archive,
    Restore,
}

/// Actions available for an order, in display order.
///
/// A pure function of the status, whether every product is tracked, whether
/// the order was received and whether it is archived.
pub fn available_actions(
    status: OrderStatus,
    all_tracked: bool,
    received: bool,
    archived: bool,
) -> Vec<OrderAction> {
    use OrderAction::*;

    if archived {
        return vec![Restore];
    }
    match status {
        OrderStatus::New if all_tracked => vec![ContinueEdit, Archive],
        OrderStatus::New => vec![FillTracking, Archive],
        OrderStatus::InProgress if received => vec![ReceivedByCustomer, Archive],
        OrderStatus::InProgress => vec![ReceivedByMe, ReceivedByCustomer, Archive],
        OrderStatus::Done => vec![Archive],
    }
}

impl Order {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Whether every product has its shipment document flag set.
    ///
    /// Vacuously true for an order without products.
    pub fn all_tracked(&self) -> bool {
        self.untracked_products().is_empty()
    }

    /// Indices of products without a shipment document.
    pub fn untracked_products(&self) -> Vec<usize> {
        (0..self.products.len())
            .filter(|idx| !self.products_tracking.get(*idx).copied().unwrap_or(false))
            .collect()
    }

    /// Actions the menu offers for this order.
    pub fn available_actions(&self) -> Vec<OrderAction> {
        available_actions(
            self.status,
            self.all_tracked(),
            self.received_at.is_some(),
            self.is_archived(),
        )
    }

    /// Sets the tracking flag of product `idx`.
    ///
    /// Idempotent per product; the status is left unchanged. Returns whether
    /// the flag actually changed.
    pub fn mark_tracked(&mut self, idx: usize) -> Result<bool> {
        self.ensure_trackable()?;
        if idx >= self.products.len() {
            return Err(OrderdeskError::validation(format!(
                "order {} has no product #{}",
                self.id, idx
            )));
        }
        if self.products_tracking.len() < self.products.len() {
            self.products_tracking.resize(self.products.len(), false);
        }

        let changed = !self.products_tracking[idx];
        self.products_tracking[idx] = true;
        Ok(changed)
    }

    /// Checks that shipment documents may still be recorded: active and NEW.
    pub fn ensure_trackable(&self) -> Result<()> {
        self.ensure_active("fill_tracking")?;
        self.ensure_status(&[OrderStatus::New], "fill_tracking")
    }

    /// Checks that the in-progress form may be started for this order.
    ///
    /// Reachable only from NEW once every product is tracked.
    pub fn ensure_ready_for_progress(&self) -> Result<()> {
        self.ensure_active("continue")?;
        self.ensure_status(&[OrderStatus::New], "continue")?;
        if !self.all_tracked() {
            return Err(self.transition_error("continue"));
        }
        Ok(())
    }

    /// Records that the parcel reached the operator.
    ///
    /// `received_at` is forward-only: a second call keeps the first instant.
    pub fn mark_received_by_me(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_active("receive_me")?;
        self.ensure_status(&[OrderStatus::InProgress], "receive_me")?;
        self.received_at.get_or_insert(now);
        Ok(())
    }

    /// Records that the parcel reached the customer and completes the order.
    ///
    /// Backfills `received_at` when it was never set; both timestamps are
    /// forward-only.
    pub fn mark_received_by_customer(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_active("receive_customer")?;
        self.ensure_status(
            &[OrderStatus::InProgress, OrderStatus::Done],
            "receive_customer",
        )?;
        self.received_at.get_or_insert(now);
        self.received_by_customer_at.get_or_insert(now);
        self.status = OrderStatus::Done;
        Ok(())
    }

    /// Hides the order from active lists. Archiving twice keeps the first instant.
    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.archived_at.get_or_insert(now);
    }

    /// Returns an archived order to the active lists.
    pub fn restore(&mut self) {
        self.archived_at = None;
    }

    fn ensure_active(&self, transition: &'static str) -> Result<()> {
        if self.is_archived() {
            return Err(self.transition_error(transition));
        }
        Ok(())
    }

    fn ensure_status(&self, allowed: &[OrderStatus], transition: &'static str) -> Result<()> {
        if !allowed.contains(&self.status) {
            return Err(self.transition_error(transition));
        }
        Ok(())
    }

    fn transition_error(&self, transition: &'static str) -> OrderdeskError {
        OrderdeskError::InvalidTransition {
            order_id: self.id.to_string(),
            status: self.status.to_string(),
            transition,
        }
    }
}
