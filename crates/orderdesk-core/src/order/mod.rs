//! Order domain module.
//!
//! # Module Structure
//!
//! - `model`: `Order` aggregate, `OrderStatus`, `CustomerInfo` and the form
//!   shapes `NewOrder` / `InProgressOrder`
//! - `lifecycle`: status transitions, archive flag and the action menu
//! - `definitions`: declared model definitions and the `FormRegistry`
//! - `repository`: `OrderRepository` trait for persistence
//!
//! # Usage
//!
//! ```ignore
//! use orderdesk_core::order::{Order, OrderStatus, OrderRepository};
//! use orderdesk_core::order::{FormKind, FormRegistry};
//! ```

mod definitions;
mod lifecycle;
mod model;
pub mod repository;

pub use definitions::{
    FormKind, FormRegistry, customer_info_definition, in_progress_order_definition,
    new_order_definition, order_definition,
};
pub use lifecycle::{OrderAction, available_actions};
pub use model::{
    CustomerInfo, InProgressOrder, NewOrder, Order, OrderId, OrderStatus, new_order_id,
};
pub use repository::OrderRepository;
