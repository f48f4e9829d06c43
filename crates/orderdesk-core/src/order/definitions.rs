//! Concrete model definitions for orders and the form registry.

use std::sync::Arc;

use crate::error::Result;
use crate::form::{FieldDescriptor, FieldKind, ModelDefinition, derive_field_paths};

/// The forms an operator can fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// Creates a fresh order.
    NewOrder,
    /// Moves an existing NEW order to in-progress.
    InProgressOrder,
}

pub fn customer_info_definition() -> Result<ModelDefinition> {
    ModelDefinition::builder("customer_info")
        .scalar("full_name", "Full name")
        .scalar("phone_number", "Phone number")
        .scalar("shipping_address", "Shipping address")
        .build()
}

pub fn new_order_definition(customer_info: Arc<ModelDefinition>) -> Result<ModelDefinition> {
    ModelDefinition::builder("new_order")
        .nested("customer_info", "Customer", customer_info)
        .scalar("shop_url", "Shop link")
        .list("products", "Products")
        .scalar("income", "Paid by customer")
        .scalar("price", "Price of all products")
        .scalar("delivery_service", "Delivery service")
        .build()
}

pub fn in_progress_order_definition() -> Result<ModelDefinition> {
    ModelDefinition::builder("in_progress_order")
        .hidden("id", "ID", FieldKind::Scalar)
        .scalar("delivery_price", "Delivery price")
        .scalar("service_fee", "Service fee")
        .hidden("status", "Status", FieldKind::Scalar)
        .build()
}

/// The canonical order shape. Nothing is editable; used for rendering.
pub fn order_definition(customer_info: Arc<ModelDefinition>) -> Result<ModelDefinition> {
    ModelDefinition::builder("order")
        .hidden("id", "ID", FieldKind::Scalar)
        .hidden("created_at", "Created", FieldKind::Scalar)
        .hidden("customer_info", "Customer", FieldKind::Nested(customer_info))
        .hidden("shop_url", "Shop link", FieldKind::Scalar)
        .hidden("products", "Products", FieldKind::List)
        .hidden("income", "Paid by customer", FieldKind::Scalar)
        .hidden("price", "Price of all products", FieldKind::Scalar)
        .hidden("delivery_service", "Delivery service", FieldKind::Scalar)
        .hidden("delivery_price", "Delivery price", FieldKind::Scalar)
        .hidden("service_fee", "Service fee", FieldKind::Scalar)
        .hidden("received_at", "Received", FieldKind::Scalar)
        .hidden("received_by_customer_at", "Received by customer", FieldKind::Scalar)
        .hidden("status", "Status", FieldKind::Scalar)
        .hidden("products_tracking", "Shipment documents", FieldKind::List)
        .hidden("archived_at", "Archived", FieldKind::Scalar)
        .build()
}

/// Definitions and their field descriptors, built and validated once at startup.
#[derive(Debug, Clone)]
pub struct FormRegistry {
    new_order: Arc<ModelDefinition>,
    in_progress_order: Arc<ModelDefinition>,
    order: Arc<ModelDefinition>,
    new_order_fields: Vec<FieldDescriptor>,
    in_progress_order_fields: Vec<FieldDescriptor>,
}

impl FormRegistry {
    /// Builds every definition.
    ///
    /// # Errors
    ///
    /// Returns `OrderdeskError::Config` on a definition defect; callers treat
    /// it as fatal.
    pub fn new() -> Result<Self> {
        let customer_info = Arc::new(customer_info_definition()?);
        let new_order = Arc::new(new_order_definition(customer_info.clone())?);
        let in_progress_order = Arc::new(in_progress_order_definition()?);
        let order = Arc::new(order_definition(customer_info)?);

        Ok(Self {
            new_order_fields: derive_field_paths(&new_order),
            in_progress_order_fields: derive_field_paths(&in_progress_order),
            new_order,
            in_progress_order,
            order,
        })
    }

    pub fn definition(&self, form: FormKind) -> &ModelDefinition {
        match form {
            FormKind::NewOrder => &self.new_order,
            FormKind::InProgressOrder => &self.in_progress_order,
        }
    }

    /// Ordered leaf fields the operator is asked for.
    pub fn descriptors(&self, form: FormKind) -> &[FieldDescriptor] {
        match form {
            FormKind::NewOrder => &self.new_order_fields,
            FormKind::InProgressOrder => &self.in_progress_order_fields,
        }
    }

    pub fn descriptor(&self, form: FormKind, path: &str) -> Option<&FieldDescriptor> {
        self.descriptors(form).iter().find(|d| d.path == path)
    }

    /// The canonical order definition.
    pub fn order_definition(&self) -> &ModelDefinition {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::DescriptorKind;
    use crate::form::values::{flatten, unflatten};
    use crate::order::model::{CustomerInfo, InProgressOrder, NewOrder, Order, OrderStatus};
    use chrono::Utc;

    fn full_new_order() -> NewOrder {
        NewOrder {
            customer_info: CustomerInfo {
                full_name: Some("Olena".into()),
                phone_number: Some("+380501112233".into()),
                shipping_address: Some("Lviv".into()),
            },
            shop_url: Some("https://shop.example".into()),
            products: vec!["A".into(), "B".into()],
            income: Some("1200".into()),
            price: Some("1000".into()),
            delivery_service: Some("Nova Poshta".into()),
        }
    }

    #[test]
    fn test_new_order_prompt_order() {
        let registry = FormRegistry::new().unwrap();
        let got: Vec<(&str, &str)> = registry
            .descriptors(FormKind::NewOrder)
            .iter()
            .map(|d| (d.path.as_str(), d.prompt.as_str()))
            .collect();

        assert_eq!(
            got,
            vec![
                ("customer_info.full_name", "Customer -> Full name"),
                ("customer_info.phone_number", "Customer -> Phone number"),
                ("customer_info.shipping_address", "Customer -> Shipping address"),
                ("shop_url", "Shop link"),
                ("products", "Products"),
                ("income", "Paid by customer"),
                ("price", "Price of all products"),
                ("delivery_service", "Delivery service"),
            ]
        );
        assert_eq!(
            registry.descriptor(FormKind::NewOrder, "products").unwrap().kind,
            DescriptorKind::ListOfScalar
        );
    }

    #[test]
    fn test_in_progress_form_skips_id_and_status() {
        let registry = FormRegistry::new().unwrap();
        let paths: Vec<_> = registry
            .descriptors(FormKind::InProgressOrder)
            .iter()
            .map(|d| d.path.as_str())
            .collect();
        assert_eq!(paths, vec!["delivery_price", "service_fee"]);
    }

    #[test]
    fn test_order_definition_is_display_only() {
        let registry = FormRegistry::new().unwrap();
        assert!(derive_field_paths(registry.order_definition()).is_empty());
        assert_eq!(registry.order_definition().fields().len(), 15);
    }

    #[test]
    fn test_order_definition_covers_every_serialized_field() {
        let registry = FormRegistry::new().unwrap();
        let order = Order::from_draft(full_new_order(), 1, Utc::now());
        let record = serde_json::to_value(&order).unwrap();
        let record = record.as_object().unwrap();

        assert_eq!(record.len(), registry.order_definition().fields().len());
        for field in registry.order_definition().fields() {
            assert!(record.contains_key(field.name), "missing {}", field.name);
        }
    }

    #[test]
    fn test_new_order_flatten_unflatten_round_trip() {
        let registry = FormRegistry::new().unwrap();
        let draft = full_new_order();
        let value = serde_json::to_value(&draft).unwrap();

        let flat = flatten(&value, registry.descriptors(FormKind::NewOrder));
        assert_eq!(flat.len(), registry.descriptors(FormKind::NewOrder).len());

        let rebuilt: NewOrder = serde_json::from_value(unflatten(&flat)).unwrap();
        assert_eq!(rebuilt, draft);
    }

    #[test]
    fn test_in_progress_round_trip_with_seeded_fields() {
        let registry = FormRegistry::new().unwrap();
        let patch = InProgressOrder {
            id: 99,
            delivery_price: Some("70".into()),
            service_fee: Some("15".into()),
            status: OrderStatus::InProgress,
        };
        let value = serde_json::to_value(&patch).unwrap();

        let mut flat = flatten(&value, registry.descriptors(FormKind::InProgressOrder));
        flat.insert("id".into(), value["id"].clone());
        flat.insert("status".into(), value["status"].clone());

        let rebuilt: InProgressOrder = serde_json::from_value(unflatten(&flat)).unwrap();
        assert_eq!(rebuilt, patch);
    }
}
