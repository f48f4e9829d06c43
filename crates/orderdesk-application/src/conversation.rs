//! Form-filling conversation engine.
//!
//! Walks an operator through the fields of a form one prompt at a time and
//! turns the collected answers into an order:
//!
//! ```text
//!            start / answer            all fields collected
//!   Menu ───────────────► SelectingField ──────────────────► Menu (order stored)
//!                            │   ▲
//!                  list item │   │ /skip
//!                            ▼   │
//!                        AddingListItem
//! ```
//!
//! The engine mutates the session it is given; callers decide whether to
//! keep the mutation (see `OrderDesk`).

use orderdesk_core::clock::Clock;
use orderdesk_core::error::{OrderdeskError, Result};
use orderdesk_core::form::{DescriptorKind, FieldDescriptor, FlatValues, values::unflatten};
use orderdesk_core::order::{
    FormKind, FormRegistry, InProgressOrder, NewOrder, Order, OrderRepository, new_order_id,
};
use orderdesk_core::session::{ConversationState, Session};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// An input the engine reacts to while a form is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// A text answer for the current field.
    Text(String),
    /// Ends list entry.
    Skip,
}

/// Observable outcome of one engine step.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the operator for this field.
    PromptField(FieldDescriptor),
    /// An item was appended to the list field at `path`.
    ListItemAdded { path: String },
    /// The form was completed and the order stored.
    FormCompleted(Order),
    /// No form step applies; the session is back at the menu.
    NothingToDo,
}

/// Resulting state plus the effects to present.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: ConversationState, effect: Effect) -> Self {
        Self {
            state,
            effects: vec![effect],
        }
    }

    fn nothing_to_do(session: &mut Session) -> Self {
        session.clear_form();
        Self::new(ConversationState::Menu, Effect::NothingToDo)
    }
}

pub struct ConversationEngine {
    registry: Arc<FormRegistry>,
    repository: Arc<dyn OrderRepository>,
    clock: Arc<dyn Clock>,
}

impl ConversationEngine {
    pub fn new(
        registry: Arc<FormRegistry>,
        repository: Arc<dyn OrderRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            repository,
            clock,
        }
    }

    pub fn registry(&self) -> &FormRegistry {
        &self.registry
    }

    /// Starts filling `form`. Seeded paths count as answered and are never prompted.
    pub async fn start(
        &self,
        session: &mut Session,
        form: FormKind,
        seed: FlatValues,
    ) -> Result<Transition> {
        info!(user_id = session.user_id, ?form, "form started");
        session.begin_form(form, seed);
        self.advance(session).await
    }

    /// Applies one input to the active form.
    pub async fn handle(&self, session: &mut Session, event: ConversationEvent) -> Result<Transition> {
        let Some(form) = session.active_form else {
            return Ok(Transition::nothing_to_do(session));
        };
        let Some((path, value)) = session.current_field() else {
            return Ok(Transition::nothing_to_do(session));
        };
        let path = path.to_string();
        let awaiting_scalar = value.is_null();
        let Some(descriptor) = self.registry.descriptor(form, &path).cloned() else {
            return Ok(Transition::nothing_to_do(session));
        };

        match (event, descriptor.kind) {
            (ConversationEvent::Text(text), DescriptorKind::ListOfScalar) => {
                if let Some(Value::Array(items)) = session.current_field_mut() {
                    items.push(Value::String(text));
                }
                session.state = ConversationState::AddingListItem;
                debug!(user_id = session.user_id, path = %descriptor.path, "list item added");
                Ok(Transition::new(
                    ConversationState::AddingListItem,
                    Effect::ListItemAdded {
                        path: descriptor.path,
                    },
                ))
            }
            (ConversationEvent::Text(text), DescriptorKind::Scalar) if awaiting_scalar => {
                if let Some(slot) = session.current_field_mut() {
                    *slot = Value::String(text);
                }
                self.advance(session).await
            }
            (ConversationEvent::Text(_), DescriptorKind::Scalar) => {
                Ok(Transition::nothing_to_do(session))
            }
            (ConversationEvent::Skip, DescriptorKind::ListOfScalar) => self.advance(session).await,
            // Scalars can not be skipped; ask again.
            (ConversationEvent::Skip, DescriptorKind::Scalar) => Ok(Transition::new(
                session.state,
                Effect::PromptField(descriptor),
            )),
        }
    }

    /// Prompts for the first unanswered field, or completes the form.
    pub async fn advance(&self, session: &mut Session) -> Result<Transition> {
        let Some(form) = session.active_form else {
            return Ok(Transition::nothing_to_do(session));
        };

        self.provisional(form, &session.collected_values)?;

        let next = self
            .registry
            .descriptors(form)
            .iter()
            .find(|d| !session.has_value(&d.path))
            .cloned();

        if let Some(descriptor) = next {
            session.open_slot(&descriptor);
            session.state = ConversationState::SelectingField;
            return Ok(Transition::new(
                ConversationState::SelectingField,
                Effect::PromptField(descriptor),
            ));
        }

        let order = self.finalize(form, &session.collected_values).await?;
        self.repository.upsert(&order).await?;
        info!(
            user_id = session.user_id,
            order_id = order.id,
            status = %order.status,
            "form completed"
        );

        session.clear_form();
        Ok(Transition::new(
            ConversationState::Menu,
            Effect::FormCompleted(order),
        ))
    }

    /// Checks that the answers so far still fit the form's shape.
    fn provisional(&self, form: FormKind, values: &FlatValues) -> Result<()> {
        let value = unflatten(values);
        let checked = match form {
            FormKind::NewOrder => serde_json::from_value::<NewOrder>(value).map(drop),
            FormKind::InProgressOrder => serde_json::from_value::<InProgressOrder>(value).map(drop),
        };
        checked.map_err(|e| {
            OrderdeskError::validation(format!(
                "{} form holds invalid values: {}",
                self.registry.definition(form).name(),
                e
            ))
        })
    }

    async fn finalize(&self, form: FormKind, values: &FlatValues) -> Result<Order> {
        let value = unflatten(values);
        match form {
            FormKind::NewOrder => {
                let draft: NewOrder = serde_json::from_value(value)?;
                Ok(Order::from_draft(draft, new_order_id(), self.clock.now()))
            }
            FormKind::InProgressOrder => {
                let patch: InProgressOrder = serde_json::from_value(value)?;
                let order = self
                    .repository
                    .get(patch.id)
                    .await?
                    .ok_or_else(|| OrderdeskError::not_found("order", patch.id.to_string()))?;
                order.ensure_ready_for_progress()?;
                order.overlay(&patch)
            }
        }
    }
}
