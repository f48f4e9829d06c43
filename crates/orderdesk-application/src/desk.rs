//! Top-level dispatcher: one inbound action in, transport instructions out.

use crate::access::AccessGate;
use crate::conversation::{ConversationEngine, ConversationEvent, Effect, Transition};
use crate::lifecycle::OrderLifecycleService;
use crate::presentation::{self, field_prompt, main_menu, order_message, tracking_keyboard};
use crate::session_store::SessionStore;
use orderdesk_core::action::{CallbackAction, Command, Incoming};
use orderdesk_core::clock::Clock;
use orderdesk_core::error::{OrderdeskError, Result};
use orderdesk_core::form::FlatValues;
use orderdesk_core::order::{FormKind, FormRegistry, OrderRepository};
use orderdesk_core::session::{ConversationState, Session, UserId};
use orderdesk_core::transport::{Outgoing, OutgoingMessage};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The order desk as seen by a transport.
///
/// Each call works on a copy of the user's session; the copy replaces the
/// stored session only when the action succeeds, so a failed write never
/// leaves a half-applied form behind.
pub struct OrderDesk {
    sessions: SessionStore,
    registry: Arc<FormRegistry>,
    engine: ConversationEngine,
    lifecycle: OrderLifecycleService,
    gate: AccessGate,
}

impl OrderDesk {
    pub fn new(
        registry: Arc<FormRegistry>,
        repository: Arc<dyn OrderRepository>,
        clock: Arc<dyn Clock>,
        gate: AccessGate,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            engine: ConversationEngine::new(registry.clone(), repository.clone(), clock.clone()),
            lifecycle: OrderLifecycleService::new(repository, clock),
            registry,
            gate,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Processes one action of `user_id`.
    ///
    /// Actions of the same user are serialized; failures are answered with a
    /// notice instead of an error. A stranger whose secret is rejected keeps
    /// no session.
    pub async fn handle(&self, user_id: UserId, incoming: Incoming) -> Vec<Outgoing> {
        let slot = self.sessions.session(user_id).await;
        let mut stored = slot.lock().await;
        let mut working = stored.clone();
        let secret_attempt = !working.authenticated && matches!(incoming, Incoming::Text(_));

        debug!(user_id, state = ?working.state, ?incoming, "dispatch");
        let outgoing = match self.route(&mut working, incoming).await {
            Ok(outgoing) => outgoing,
            Err(err) => return vec![Self::failure_notice(user_id, &err)],
        };

        let rejected = secret_attempt && !working.authenticated;
        *stored = working;
        drop(stored);
        if rejected {
            self.sessions.evict(user_id).await;
            let sessions = self.sessions.len().await;
            debug!(user_id, sessions, "stranger session evicted");
        }
        outgoing
    }

    async fn route(&self, session: &mut Session, incoming: Incoming) -> Result<Vec<Outgoing>> {
        if let Incoming::Command(Command::Start) = incoming {
            return Ok(self.start(session));
        }
        if !session.authenticated {
            return Ok(self.authenticate(session, incoming));
        }

        match incoming {
            Incoming::Command(Command::Skip) => {
                let transition = self.engine.handle(session, ConversationEvent::Skip).await?;
                self.present(transition)
            }
            Incoming::Command(Command::Other(name)) => {
                Ok(vec![Outgoing::notice(format!("Unknown command /{}", name))])
            }
            Incoming::Text(text) => match session.state {
                ConversationState::SelectingField | ConversationState::AddingListItem => {
                    let transition = self
                        .engine
                        .handle(session, ConversationEvent::Text(text))
                        .await?;
                    self.present(transition)
                }
                ConversationState::Menu | ConversationState::Authenticating => {
                    session.clear_form();
                    Ok(vec![Outgoing::Send(main_menu())])
                }
            },
            Incoming::Callback { action, .. } if session.state == ConversationState::Menu => {
                self.callback(session, action).await
            }
            Incoming::Callback { action, .. } => {
                debug!(user_id = session.user_id, %action, "callback ignored during form");
                Ok(vec![Outgoing::notice(presentation::FORM_IN_PROGRESS)])
            }
            Incoming::Command(Command::Start) => Ok(self.start(session)),
        }
    }

    /// `/start`: the secret prompt for strangers, the main menu otherwise.
    fn start(&self, session: &mut Session) -> Vec<Outgoing> {
        if !session.authenticated {
            session.state = ConversationState::Authenticating;
            return vec![Outgoing::notice(presentation::SECRET_PROMPT)];
        }
        if session.active_form.is_some() {
            debug!(user_id = session.user_id, "form abandoned");
        }
        session.clear_form();
        vec![Outgoing::Send(main_menu())]
    }

    fn authenticate(&self, session: &mut Session, incoming: Incoming) -> Vec<Outgoing> {
        let Incoming::Text(secret) = incoming else {
            return vec![Outgoing::notice(presentation::SECRET_PROMPT)];
        };
        if !self.gate.verify(&secret) {
            warn!(user_id = session.user_id, "wrong secret");
            return vec![Outgoing::notice(presentation::SECRET_REJECTED)];
        }

        session.authenticated = true;
        session.clear_form();
        tracing::info!(user_id = session.user_id, "user admitted");
        vec![
            Outgoing::notice(presentation::SECRET_ACCEPTED),
            Outgoing::Send(main_menu()),
        ]
    }

    async fn callback(&self, session: &mut Session, action: CallbackAction) -> Result<Vec<Outgoing>> {
        let order_definition = self.registry.order_definition();
        match action {
            CallbackAction::AddOrder => {
                let transition = self
                    .engine
                    .start(session, FormKind::NewOrder, FlatValues::new())
                    .await?;
                self.present(transition)
            }
            CallbackAction::ShowOrders(view) => {
                let orders = self.lifecycle.list(view).await?;
                if orders.is_empty() {
                    return Ok(vec![Outgoing::notice(presentation::NO_ORDERS)]);
                }
                orders
                    .iter()
                    .map(|order| order_message(order, order_definition).map(Outgoing::Send))
                    .collect()
            }
            CallbackAction::Continue(id) => {
                let seed = self.lifecycle.continue_candidate(id).await?;
                let transition = self
                    .engine
                    .start(session, FormKind::InProgressOrder, seed)
                    .await?;
                self.present(transition)
            }
            CallbackAction::FillTracking { order_id, item: None } => {
                let (order, untracked) = self.lifecycle.untracked_products(order_id).await?;
                if untracked.is_empty() {
                    return Ok(vec![Outgoing::notice(presentation::ALL_TRACKED)]);
                }
                Ok(vec![Outgoing::Send(OutgoingMessage::with_keyboard(
                    presentation::TRACKING_PROMPT,
                    tracking_keyboard(&order, &untracked),
                ))])
            }
            CallbackAction::FillTracking {
                order_id,
                item: Some(idx),
            } => {
                let order = self.lifecycle.fill_tracking(order_id, idx).await?;
                let untracked = order.untracked_products();
                let message = if untracked.is_empty() {
                    OutgoingMessage::text(presentation::ALL_TRACKED)
                } else {
                    OutgoingMessage::with_keyboard(
                        presentation::TRACKING_PROMPT,
                        tracking_keyboard(&order, &untracked),
                    )
                };
                Ok(vec![Outgoing::EditOrigin(message)])
            }
            CallbackAction::Archive(id) => {
                self.lifecycle.archive(id).await?;
                Ok(vec![Outgoing::DeleteOrigin])
            }
            CallbackAction::Restore(id) => {
                self.lifecycle.restore(id).await?;
                Ok(vec![Outgoing::DeleteOrigin])
            }
            CallbackAction::Receive { order_id, by } => {
                let order = self.lifecycle.receive(order_id, by).await?;
                Ok(vec![Outgoing::EditOrigin(order_message(
                    &order,
                    order_definition,
                )?)])
            }
        }
    }

    fn present(&self, transition: Transition) -> Result<Vec<Outgoing>> {
        let mut outgoing = Vec::new();
        for effect in transition.effects {
            match effect {
                Effect::PromptField(descriptor) => {
                    outgoing.push(Outgoing::notice(field_prompt(&descriptor)));
                }
                Effect::ListItemAdded { .. } => {
                    outgoing.push(Outgoing::notice(presentation::LIST_ITEM_ADDED));
                }
                Effect::FormCompleted(order) => {
                    outgoing.push(Outgoing::notice(presentation::ORDER_SAVED));
                    outgoing.push(Outgoing::Send(order_message(
                        &order,
                        self.registry.order_definition(),
                    )?));
                    outgoing.push(Outgoing::Send(main_menu()));
                }
                Effect::NothingToDo => outgoing.push(Outgoing::Send(main_menu())),
            }
        }
        Ok(outgoing)
    }

    fn failure_notice(user_id: UserId, err: &OrderdeskError) -> Outgoing {
        match err {
            OrderdeskError::NotFound { id, .. } => {
                warn!(user_id, order_id = %id, "order not found");
                Outgoing::notice(format!("Order {} not found", id))
            }
            OrderdeskError::InvalidTransition {
                order_id,
                transition,
                ..
            } => {
                warn!(user_id, %order_id, transition, "transition rejected");
                Outgoing::notice(format!(
                    "This action is no longer available for order {}",
                    order_id
                ))
            }
            OrderdeskError::InvalidAction(message) | OrderdeskError::Validation(message) => {
                warn!(user_id, %message, "action rejected");
                Outgoing::notice(presentation::OPERATION_FAILED)
            }
            other => {
                error!(user_id, error = %other, "action failed");
                Outgoing::notice(presentation::OPERATION_FAILED)
            }
        }
    }
}
