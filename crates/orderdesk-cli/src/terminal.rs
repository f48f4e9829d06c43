//! Terminal stand-in for a chat transport.
//!
//! Every delivered message gets an id so its buttons can be pressed later
//! with `@<message>.<button>`; edits and deletions target the message whose
//! button was pressed.

use orderdesk_core::action::Incoming;
use orderdesk_core::error::{OrderdeskError, Result};
use orderdesk_core::transport::{MessageId, Outgoing, OutgoingMessage};
use std::collections::BTreeMap;

/// What changed on screen after a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    Shown {
        id: MessageId,
        message: OutgoingMessage,
        edited: bool,
    },
    Deleted(MessageId),
}

#[derive(Debug, Default)]
pub struct TerminalTransport {
    messages: BTreeMap<MessageId, OutgoingMessage>,
    last_id: MessageId,
}

impl TerminalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns a typed line into an inbound action.
    ///
    /// `@3.2` presses button 2 (1-based) of message 3, `!archive.5` sends a
    /// raw callback token, anything else is a command or text answer.
    pub fn parse(&self, line: &str) -> Result<Incoming> {
        let line = line.trim();
        if let Some(reference) = line.strip_prefix('@') {
            let (message_id, button) = reference
                .split_once('.')
                .and_then(|(m, b)| Some((m.parse::<MessageId>().ok()?, b.parse::<usize>().ok()?)))
                .ok_or_else(|| {
                    OrderdeskError::invalid_action(format!("expected @<message>.<button>, got '{}'", line))
                })?;
            let action = self
                .messages
                .get(&message_id)
                .and_then(|m| m.keyboard.get(button.checked_sub(1)?))
                .map(|b| b.action)
                .ok_or_else(|| {
                    OrderdeskError::invalid_action(format!("no button {} on message {}", button, message_id))
                })?;
            return Ok(Incoming::Callback {
                action,
                origin: Some(message_id),
            });
        }
        if let Some(token) = line.strip_prefix('!') {
            return Incoming::callback(token, None);
        }
        Ok(Incoming::from_text(line))
    }

    /// Applies the desk's instructions for an action pressed on `origin`.
    pub fn deliver(&mut self, origin: Option<MessageId>, outgoing: Vec<Outgoing>) -> Vec<ScreenEvent> {
        let mut events = Vec::new();
        for instruction in outgoing {
            match instruction {
                Outgoing::Send(message) => events.push(self.show(message)),
                Outgoing::EditOrigin(message) => match origin {
                    Some(id) if self.messages.contains_key(&id) => {
                        self.messages.insert(id, message.clone());
                        events.push(ScreenEvent::Shown {
                            id,
                            message,
                            edited: true,
                        });
                    }
                    _ => events.push(self.show(message)),
                },
                Outgoing::DeleteOrigin => {
                    if let Some(id) = origin
                        && self.messages.remove(&id).is_some()
                    {
                        events.push(ScreenEvent::Deleted(id));
                    }
                }
            }
        }
        events
    }

    fn show(&mut self, message: OutgoingMessage) -> ScreenEvent {
        self.last_id += 1;
        let id = self.last_id;
        self.messages.insert(id, message.clone());
        ScreenEvent::Shown {
            id,
            message,
            edited: false,
        }
    }
}
