//! Outgoing message model.
//!
//! What the desk asks a transport to do: send a new message, edit the
//! message whose button was pressed, or delete it. Rendering details
//! (markup, colors) belong to the transport.

use crate::action::CallbackAction;

/// Transport-assigned identifier of a delivered message.
pub type MessageId = u64;

/// A button on a message keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: CallbackAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// A text message with an optional keyboard, one button per row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutgoingMessage {
    pub text: String,
    pub keyboard: Vec<Button>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }
}

/// One instruction for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// Send a new message.
    Send(OutgoingMessage),
    /// Replace the message whose button was pressed.
    EditOrigin(OutgoingMessage),
    /// Remove the message whose button was pressed.
    DeleteOrigin,
}

impl Outgoing {
    /// Shorthand for a plain text reply.
    pub fn notice(text: impl Into<String>) -> Self {
        Self::Send(OutgoingMessage::text(text))
    }

    /// The message carried by this instruction, if any.
    pub fn message(&self) -> Option<&OutgoingMessage> {
        match self {
            Self::Send(message) | Self::EditOrigin(message) => Some(message),
            Self::DeleteOrigin => None,
        }
    }
}
