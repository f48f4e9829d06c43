//! Session domain model.
//!
//! A `Session` is the per-user, in-memory state of the conversation: whether
//! the user passed the access gate, which form is being filled and the
//! values collected so far. Sessions are not persisted; a restart loses any
//! in-flight form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::{FieldDescriptor, FlatValues};
use crate::order::FormKind;

/// Identifier of a chat user.
pub type UserId = i64;

/// Where the conversation with a user currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Waiting for the shared secret; initial state for first-time users.
    Authenticating,
    /// No active form; waiting for a menu action.
    Menu,
    /// Waiting for a single answer to the current field.
    SelectingField,
    /// Accumulating items of a list field until a skip signal.
    AddingListItem,
}

/// Per-user conversation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub authenticated: bool,
    pub state: ConversationState,
    /// Form being filled, if any.
    pub active_form: Option<FormKind>,
    /// Dotted path to value; insertion order is prompt order.
    pub collected_values: FlatValues,
}

impl Session {
    /// A blank session for a user seen for the first time.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            authenticated: false,
            state: ConversationState::Authenticating,
            active_form: None,
            collected_values: FlatValues::new(),
        }
    }

    /// Starts filling `form`, seeding already known values.
    pub fn begin_form(&mut self, form: FormKind, seed: FlatValues) {
        self.active_form = Some(form);
        self.collected_values = seed;
        self.state = ConversationState::SelectingField;
    }

    /// Drops any in-flight form and returns to the menu.
    pub fn clear_form(&mut self) {
        self.active_form = None;
        self.collected_values.clear();
        self.state = ConversationState::Menu;
    }

    /// Whether `path` has been prompted for or seeded.
    pub fn has_value(&self, path: &str) -> bool {
        self.collected_values.contains_key(path)
    }

    /// Opens the slot for `descriptor` with its initial value.
    pub fn open_slot(&mut self, descriptor: &FieldDescriptor) {
        self.collected_values
            .insert(descriptor.path.clone(), descriptor.initial_value());
    }

    /// The field awaiting input: the most recently inserted key.
    pub fn current_field(&self) -> Option<(&str, &Value)> {
        self.collected_values
            .last()
            .map(|(path, value)| (path.as_str(), value))
    }

    pub fn current_field_mut(&mut self) -> Option<&mut Value> {
        self.collected_values.last_mut().map(|(_, value)| value)
    }
}
