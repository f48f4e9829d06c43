//! Session domain module.
//!
//! - `model`: `Session`, `ConversationState`, `UserId`

mod model;

pub use model::{ConversationState, Session, UserId};
