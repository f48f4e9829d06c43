pub mod access;
pub mod conversation;
pub mod desk;
pub mod lifecycle;
pub mod presentation;
pub mod session_store;

pub use access::AccessGate;
pub use conversation::{ConversationEngine, ConversationEvent, Effect, Transition};
pub use desk::OrderDesk;
pub use lifecycle::OrderLifecycleService;
pub use session_store::SessionStore;
