pub mod action;
pub mod clock;
pub mod config;
pub mod error;
pub mod form;
pub mod order;
pub mod session;
pub mod transport;

// Re-export common error type
pub use error::OrderdeskError;
