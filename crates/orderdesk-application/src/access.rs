use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use orderdesk_core::clock::Clock;
use orderdesk_core::error::{OrderdeskError, Result};
use std::sync::Arc;

/// Date-based shared secret checked on first contact.
///
/// The secret is today's local date rendered with a chrono format string
/// (`%d*%m*%Y` by default). It keeps casual visitors out; it is not an
/// authentication scheme.
pub struct AccessGate {
    format: String,
    clock: Arc<dyn Clock>,
}

impl AccessGate {
    /// # Errors
    ///
    /// `Config` if `format` is not a valid chrono format string.
    pub fn new(format: impl Into<String>, clock: Arc<dyn Clock>) -> Result<Self> {
        let format = format.into();
        if format.trim().is_empty()
            || StrftimeItems::new(&format).any(|item| matches!(item, Item::Error))
        {
            return Err(OrderdeskError::config(format!(
                "invalid secret format '{}'",
                format
            )));
        }
        Ok(Self { format, clock })
    }

    pub fn expected_secret(&self) -> String {
        self.clock
            .now()
            .with_timezone(&Local)
            .format(&self.format)
            .to_string()
    }

    pub fn verify(&self, input: &str) -> bool {
        input.trim() == self.expected_secret()
    }
}
