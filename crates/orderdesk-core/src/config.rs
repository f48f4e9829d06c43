//! Application configuration model.
//!
//! Loaded from `config.toml`; every section and key is optional.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/orderdesk"
//!
//! [access]
//! secret_format = "%d*%m*%Y"
//!
//! [logging]
//! level = "warn"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Date pattern the shared secret is derived from.
pub const DEFAULT_SECRET_FORMAT: &str = "%d*%m*%Y";

/// Filter used when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    /// Directory holding `orders.json`; the platform data dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AccessConfig {
    /// chrono format string applied to the local date.
    #[serde(default = "default_secret_format")]
    pub secret_format: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            secret_format: default_secret_format(),
        }
    }
}

fn default_secret_format() -> String {
    DEFAULT_SECRET_FORMAT.to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
