//! Platform paths for orderdesk files.
//!
//! ```text
//! ~/.config/orderdesk/
//! └── config.toml
//!
//! ~/.local/share/orderdesk/
//! └── orders.json
//! ```

use orderdesk_core::error::{OrderdeskError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "orderdesk";

pub struct OrderdeskPaths;

impl OrderdeskPaths {
    /// Returns the configuration directory (e.g., `~/.config/orderdesk/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| OrderdeskError::config("Cannot find config directory"))
    }

    /// Returns the data directory (e.g., `~/.local/share/orderdesk/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| OrderdeskError::config("Cannot find data directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
