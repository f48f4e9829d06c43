//! Configuration service.
//!
//! Loads `AppConfig` from a TOML file, writing a default file on first run.

use crate::paths::OrderdeskPaths;
use orderdesk_core::config::AppConfig;
use orderdesk_core::error::{OrderdeskError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service reading `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading the platform `config.toml`.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(OrderdeskPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration, loading it on first access.
    ///
    /// # Errors
    ///
    /// - `Serialization`: the file exists but is not valid TOML for `AppConfig`
    /// - `Io`: the default file could not be written
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| OrderdeskError::internal("config cache poisoned"))?;
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_or_create(&self.path)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| OrderdeskError::internal("config cache poisoned"))?;
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_or_create(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            let default_config = AppConfig::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, toml::to_string_pretty(&default_config)?)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");
        let service = ConfigService::new(path.clone());

        let config = service.get_config().unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let written: AppConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, config);
    }

    #[test]
    fn test_existing_file_is_read_and_cached() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[access]\nsecret_format = \"%Y\"\n").unwrap();
        let service = ConfigService::new(path.clone());

        assert_eq!(service.get_config().unwrap().access.secret_format, "%Y");

        fs::write(&path, "[access]\nsecret_format = \"%m\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().access.secret_format, "%Y");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().access.secret_format, "%m");
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[logging\nlevel = 3").unwrap();

        let err = ConfigService::new(path).get_config().unwrap_err();
        assert!(matches!(err, OrderdeskError::Serialization { .. }));
    }
}
