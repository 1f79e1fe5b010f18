//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from a TOML file (`~/.config/roster/config.toml` by default).

use crate::paths::RosterPaths;
use roster_core::config::RootConfig;
use roster_core::error::{Result, RosterError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing or empty file yields `RootConfig::default()`. A file that
/// exists but cannot be parsed, or holds invalid values, is an error.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default config file.
    pub fn new() -> Result<Self> {
        let path = RosterPaths::config_file().map_err(|e| RosterError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading the given file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<RootConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_from(&self.path)?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    /// Writes the configuration to the file, creating parent directories.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(config.clone());

        Ok(())
    }

    fn load_from(path: &Path) -> Result<RootConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
            return Ok(RootConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(RootConfig::default());
        }

        let config: RootConfig = toml::from_str(&content).map_err(|e| {
            RosterError::config(format!("Failed to parse {:?}: {}", path, e))
        })?;
        config.validate()?;

        tracing::debug!("[ConfigService] Loaded config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), RootConfig::default());
    }

    #[test]
    fn test_loads_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nlatency_min_ms = 0\nlatency_max_ms = 0\n\n[store]\npage_size = 25\n",
        )
        .unwrap();

        let config = ConfigService::with_path(&path).get_config().unwrap();

        assert_eq!(config.api.latency_max_ms, 0);
        assert_eq!(config.api.seed_count, 55);
        assert_eq!(config.store.page_size, 25);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nfailure_rate = 3.0\n").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));

        std::fs::write(&path, "[api\n").unwrap();
        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
    }

    #[test]
    fn test_save_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let service = ConfigService::with_path(&path);

        let mut config = RootConfig::default();
        config.store.export_delimiter = ';';
        config.api.seed = Some(99);
        service.save(&config).unwrap();

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap(), config);
    }
}
