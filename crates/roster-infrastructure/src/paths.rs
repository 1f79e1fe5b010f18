//! Path management for roster configuration files.
//!
//! ```text
//! ~/.config/roster/            # Config directory (platform config dir)
//! ├── config.toml              # Application configuration
//! └── exports/                 # Default target of CSV exports
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for roster.
pub struct RosterPaths;

impl RosterPaths {
    const APP_DIR: &'static str = "roster";

    /// Returns the roster configuration directory (e.g. `~/.config/roster/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory for CSV exports.
    pub fn export_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_the_config_dir() {
        if let (Ok(dir), Ok(file)) = (RosterPaths::config_dir(), RosterPaths::config_file()) {
            assert!(dir.ends_with("roster"));
            assert_eq!(file.parent(), Some(dir.as_path()));
        }
    }
}
