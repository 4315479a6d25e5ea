//! Path management for goalplan
//!
//! ## Path Resolution Order
//!
//! 1. `GOALPLAN_DATA_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/goalplan` on Linux,
//!    `~/Library/Application Support/goalplan` on macOS, `%APPDATA%\goalplan`
//!    on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::GoalPlanError;

/// Manages all paths used by goalplan
#[derive(Debug, Clone)]
pub struct GoalPlanPaths {
    /// Base directory for all goalplan data
    base_dir: PathBuf,
}

impl GoalPlanPaths {
    /// Create a new GoalPlanPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, GoalPlanError> {
        let base_dir = if let Ok(custom) = std::env::var("GOALPLAN_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create GoalPlanPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log (also holds allocation history)
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to goals.json
    pub fn goals_file(&self) -> PathBuf {
        self.data_dir().join("goals.json")
    }

    /// Get the path to profiles.json (income and fixed costs per user)
    pub fn profiles_file(&self) -> PathBuf {
        self.data_dir().join("profiles.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), GoalPlanError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| GoalPlanError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| GoalPlanError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if goalplan has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, GoalPlanError> {
    ProjectDirs::from("", "", "goalplan")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| GoalPlanError::Config("Could not determine a home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GoalPlanPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var("GOALPLAN_DATA_DIR", custom_path);
        let paths = GoalPlanPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());
        env::remove_var("GOALPLAN_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GoalPlanPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GoalPlanPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.goals_file(),
            temp_dir.path().join("data").join("goals.json")
        );
        assert_eq!(
            paths.profiles_file(),
            temp_dir.path().join("data").join("profiles.json")
        );
    }
}
