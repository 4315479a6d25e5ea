//! Storage initialization
//!
//! First-run setup: directories, a default config file, and empty data files.

use crate::config::{GoalPlanPaths, Settings};
use crate::error::GoalPlanError;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched, so running it twice is harmless.
pub fn initialize_storage(paths: &GoalPlanPaths) -> Result<(), GoalPlanError> {
    paths.ensure_directories()?;

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
    }

    if !paths.goals_file().exists() {
        write_json_atomic(paths.goals_file(), &serde_json::json!({ "goals": [] }))?;
    }

    if !paths.profiles_file().exists() {
        write_json_atomic(paths.profiles_file(), &serde_json::json!({ "profiles": [] }))?;
    }

    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &GoalPlanPaths) -> bool {
    !paths.is_initialized()
}
