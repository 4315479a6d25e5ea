//! Custom error types for goalplan
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Business-logic edge cases of an allocation
//! run (no goals, negative budget, malformed goals) are not errors: they are
//! reported as warnings on the result. Only missing or unreadable inputs and
//! storage failures bubble up as `GoalPlanError`.

use thiserror::Error;

/// The main error type for goalplan operations
#[derive(Error, Debug)]
pub enum GoalPlanError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// No financial profile is available, so no budget snapshot can be built
    #[error("No financial profile for user '{0}'. Run 'goalplan profile set' first.")]
    MissingProfile(String),

    /// Another apply for the same user is in flight
    #[error("Conflicting update for user '{0}': another plan is being applied")]
    Conflict(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl GoalPlanError {
    /// Create a "not found" error for goals
    pub fn goal_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Goal",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for financial profiles
    pub fn profile_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Profile",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for GoalPlanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GoalPlanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for goalplan operations
pub type GoalPlanResult<T> = Result<T, GoalPlanError>;
