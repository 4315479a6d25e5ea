//! Configuration module for goalplan
//!
//! This module provides configuration management including:
//! - Platform-aware path resolution
//! - User settings persistence
//! - The engine tuning knobs derived from settings

pub mod paths;
pub mod settings;

pub use paths::GoalPlanPaths;
pub use settings::{ComfortThresholds, SafetyMargin, Settings};
