//! User settings for goalplan
//!
//! Manages user preferences including the default user, the safety margin
//! withheld from every allocation run, and the engine's pacing and comfort
//! thresholds.

use serde::{Deserialize, Serialize};

use super::paths::GoalPlanPaths;
use crate::engine::EngineConfig;
use crate::error::GoalPlanError;
use crate::models::{Money, UserId};

/// Reserve withheld from the monthly surplus before goals are funded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SafetyMargin {
    /// A flat amount per month
    Fixed { amount: Money },
    /// A percentage of total income (0-100)
    Percent { percent: f64 },
}

impl SafetyMargin {
    /// Resolve the margin to a concrete amount for the given income
    pub fn amount_for(&self, total_income: Money) -> Money {
        match self {
            Self::Fixed { amount } => *amount,
            Self::Percent { percent } => {
                let clamped = percent.clamp(0.0, 100.0);
                Money::from_cents((total_income.cents() as f64 * clamped / 100.0).round() as i64)
            }
        }
    }
}

impl Default for SafetyMargin {
    fn default() -> Self {
        Self::Fixed {
            amount: Money::zero(),
        }
    }
}

/// Ratio cut-offs (allocated / available) between comfort levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortThresholds {
    pub excellent_below: f64,
    pub comfortable_below: f64,
    pub tight_below: f64,
}

impl Default for ComfortThresholds {
    fn default() -> Self {
        Self {
            excellent_below: 0.5,
            comfortable_below: 0.75,
            tight_below: 0.9,
        }
    }
}

/// User settings for goalplan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// User whose goals are planned when `--user` is not given
    #[serde(default = "default_user")]
    pub default_user: UserId,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Reserve withheld from allocation
    #[serde(default)]
    pub safety_margin: SafetyMargin,

    /// Months over which goals without a deadline are paced
    #[serde(default = "default_pacing_months")]
    pub default_pacing_months: u32,

    /// Comfort level cut-offs
    #[serde(default)]
    pub comfort_thresholds: ComfortThresholds,

    /// Priorities at most this far apart count as "near-identical"
    #[serde(default = "default_near_priority_gap")]
    pub near_priority_gap: u32,
}

fn default_schema_version() -> u32 {
    1
}

fn default_user() -> UserId {
    UserId::new("default")
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_pacing_months() -> u32 {
    12
}

fn default_near_priority_gap() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_user: default_user(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            safety_margin: SafetyMargin::default(),
            default_pacing_months: default_pacing_months(),
            comfort_thresholds: ComfortThresholds::default(),
            near_priority_gap: default_near_priority_gap(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &GoalPlanPaths) -> Result<Self, GoalPlanError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| GoalPlanError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                GoalPlanError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &GoalPlanPaths) -> Result<(), GoalPlanError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| GoalPlanError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| GoalPlanError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<(), GoalPlanError> {
        if self.default_pacing_months == 0 {
            return Err(GoalPlanError::Config(
                "default_pacing_months must be at least 1".into(),
            ));
        }

        let t = &self.comfort_thresholds;
        if !(0.0 < t.excellent_below
            && t.excellent_below <= t.comfortable_below
            && t.comfortable_below <= t.tight_below)
        {
            return Err(GoalPlanError::Config(
                "comfort_thresholds must be positive and ascending".into(),
            ));
        }

        if let SafetyMargin::Fixed { amount } = self.safety_margin {
            if amount.is_negative() {
                return Err(GoalPlanError::Config("safety margin cannot be negative".into()));
            }
        }

        Ok(())
    }

    /// The immutable subset of settings an allocation run depends on
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_pacing_months: self.default_pacing_months.max(1),
            comfort_thresholds: self.comfort_thresholds,
            near_priority_gap: self.near_priority_gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_user.as_str(), "default");
        assert_eq!(settings.default_pacing_months, 12);
        assert_eq!(settings.comfort_thresholds.tight_below, 0.9);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GoalPlanPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.safety_margin = SafetyMargin::Percent { percent: 10.0 };
        settings.default_pacing_months = 24;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.safety_margin, SafetyMargin::Percent { percent: 10.0 });
        assert_eq!(loaded.default_pacing_months, 24);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency_symbol": "€"}"#).unwrap();
        assert_eq!(settings.currency_symbol, "€");
        assert_eq!(settings.near_priority_gap, 1);
        assert_eq!(settings.safety_margin, SafetyMargin::default());
    }

    #[test]
    fn test_safety_margin_amounts() {
        let income = Money::from_cents(1_500_000);
        let fixed = SafetyMargin::Fixed {
            amount: Money::from_cents(100_000),
        };
        assert_eq!(fixed.amount_for(income).cents(), 100_000);

        let percent = SafetyMargin::Percent { percent: 5.0 };
        assert_eq!(percent.amount_for(income).cents(), 75_000);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut settings = Settings::default();
        settings.comfort_thresholds.comfortable_below = 0.95;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_engine_config_projection() {
        let mut settings = Settings::default();
        settings.near_priority_gap = 3;
        let config = settings.engine_config();
        assert_eq!(config.near_priority_gap, 3);
        assert_eq!(config.default_pacing_months, 12);
    }
}
