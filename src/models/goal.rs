//! Savings goal model
//!
//! A goal is a named amount the user is saving toward, with a priority, an
//! optional deadline, and flags that control how the allocation engine may
//! scale its monthly contribution.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GoalId, UserId};
use super::money::Money;

/// Lifecycle status of a goal; only active goals are allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Paused,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// A financial goal owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub name: String,
    pub target_amount: Money,
    #[serde(default)]
    pub current_amount: Money,
    /// Lower is more urgent
    pub priority: i32,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    /// May be scaled down to `min_allocation` under budget pressure
    #[serde(default = "default_true")]
    pub is_flexible: bool,
    #[serde(default)]
    pub min_allocation: Money,
    #[serde(default)]
    pub status: GoalStatus,
    /// Participates in rebalancing; when false the goal keeps its last amount
    #[serde(default = "default_true")]
    pub auto_adjust: bool,
    /// Last monthly amount applied from an accepted plan
    #[serde(default)]
    pub monthly_allocation: Money,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Goal {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        target_amount: Money,
        priority: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GoalId::new(),
            user_id,
            name: name.into(),
            target_amount,
            current_amount: Money::zero(),
            priority,
            deadline: None,
            is_flexible: true,
            min_allocation: Money::zero(),
            status: GoalStatus::Active,
            auto_adjust: true,
            monthly_allocation: Money::zero(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_current_amount(mut self, current: Money) -> Self {
        self.current_amount = current;
        self
    }

    pub fn with_min_allocation(mut self, min: Money) -> Self {
        self.min_allocation = min;
        self
    }

    /// Amount still needed to reach the target (never negative)
    pub fn remaining_amount(&self) -> Money {
        (self.target_amount - self.current_amount).non_negative()
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    pub fn set_status(&mut self, status: GoalStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
        self.updated_at = Utc::now();
    }

    pub fn set_monthly_allocation(&mut self, amount: Money) {
        self.monthly_allocation = amount;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.trim().is_empty() {
            return Err(GoalValidationError::EmptyName);
        }

        if !self.target_amount.is_positive() {
            return Err(GoalValidationError::NonPositiveTarget);
        }

        if self.current_amount.is_negative() {
            return Err(GoalValidationError::NegativeCurrent);
        }

        if self.current_amount > self.target_amount {
            return Err(GoalValidationError::CurrentExceedsTarget);
        }

        if self.min_allocation.is_negative() {
            return Err(GoalValidationError::NegativeMinimum);
        }

        Ok(())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} of {}, priority {})",
            self.name, self.current_amount, self.target_amount, self.priority
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyName,
    NonPositiveTarget,
    NegativeCurrent,
    CurrentExceedsTarget,
    NegativeMinimum,
}

impl fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Goal name cannot be empty"),
            Self::NonPositiveTarget => write!(f, "Target amount must be greater than zero"),
            Self::NegativeCurrent => write!(f, "Current amount cannot be negative"),
            Self::CurrentExceedsTarget => write!(f, "Current amount exceeds the target"),
            Self::NegativeMinimum => write!(f, "Minimum allocation cannot be negative"),
        }
    }
}

impl std::error::Error for GoalValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: i64) -> Goal {
        Goal::new(UserId::new("u1"), "Emergency Fund", Money::from_units(target), 1)
    }

    #[test]
    fn test_new_goal_defaults() {
        let g = goal(5000);
        assert!(g.is_active());
        assert!(g.is_flexible);
        assert!(g.auto_adjust);
        assert_eq!(g.remaining_amount(), Money::from_units(5000));
    }

    #[test]
    fn test_remaining_amount_never_negative() {
        let g = goal(100).with_current_amount(Money::from_units(150));
        assert_eq!(g.remaining_amount(), Money::zero());
    }

    #[test]
    fn test_validation() {
        assert!(goal(100).validate().is_ok());
        assert_eq!(goal(0).validate(), Err(GoalValidationError::NonPositiveTarget));
        assert_eq!(
            goal(100).with_current_amount(Money::from_units(101)).validate(),
            Err(GoalValidationError::CurrentExceedsTarget)
        );
        assert_eq!(
            goal(100).with_min_allocation(Money::from_cents(-1)).validate(),
            Err(GoalValidationError::NegativeMinimum)
        );

        let mut unnamed = goal(100);
        unnamed.name = "  ".into();
        assert_eq!(unnamed.validate(), Err(GoalValidationError::EmptyName));
    }

    #[test]
    fn test_status_change_updates_timestamp() {
        let mut g = goal(100);
        let before = g.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(10));
        g.set_status(GoalStatus::Paused);
        assert_eq!(g.status, GoalStatus::Paused);
        assert!(g.updated_at > before);
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let g = goal(100);
        let mut value = serde_json::to_value(&g).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("is_flexible");
        obj.remove("auto_adjust");
        obj.remove("status");
        let restored: Goal = serde_json::from_value(value).unwrap();
        assert!(restored.is_flexible);
        assert!(restored.auto_adjust);
        assert_eq!(restored.status, GoalStatus::Active);
    }
}
