//! Allocation run output models
//!
//! An `AllocationResult` is a proposal only: nothing in it has been persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::GoalId;
use super::money::Money;

/// The outcome of one allocation run for a single goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub goal_id: GoalId,
    pub goal_name: String,
    pub priority: i32,
    pub monthly_allocation: Money,
    /// The monthly amount that keeps the goal on pace
    pub ideal_allocation: Money,
    pub remaining_amount: Money,
    /// `None` when the goal is stalled (no allocation, money still needed)
    pub months_to_complete: Option<u32>,
    pub expected_completion_date: Option<NaiveDate>,
    pub is_achievable: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl AllocationRecord {
    pub fn new(
        goal_id: GoalId,
        goal_name: impl Into<String>,
        priority: i32,
        remaining_amount: Money,
    ) -> Self {
        Self {
            goal_id,
            goal_name: goal_name.into(),
            priority,
            monthly_allocation: Money::zero(),
            ideal_allocation: Money::zero(),
            remaining_amount,
            months_to_complete: None,
            expected_completion_date: None,
            is_achievable: false,
            warnings: Vec::new(),
        }
    }

    /// Stalled at the current pace
    pub fn is_unreachable(&self) -> bool {
        self.remaining_amount.is_positive() && !self.monthly_allocation.is_positive()
    }

    /// Receives less than its ideal monthly amount
    pub fn is_underfunded(&self) -> bool {
        self.monthly_allocation < self.ideal_allocation
    }

    /// Portion of the allocation that is needed to stay on pace
    pub fn committed(&self) -> Money {
        self.monthly_allocation.min(self.ideal_allocation)
    }
}

/// Headline totals of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub total_income: Money,
    pub available_for_goals: Money,
    pub total_allocated: Money,
    /// Sum of allocations up to each goal's ideal amount
    pub total_committed: Money,
    /// Budget left over after allocation (zero when over-committed)
    pub unallocated: Money,
}

/// How much of the available budget the plan commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComfortLevel {
    Excellent,
    Comfortable,
    Tight,
    Critical,
}

impl fmt::Display for ComfortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Comfortable => write!(f, "comfortable"),
            Self::Tight => write!(f, "tight"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyCheck {
    pub comfort_level: ComfortLevel,
    pub passed: bool,
}

impl SafetyCheck {
    pub fn new(comfort_level: ComfortLevel) -> Self {
        Self {
            comfort_level,
            passed: comfort_level != ComfortLevel::Critical,
        }
    }
}

/// Urgency of a suggestion; sorts `High` first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

impl fmt::Display for SuggestionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub message: String,
    pub impact: String,
    pub priority: SuggestionPriority,
}

/// The complete proposal produced by one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub summary: AllocationSummary,
    /// Ordered by goal priority
    pub allocations: Vec<AllocationRecord>,
    pub safety_check: SafetyCheck,
    pub warnings: Vec<String>,
    pub suggestions: Vec<Suggestion>,
}

impl AllocationResult {
    pub fn record_for(&self, goal_id: GoalId) -> Option<&AllocationRecord> {
        self.allocations.iter().find(|r| r.goal_id == goal_id)
    }

    pub fn unreachable_goals(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.allocations.iter().filter(|r| r.is_unreachable())
    }
}
