//! What-if scenario models

use serde::{Deserialize, Serialize};
use std::fmt;

use super::allocation::AllocationResult;
use super::goal::Goal;
use super::ids::GoalId;
use super::money::Money;

/// A hypothetical change to the inputs of an allocation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationScenario {
    /// Monthly income rises (positive) or falls (negative)
    IncomeChange { delta: Money },
    /// An extra goal competes for the budget
    NewGoal { goal: Goal },
    /// An existing goal is reprioritized
    PriorityChange { goal_id: GoalId, new_priority: i32 },
}

impl SimulationScenario {
    pub fn income_change(delta: Money) -> Self {
        Self::IncomeChange { delta }
    }

    pub fn new_goal(goal: Goal) -> Self {
        Self::NewGoal { goal }
    }

    pub fn priority_change(goal_id: GoalId, new_priority: i32) -> Self {
        Self::PriorityChange {
            goal_id,
            new_priority,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::IncomeChange { delta } if delta.is_negative() => {
                format!("income falls by {}", delta.abs())
            }
            Self::IncomeChange { delta } => format!("income rises by {}", delta),
            Self::NewGoal { goal } => format!("add goal '{}'", goal.name),
            Self::PriorityChange {
                goal_id,
                new_priority,
            } => format!("move {} to priority {}", goal_id, new_priority),
        }
    }
}

impl fmt::Display for SimulationScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// How one goal fared between the baseline and the scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactOutcome {
    Improved,
    Worsened,
    Unchanged,
    /// Only present in the scenario run
    Added,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalImpact {
    pub goal_id: GoalId,
    pub goal_name: String,
    pub months_before: Option<u32>,
    pub months_after: Option<u32>,
    pub achievable_before: bool,
    pub achievable_after: bool,
    pub outcome: ImpactOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub goals_improved: u32,
    pub goals_worsened: u32,
    pub total_time_saved_months: u32,
    pub recommendation: String,
    #[serde(default)]
    pub changes: Vec<GoalImpact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenario: SimulationScenario,
    pub before: AllocationResult,
    pub after: AllocationResult,
    pub impact_summary: ImpactSummary,
}
