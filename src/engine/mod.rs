//! Goal allocation engine
//!
//! A run is a pure function of a `BudgetSnapshot`, a goal list and an
//! `EngineConfig`: no goal is mutated and nothing is read from disk. The
//! pipeline is allocate, project, summarize, classify, suggest.

pub mod allocator;
pub mod projector;
pub mod safety;
pub mod simulator;
pub mod snapshot;
pub mod suggestions;

use std::collections::HashMap;

use crate::config::ComfortThresholds;
use crate::models::{
    AllocationResult, AllocationSummary, BudgetSnapshot, ComfortLevel, Goal, GoalId, Money,
    SafetyCheck,
};

pub use allocator::{allocate, ideal_monthly, months_between, AllocationOutcome};
pub use simulator::simulate;
pub use snapshot::{build_snapshot, with_income_delta};

/// Tunables of an allocation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Months an open-ended goal is paced over
    pub default_pacing_months: u32,
    pub comfort_thresholds: ComfortThresholds,
    /// Priorities this close together count as "nearly equal"
    pub near_priority_gap: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_pacing_months: 12,
            comfort_thresholds: ComfortThresholds::default(),
            near_priority_gap: 1,
        }
    }
}

/// Run the full pipeline once
pub fn run_pipeline(
    snapshot: &BudgetSnapshot,
    goals: &[Goal],
    config: &EngineConfig,
) -> AllocationResult {
    let AllocationOutcome {
        mut records,
        warnings,
        flexible_goals,
    } = allocate(snapshot, goals, config);

    let deadlines: HashMap<GoalId, _> = goals.iter().map(|g| (g.id, g.deadline)).collect();
    for record in records.iter_mut() {
        let deadline = deadlines.get(&record.goal_id).copied().flatten();
        projector::project(record, deadline, snapshot.as_of);
    }

    let total_allocated: Money = records.iter().map(|r| r.monthly_allocation).sum();
    let total_committed: Money = records.iter().map(|r| r.committed()).sum();
    let summary = AllocationSummary {
        total_income: snapshot.total_income,
        available_for_goals: snapshot.available_for_goals,
        total_allocated,
        total_committed,
        unallocated: (snapshot.available_for_goals.non_negative() - total_allocated).non_negative(),
    };

    let safety_check = if snapshot.is_over_committed() {
        SafetyCheck::new(ComfortLevel::Critical)
    } else {
        safety::classify(&summary, &config.comfort_thresholds)
    };

    let suggestions = suggestions::generate(&suggestions::SuggestionInput {
        records: &records,
        summary: &summary,
        safety: &safety_check,
        flexible_goals,
        near_priority_gap: config.near_priority_gap,
    });

    tracing::debug!(
        goals = records.len(),
        allocated = summary.total_allocated.cents(),
        committed = summary.total_committed.cents(),
        comfort = %safety_check.comfort_level,
        suggestions = suggestions.len(),
        "pipeline_complete"
    );

    AllocationResult {
        summary,
        allocations: records,
        safety_check,
        warnings,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SafetyMargin;
    use crate::models::{FinancialProfile, SuggestionPriority, UserId};
    use chrono::NaiveDate;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn scenario_snapshot() -> BudgetSnapshot {
        let profile = FinancialProfile::new(
            UserId::new("u1"),
            Money::from_units(15_000),
            Money::from_units(9_000),
        );
        let margin = SafetyMargin::Fixed {
            amount: Money::from_units(1_000),
        };
        build_snapshot(&profile, &margin, as_of())
    }

    fn scenario_goals() -> Vec<Goal> {
        let g1 = Goal::new(UserId::new("u1"), "g1", Money::from_units(6_000), 1)
            .with_deadline(NaiveDate::from_ymd_opt(2026, 4, 15).unwrap());
        let g2 = Goal::new(UserId::new("u1"), "g2", Money::from_units(12_000), 5);
        vec![g1, g2]
    }

    #[test]
    fn test_zero_goals() {
        let result = run_pipeline(&scenario_snapshot(), &[], &EngineConfig::default());
        assert!(result.allocations.is_empty());
        assert_eq!(result.summary.total_allocated, Money::zero());
        assert_eq!(result.safety_check.comfort_level, ComfortLevel::Excellent);
        assert!(result.safety_check.passed);
    }

    #[test]
    fn test_negative_budget() {
        let snapshot = BudgetSnapshot::new(
            Money::from_units(3_000),
            Money::from_units(3_000),
            Money::from_units(500),
            as_of(),
        );
        assert_eq!(snapshot.available_for_goals, Money::from_units(-500));

        let result = run_pipeline(&snapshot, &scenario_goals(), &EngineConfig::default());
        assert_eq!(result.safety_check.comfort_level, ComfortLevel::Critical);
        assert!(!result.safety_check.passed);
        assert!(!result.warnings.is_empty());
        assert!(result
            .allocations
            .iter()
            .all(|r| r.monthly_allocation.is_zero()));
        assert_eq!(result.summary.unallocated, Money::zero());
    }

    #[test]
    fn test_scenario_example() {
        let snapshot = scenario_snapshot();
        assert_eq!(snapshot.available_for_goals, Money::from_units(5_000));

        let result = run_pipeline(&snapshot, &scenario_goals(), &EngineConfig::default());
        let g1 = &result.allocations[0];
        let g2 = &result.allocations[1];

        assert_eq!(g1.goal_name, "g1");
        assert_eq!(g1.ideal_allocation, Money::from_units(2_000));
        assert_eq!(g1.monthly_allocation, Money::from_units(2_000));
        assert_eq!(g1.months_to_complete, Some(3));
        assert!(g1.is_achievable);

        assert_eq!(g2.monthly_allocation, Money::from_units(3_000));
        assert_eq!(g2.months_to_complete, Some(4));
        assert!(g2.is_achievable);

        assert_eq!(result.summary.total_allocated, Money::from_units(5_000));
        assert_eq!(result.summary.unallocated, Money::zero());
        // committed: 2,000 + g2's 1,000 ideal
        assert_eq!(result.summary.total_committed, Money::from_units(3_000));
        // every dollar is spent: r = 1.0
        assert_eq!(result.safety_check.comfort_level, ComfortLevel::Critical);
        assert!(!result.safety_check.passed);
        assert!(result
            .suggestions
            .iter()
            .any(|s| s.priority == SuggestionPriority::High));
    }

    #[test]
    fn test_deadline_only_plan_leaves_room() {
        // no open-ended goal to absorb the surplus: 2,000 of 5,000 is excellent
        let goals = vec![scenario_goals().remove(0)];
        let result = run_pipeline(&scenario_snapshot(), &goals, &EngineConfig::default());
        assert_eq!(result.summary.total_allocated, Money::from_units(2_000));
        assert_eq!(result.summary.unallocated, Money::from_units(3_000));
        assert_eq!(result.safety_check.comfort_level, ComfortLevel::Excellent);
    }

    #[test]
    fn test_over_commitment_example() {
        let snapshot = BudgetSnapshot::new(Money::from_units(1_000), Money::zero(), Money::zero(), as_of());
        let first = Goal::new(UserId::new("u1"), "first", Money::from_units(24_000), 1)
            .with_min_allocation(Money::from_units(800));
        let second = Goal::new(UserId::new("u1"), "second", Money::from_units(24_000), 2)
            .with_min_allocation(Money::from_units(800));

        let result = run_pipeline(&snapshot, &[first, second], &EngineConfig::default());
        assert_eq!(result.allocations[0].monthly_allocation, Money::from_units(800));
        assert_eq!(result.allocations[1].monthly_allocation, Money::from_units(200));
        assert!(result.allocations[1]
            .warnings
            .iter()
            .any(|w| w.contains("not met")));
        assert_eq!(result.safety_check.comfort_level, ComfortLevel::Critical);
    }

    #[test]
    fn test_idempotent() {
        let snapshot = scenario_snapshot();
        let goals = scenario_goals();
        let config = EngineConfig::default();
        assert_eq!(
            run_pipeline(&snapshot, &goals, &config),
            run_pipeline(&snapshot, &goals, &config)
        );
    }

    #[test]
    fn test_pacing_comes_from_config() {
        let config = EngineConfig {
            default_pacing_months: 6,
            ..EngineConfig::default()
        };
        let snapshot = BudgetSnapshot::new(Money::from_units(500), Money::zero(), Money::zero(), as_of());
        let goal = Goal::new(UserId::new("u1"), "open", Money::from_units(1_200), 1);
        let result = run_pipeline(&snapshot, &[goal], &config);
        assert_eq!(result.allocations[0].ideal_allocation, Money::from_units(200));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_pipeline_is_idempotent(
            available in -100_000i64..2_000_000,
            targets in proptest::collection::vec((1i64..3_000_000, 0i32..6), 0..6)
        ) {
            let goals: Vec<Goal> = targets
                .iter()
                .enumerate()
                .map(|(i, (target, priority))| {
                    Goal::new(UserId::new("p"), format!("g{}", i), Money::from_cents(*target), *priority)
                })
                .collect();
            let snapshot = BudgetSnapshot::new(Money::from_cents(available), Money::zero(), Money::zero(), as_of());
            let config = EngineConfig::default();
            prop_assert_eq!(
                run_pipeline(&snapshot, &goals, &config),
                run_pipeline(&snapshot, &goals, &config)
            );
        }
    }
}
