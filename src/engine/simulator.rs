//! What-if simulation
//!
//! Runs the pipeline on the unmodified inputs and again on clones altered by
//! a scenario, then compares the two results goal by goal. Nothing it
//! touches is persisted.

use std::cmp::Ordering;

use super::{run_pipeline, snapshot::with_income_delta, EngineConfig};
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::models::{
    AllocationRecord, AllocationResult, BudgetSnapshot, Goal, GoalImpact, ImpactOutcome,
    ImpactSummary, SimulationResult, SimulationScenario,
};

/// Run `scenario` against the current inputs
///
/// Fails only when the scenario itself cannot be applied: a new goal that is
/// malformed or reuses an existing id, or a priority change for a goal that
/// is not in `goals`.
pub fn simulate(
    goals: &[Goal],
    snapshot: &BudgetSnapshot,
    scenario: &SimulationScenario,
    config: &EngineConfig,
) -> GoalPlanResult<SimulationResult> {
    let (scenario_snapshot, scenario_goals) = apply_scenario(goals, snapshot, scenario)?;

    let before = run_pipeline(snapshot, goals, config);
    let after = run_pipeline(&scenario_snapshot, &scenario_goals, config);
    let impact_summary = compare(&before, &after);

    tracing::debug!(
        scenario = %scenario,
        improved = impact_summary.goals_improved,
        worsened = impact_summary.goals_worsened,
        months_saved = impact_summary.total_time_saved_months,
        "simulation_diff"
    );

    Ok(SimulationResult {
        scenario: scenario.clone(),
        before,
        after,
        impact_summary,
    })
}

/// Cloned inputs with the scenario applied
pub fn apply_scenario(
    goals: &[Goal],
    snapshot: &BudgetSnapshot,
    scenario: &SimulationScenario,
) -> GoalPlanResult<(BudgetSnapshot, Vec<Goal>)> {
    let mut goals = goals.to_vec();
    let mut snapshot = snapshot.clone();

    match scenario {
        SimulationScenario::IncomeChange { delta } => {
            snapshot = with_income_delta(&snapshot, *delta);
        }
        SimulationScenario::NewGoal { goal } => {
            if goals.iter().any(|g| g.id == goal.id) {
                return Err(GoalPlanError::Duplicate {
                    entity_type: "Goal",
                    identifier: goal.id.to_string(),
                });
            }
            goal.validate()
                .map_err(|e| GoalPlanError::Validation(format!("{}: {}", goal.name, e)))?;
            goals.push(goal.clone());
        }
        SimulationScenario::PriorityChange {
            goal_id,
            new_priority,
        } => {
            let goal = goals
                .iter_mut()
                .find(|g| g.id == *goal_id)
                .ok_or_else(|| GoalPlanError::goal_not_found(goal_id.to_string()))?;
            goal.priority = *new_priority;
        }
    }

    Ok((snapshot, goals))
}

/// Order months with `None` (stalled) as infinitely far away
fn compare_months(before: Option<u32>, after: Option<u32>) -> Ordering {
    match (before, after) {
        (Some(b), Some(a)) => a.cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

fn classify_change(before: &AllocationRecord, after: &AllocationRecord) -> ImpactOutcome {
    let months = compare_months(before.months_to_complete, after.months_to_complete);
    let better = months == Ordering::Less || (!before.is_achievable && after.is_achievable);
    let worse = months == Ordering::Greater || (before.is_achievable && !after.is_achievable);

    match (better, worse) {
        (true, false) => ImpactOutcome::Improved,
        (false, true) => ImpactOutcome::Worsened,
        _ => ImpactOutcome::Unchanged,
    }
}

/// Goal-by-goal diff of two pipeline runs
pub fn compare(before: &AllocationResult, after: &AllocationResult) -> ImpactSummary {
    let mut changes = Vec::with_capacity(after.allocations.len());
    let mut goals_improved = 0u32;
    let mut goals_worsened = 0u32;
    let mut total_time_saved_months = 0u32;

    for record in &after.allocations {
        let previous = before.record_for(record.goal_id);
        let outcome = match previous {
            Some(prev) => classify_change(prev, record),
            None => ImpactOutcome::Added,
        };

        match outcome {
            ImpactOutcome::Improved => {
                goals_improved += 1;
                if let (Some(b), Some(a)) = (
                    previous.and_then(|p| p.months_to_complete),
                    record.months_to_complete,
                ) {
                    total_time_saved_months += b.saturating_sub(a);
                }
            }
            ImpactOutcome::Worsened => goals_worsened += 1,
            ImpactOutcome::Unchanged | ImpactOutcome::Added => {}
        }

        changes.push(GoalImpact {
            goal_id: record.goal_id,
            goal_name: record.goal_name.clone(),
            months_before: previous.and_then(|p| p.months_to_complete),
            months_after: record.months_to_complete,
            achievable_before: previous.map(|p| p.is_achievable).unwrap_or(false),
            achievable_after: record.is_achievable,
            outcome,
        });
    }

    let recommendation = recommend(goals_improved, goals_worsened, total_time_saved_months);

    ImpactSummary {
        goals_improved,
        goals_worsened,
        total_time_saved_months,
        recommendation,
        changes,
    }
}

fn recommend(improved: u32, worsened: u32, months_saved: u32) -> String {
    match improved.cmp(&worsened) {
        Ordering::Greater => format!(
            "Worth doing: {} goal(s) improve against {} that slip, saving {} month(s) in total.",
            improved, worsened, months_saved
        ),
        Ordering::Less => format!(
            "Think twice: {} goal(s) slip or miss their deadline while only {} improve.",
            worsened, improved
        ),
        Ordering::Equal if improved == 0 => {
            "No existing goal finishes sooner or later under this change.".to_string()
        }
        Ordering::Equal => format!(
            "Mixed result: {} goal(s) improve and {} slip; weigh which goals matter more.",
            improved, worsened
        ),
    }
}
