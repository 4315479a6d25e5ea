//! Allocation plan and simulation display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::AuditEntry;
use crate::models::{AllocationResult, ImpactOutcome, SimulationResult};

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "#")]
    priority: i32,
    #[tabled(rename = "Goal")]
    goal: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "On pace")]
    ideal: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Months")]
    months: String,
    #[tabled(rename = "Done by")]
    done_by: String,
    #[tabled(rename = "OK")]
    achievable: &'static str,
}

#[derive(Tabled)]
struct ImpactRow {
    #[tabled(rename = "Goal")]
    goal: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
    #[tabled(rename = "Effect")]
    effect: &'static str,
}

fn months(value: Option<u32>) -> String {
    value
        .map(|m| m.to_string())
        .unwrap_or_else(|| "never".to_string())
}

fn allocation_table(result: &AllocationResult) -> String {
    let rows = result.allocations.iter().map(|r| AllocationRow {
        priority: r.priority,
        goal: r.goal_name.clone(),
        monthly: r.monthly_allocation.to_string(),
        ideal: r.ideal_allocation.to_string(),
        remaining: r.remaining_amount.to_string(),
        months: months(r.months_to_complete),
        done_by: r
            .expected_completion_date
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| "-".to_string()),
        achievable: if r.is_achievable { "yes" } else { "no" },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// Format a full allocation plan
pub fn format_plan(result: &AllocationResult) -> String {
    let summary = &result.summary;
    let mut output = String::new();

    output.push_str(&format!("Income:               {}\n", summary.total_income));
    output.push_str(&format!("Available for goals:  {}\n", summary.available_for_goals));
    output.push_str(&format!("Allocated:            {}\n", summary.total_allocated));
    output.push_str(&format!("Unallocated:          {}\n", summary.unallocated));
    output.push_str(&format!(
        "Comfort:              {}{}\n",
        result.safety_check.comfort_level,
        if result.safety_check.passed { "" } else { " (check failed)" }
    ));

    output.push('\n');
    if result.allocations.is_empty() {
        output.push_str("No active goals.\n");
    } else {
        output.push_str(&allocation_table(result));
        output.push('\n');
    }

    let record_warnings = result.allocations.iter().flat_map(|r| r.warnings.iter());
    let warnings: Vec<&String> = result.warnings.iter().chain(record_warnings).collect();
    if !warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in warnings {
            output.push_str(&format!("  ! {}\n", warning));
        }
    }

    if !result.suggestions.is_empty() {
        output.push_str("\nSuggestions:\n");
        for suggestion in &result.suggestions {
            output.push_str(&format!("  [{}] {}\n", suggestion.priority, suggestion.message));
            output.push_str(&format!("         {}\n", suggestion.impact));
        }
    }

    output
}

/// Format the impact of a what-if scenario
pub fn format_simulation(result: &SimulationResult) -> String {
    let impact = &result.impact_summary;
    let mut output = format!("Scenario: {}\n\n", result.scenario);

    let rows = impact.changes.iter().map(|c| ImpactRow {
        goal: c.goal_name.clone(),
        before: months(c.months_before),
        after: months(c.months_after),
        effect: match c.outcome {
            ImpactOutcome::Improved => "sooner",
            ImpactOutcome::Worsened => "later",
            ImpactOutcome::Unchanged => "-",
            ImpactOutcome::Added => "new",
        },
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\nComfort: {} -> {}\n",
        result.before.safety_check.comfort_level, result.after.safety_check.comfort_level
    ));
    output.push_str(&format!(
        "Improved: {}  Worsened: {}  Months saved: {}\n",
        impact.goals_improved, impact.goals_worsened, impact.total_time_saved_months
    ));
    output.push_str(&format!("\n{}\n", impact.recommendation));

    output
}

/// Format applied-plan history entries
pub fn format_history(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No plans have been applied yet.".to_string();
    }

    entries
        .iter()
        .map(|e| {
            format!(
                "{}  {}  {}",
                e.timestamp.format("%Y-%m-%d %H:%M"),
                e.diff_summary.as_deref().unwrap_or("-"),
                e.reason.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{run_pipeline, simulate, EngineConfig};
    use crate::models::{BudgetSnapshot, Goal, Money, SimulationScenario, UserId};
    use chrono::NaiveDate;

    fn snapshot(available: i64) -> BudgetSnapshot {
        BudgetSnapshot::new(
            Money::from_units(available),
            Money::zero(),
            Money::zero(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
    }

    fn goals() -> Vec<Goal> {
        vec![Goal::new(UserId::new("u"), "House", Money::from_units(24_000), 1)]
    }

    #[test]
    fn test_plan_output() {
        let result = run_pipeline(&snapshot(1_000), &goals(), &EngineConfig::default());
        let output = format_plan(&result);
        assert!(output.contains("Available for goals:  $1000.00"));
        assert!(output.contains("House"));
        assert!(output.contains("critical (check failed)"));
        assert!(output.contains("Suggestions:"));
    }

    #[test]
    fn test_empty_plan_output() {
        let result = run_pipeline(&snapshot(1_000), &[], &EngineConfig::default());
        assert!(format_plan(&result).contains("No active goals."));
    }

    #[test]
    fn test_simulation_output() {
        let scenario = SimulationScenario::income_change(Money::from_units(1_000));
        let result = simulate(&goals(), &snapshot(1_000), &scenario, &EngineConfig::default()).unwrap();
        let output = format_simulation(&result);
        assert!(output.starts_with("Scenario: income rises by $1000.00"));
        assert!(output.contains("sooner"));
        assert!(output.contains(&result.impact_summary.recommendation));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(format_history(&[]), "No plans have been applied yet.");
    }
}
