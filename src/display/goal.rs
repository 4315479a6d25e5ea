//! Goal display formatting
//!
//! Formats goals for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Goal, Money};

#[derive(Tabled)]
struct GoalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn progress(goal: &Goal) -> String {
    match goal.current_amount.ratio_to(goal.target_amount) {
        Some(ratio) => format!("{:.0}%", ratio * 100.0),
        None => "-".to_string(),
    }
}

fn status_label(goal: &Goal) -> String {
    let mut label = goal.status.to_string();
    if !goal.auto_adjust {
        label.push_str(", fixed");
    }
    if !goal.is_flexible {
        label.push_str(", strict");
    }
    label
}

/// Format a list of goals as a table
pub fn format_goal_list(goals: &[Goal]) -> String {
    if goals.is_empty() {
        return "No goals found.".to_string();
    }

    let rows = goals.iter().map(|g| GoalRow {
        id: g.id.to_string(),
        name: g.name.clone(),
        priority: g.priority,
        saved: g.current_amount.to_string(),
        target: g.target_amount.to_string(),
        progress: progress(g),
        deadline: g
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        monthly: g.monthly_allocation.to_string(),
        status: status_label(g),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());

    let total_target: Money = goals.iter().map(|g| g.target_amount).sum();
    let total_saved: Money = goals.iter().map(|g| g.current_amount).sum();

    format!(
        "{}\n\nSaved {} of {} across {} goal(s)\n",
        table,
        total_saved,
        total_target,
        goals.len()
    )
}

/// Format a single goal's details
pub fn format_goal_details(goal: &Goal) -> String {
    let mut output = String::new();

    output.push_str(&format!("Goal: {}\n", goal.name));
    output.push_str(&format!("  ID:             {}\n", goal.id));
    output.push_str(&format!("  Status:         {}\n", goal.status));
    output.push_str(&format!("  Priority:       {}\n", goal.priority));
    output.push_str(&format!("  Target:         {}\n", goal.target_amount));
    output.push_str(&format!(
        "  Saved:          {} ({})\n",
        goal.current_amount,
        progress(goal)
    ));
    output.push_str(&format!("  Remaining:      {}\n", goal.remaining_amount()));
    output.push_str(&format!(
        "  Deadline:       {}\n",
        goal.deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    output.push_str(&format!(
        "  Flexible:       {}\n",
        if goal.is_flexible { "Yes" } else { "No" }
    ));
    output.push_str(&format!("  Minimum:        {}\n", goal.min_allocation));
    output.push_str(&format!(
        "  Rebalancing:    {}\n",
        if goal.auto_adjust { "automatic" } else { "fixed amount" }
    ));
    output.push_str(&format!("  Monthly:        {}\n", goal.monthly_allocation));

    if !goal.notes.is_empty() {
        output.push_str(&format!("  Notes:          {}\n", goal.notes));
    }

    output.push_str(&format!(
        "  Created:        {}\n",
        goal.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}
