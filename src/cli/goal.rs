//! Goal CLI commands
//!
//! Implements CLI commands for goal management. `goal add` walks the goal
//! creation flow with the values given on the command line.

use clap::Subcommand;

use crate::display::goal::{format_goal_details, format_goal_list};
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::flows::goal_creation::{CreationEffect, CreationInput};
use crate::flows::GoalCreationFlow;
use crate::models::UserId;
use crate::services::{GoalDraft, GoalService, GoalUpdate};
use crate::storage::Storage;

use super::{drive, parse_date, parse_money};

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Add a savings goal
    Add {
        /// Goal name
        name: String,
        /// Total amount needed (e.g., "12000" or "12,000.00")
        target: String,
        /// Priority (1 = most important)
        #[arg(short, long, default_value = "1")]
        priority: i32,
        /// Deadline (YYYY-MM-DD); omit for an open-ended goal
        #[arg(short, long)]
        deadline: Option<String>,
        /// Amount already saved
        #[arg(short, long)]
        current: Option<String>,
        /// Never scale this goal down under budget pressure
        #[arg(long)]
        strict: bool,
        /// Smallest monthly amount when scaled down
        #[arg(short, long)]
        min: Option<String>,
        /// Keep the last applied monthly amount instead of rebalancing
        #[arg(long)]
        fixed: bool,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List goals
    List {
        /// Include paused and completed goals
        #[arg(short, long)]
        all: bool,
    },
    /// Show goal details
    Show {
        /// Goal name or ID
        goal: String,
    },
    /// Edit a goal
    Edit {
        /// Goal name or ID
        goal: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New target amount
        #[arg(short, long)]
        target: Option<String>,
        /// Amount saved so far
        #[arg(short, long)]
        current: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<i32>,
        /// New deadline (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "no_deadline")]
        deadline: Option<String>,
        /// Remove the deadline
        #[arg(long)]
        no_deadline: bool,
        /// Whether the goal may be scaled down
        #[arg(long)]
        flexible: Option<bool>,
        /// Smallest monthly amount when scaled down
        #[arg(short, long)]
        min: Option<String>,
        /// Whether the goal takes part in rebalancing
        #[arg(long)]
        auto_adjust: Option<bool>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Pause a goal; it stops receiving money
    Pause {
        /// Goal name or ID
        goal: String,
    },
    /// Resume a paused goal
    Resume {
        /// Goal name or ID
        goal: String,
    },
    /// Mark a goal as completed
    Complete {
        /// Goal name or ID
        goal: String,
    },
    /// Delete a goal
    Delete {
        /// Goal name or ID
        goal: String,
    },
}

/// Handle a goal command
pub fn handle_goal_command(
    storage: &Storage,
    user_id: &UserId,
    cmd: GoalCommands,
) -> GoalPlanResult<()> {
    let service = GoalService::new(storage);

    match cmd {
        GoalCommands::Add {
            name,
            target,
            priority,
            deadline,
            current,
            strict,
            min,
            fixed,
            notes,
        } => {
            let target = parse_money(&target, "target amount")?;
            let deadline = deadline.as_deref().map(parse_date).transpose()?;

            let (_, effects) = drive::<GoalCreationFlow>(vec![
                CreationInput::Name(name),
                CreationInput::Target(target),
                CreationInput::Deadline(deadline),
                CreationInput::Priority(priority),
                CreationInput::Confirm,
            ])?;

            let mut draft: GoalDraft = effects
                .into_iter()
                .find_map(|effect| match effect {
                    CreationEffect::CreateGoal(draft) => Some(draft),
                    _ => None,
                })
                .ok_or_else(|| GoalPlanError::Validation("Goal was not confirmed".into()))?;

            if let Some(current) = current {
                draft.current_amount = parse_money(&current, "current amount")?;
            }
            if let Some(min) = min {
                draft.min_allocation = parse_money(&min, "minimum allocation")?;
            }
            draft.is_flexible = !strict;
            draft.auto_adjust = !fixed;
            draft.notes = notes.unwrap_or_default();

            let goal = service.create(user_id, draft)?;
            println!("Created goal: {} ({})", goal.name, goal.id);
            println!("  Target:   {}", goal.target_amount);
            println!("  Priority: {}", goal.priority);
            if let Some(deadline) = goal.deadline {
                println!("  Deadline: {}", deadline);
            }
            println!();
            println!("Run 'goalplan plan show' to see how it fits your budget.");
        }

        GoalCommands::List { all } => {
            let goals = service.list(user_id, all)?;
            println!("{}", format_goal_list(&goals));
        }

        GoalCommands::Show { goal } => {
            let goal = service.require(user_id, &goal)?;
            print!("{}", format_goal_details(&goal));
        }

        GoalCommands::Edit {
            goal,
            name,
            target,
            current,
            priority,
            deadline,
            no_deadline,
            flexible,
            min,
            auto_adjust,
            notes,
        } => {
            let existing = service.require(user_id, &goal)?;

            let deadline = if no_deadline {
                Some(None)
            } else {
                deadline.as_deref().map(parse_date).transpose()?.map(Some)
            };

            let changes = GoalUpdate {
                name,
                target_amount: target
                    .map(|v| parse_money(&v, "target amount"))
                    .transpose()?,
                current_amount: current
                    .map(|v| parse_money(&v, "current amount"))
                    .transpose()?,
                priority,
                deadline,
                is_flexible: flexible,
                min_allocation: min
                    .map(|v| parse_money(&v, "minimum allocation"))
                    .transpose()?,
                auto_adjust,
                notes,
            };

            if changes.is_empty() {
                println!("No changes specified.");
                return Ok(());
            }

            let updated = service.update(existing.id, changes)?;
            println!("Updated goal: {}", updated.name);
        }

        GoalCommands::Pause { goal } => {
            let goal = service.require(user_id, &goal)?;
            let goal = service.pause(goal.id)?;
            println!("Paused goal: {}", goal.name);
        }

        GoalCommands::Resume { goal } => {
            let goal = service.require(user_id, &goal)?;
            let goal = service.resume(goal.id)?;
            println!("Resumed goal: {}", goal.name);
        }

        GoalCommands::Complete { goal } => {
            let goal = service.require(user_id, &goal)?;
            let goal = service.complete(goal.id)?;
            println!("Completed goal: {}", goal.name);
        }

        GoalCommands::Delete { goal } => {
            let goal = service.require(user_id, &goal)?;
            let goal = service.delete(goal.id)?;
            println!("Deleted goal: {}", goal.name);
        }
    }

    Ok(())
}
