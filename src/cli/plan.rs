//! Allocation plan CLI commands
//!
//! `plan apply` and `plan simulate --apply` go through the approval and
//! simulation flows, so a critical plan is never applied without the user
//! accepting the risk.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::plan::{format_history, format_plan, format_simulation};
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::flows::approval::{ApprovalEffect, ApprovalInput, ApprovalState};
use crate::flows::simulation::{SimulationEffect, SimulationInput};
use crate::flows::{ApprovalFlow, FlowError, SessionStore, SimulationFlow};
use crate::models::{Goal, SimulationScenario, UserId};
use crate::services::{GoalService, PlannerService};
use crate::storage::Storage;

use super::{parse_date, parse_money};

/// Plan subcommands
#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show how this month's surplus would be split across goals
    Show,

    /// Try a what-if scenario without changing anything
    Simulate {
        #[command(subcommand)]
        scenario: ScenarioCommands,
    },

    /// Apply the current plan to your goals
    Apply {
        /// Why the plan is being applied (kept in the history)
        #[arg(short, long, default_value = "monthly plan")]
        reason: String,
        /// Apply even if the plan leaves no room in the budget
        #[arg(long)]
        accept_risk: bool,
    },

    /// Show previously applied plans
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

/// What-if scenarios
#[derive(Subcommand)]
pub enum ScenarioCommands {
    /// Monthly income changes by an amount (negative for a cut)
    Income {
        /// Change in monthly income (e.g., "500" or "-250")
        #[arg(allow_hyphen_values = true)]
        delta: String,
        /// Apply the resulting plan
        #[arg(long)]
        apply: bool,
        #[arg(short, long, default_value = "income change")]
        reason: String,
    },

    /// A new goal competes for the budget
    NewGoal {
        /// Goal name
        name: String,
        /// Total amount needed
        target: String,
        /// Priority (1 = most important)
        #[arg(short, long, default_value = "1")]
        priority: i32,
        /// Deadline (YYYY-MM-DD)
        #[arg(short, long)]
        deadline: Option<String>,
    },

    /// An existing goal gets a different priority
    Priority {
        /// Goal name or ID
        goal: String,
        /// New priority
        priority: i32,
        /// Apply the resulting plan and keep the new priority
        #[arg(long)]
        apply: bool,
        #[arg(short, long, default_value = "priority change")]
        reason: String,
    },
}

/// Handle a plan command
pub fn handle_plan_command(
    storage: &Storage,
    settings: &Settings,
    user_id: &UserId,
    cmd: PlanCommands,
) -> GoalPlanResult<()> {
    let planner = PlannerService::new(storage, settings);

    match cmd {
        PlanCommands::Show => {
            let result = planner.compute_allocation(user_id)?;
            print!("{}", format_plan(&result));
        }

        PlanCommands::Simulate { scenario } => {
            let (scenario, apply, reason) = build_scenario(storage, user_id, scenario)?;
            run_simulation(&planner, user_id, scenario, apply, &reason)?;
        }

        PlanCommands::Apply {
            reason,
            accept_risk,
        } => run_approval(&planner, user_id, reason, accept_risk)?,

        PlanCommands::History { limit } => {
            let entries = storage.audit().allocation_history(user_id.as_str(), limit)?;
            println!("{}", format_history(&entries));
        }
    }

    Ok(())
}

fn build_scenario(
    storage: &Storage,
    user_id: &UserId,
    cmd: ScenarioCommands,
) -> GoalPlanResult<(SimulationScenario, bool, String)> {
    match cmd {
        ScenarioCommands::Income {
            delta,
            apply,
            reason,
        } => {
            let delta = parse_money(&delta, "income change")?;
            Ok((SimulationScenario::income_change(delta), apply, reason))
        }

        ScenarioCommands::NewGoal {
            name,
            target,
            priority,
            deadline,
        } => {
            let target = parse_money(&target, "target amount")?;
            let mut goal = Goal::new(user_id.clone(), name, target, priority);
            if let Some(deadline) = deadline {
                goal = goal.with_deadline(parse_date(&deadline)?);
            }
            Ok((SimulationScenario::new_goal(goal), false, String::new()))
        }

        ScenarioCommands::Priority {
            goal,
            priority,
            apply,
            reason,
        } => {
            let goal = GoalService::new(storage).require(user_id, &goal)?;
            Ok((
                SimulationScenario::priority_change(goal.id, priority),
                apply,
                reason,
            ))
        }
    }
}

fn run_simulation(
    planner: &PlannerService<'_, Storage>,
    user_id: &UserId,
    scenario: SimulationScenario,
    apply: bool,
    reason: &str,
) -> GoalPlanResult<()> {
    let mut sessions = SessionStore::<SimulationFlow>::new();
    let (session, _) = sessions.start();
    let last = if apply {
        SimulationInput::Apply
    } else {
        SimulationInput::Close
    };

    for input in [SimulationInput::Scenario(scenario), last] {
        let (_, effects) = sessions.advance(session, input)?;

        for effect in effects {
            match effect {
                SimulationEffect::RunSimulation(scenario) => {
                    let result = planner.simulate(user_id, &scenario)?;
                    print!("{}", format_simulation(&result));
                }
                SimulationEffect::ApplySimulation(scenario) => {
                    let applied = planner.apply_simulation(user_id, &scenario, reason)?;
                    println!();
                    if let SimulationScenario::IncomeChange { .. } = scenario {
                        println!("Monthly income is now {}.", applied.summary.total_income);
                    }
                    println!(
                        "Applied: {} goal(s) updated, {} per month allocated.",
                        applied.allocations.len(),
                        applied.summary.total_allocated
                    );
                }
                SimulationEffect::Prompt(_) => {}
            }
        }
    }

    Ok(())
}

fn run_approval(
    planner: &PlannerService<'_, Storage>,
    user_id: &UserId,
    reason: String,
    accept_risk: bool,
) -> GoalPlanResult<()> {
    let mut sessions = SessionStore::<ApprovalFlow>::new();
    let (session, mut pending) = sessions.start();
    let mut state = sessions
        .state(session)
        .cloned()
        .ok_or(FlowError::UnknownSession(session))?;

    loop {
        let mut next_input = None;

        for effect in pending.drain(..) {
            match effect {
                ApprovalEffect::ComputePlan => {
                    let plan = planner.compute_allocation(user_id)?;
                    next_input = Some(ApprovalInput::PlanReady(plan));
                }
                ApprovalEffect::ShowPlan(plan) => print!("{}", format_plan(&plan)),
                ApprovalEffect::Warn(message) => {
                    println!();
                    println!("Warning: {}", message);
                }
                ApprovalEffect::ApplyPlan { reason } => {
                    let result = planner.apply_plan(user_id, &reason)?;
                    println!();
                    println!(
                        "Applied plan: {} goal(s) updated, {} per month allocated.",
                        result.allocations.len(),
                        result.summary.total_allocated
                    );
                }
            }
        }

        let input = match (&state, next_input) {
            (_, Some(input)) => input,
            (ApprovalState::Reviewing { plan, .. }, None) if plan.allocations.is_empty() => {
                println!();
                println!("Nothing to apply.");
                ApprovalInput::Reject
            }
            (
                ApprovalState::Reviewing {
                    plan,
                    risk_acknowledged: false,
                },
                None,
            ) if !plan.safety_check.passed => {
                if !accept_risk {
                    return Err(GoalPlanError::Validation(
                        "Plan not applied. Re-run with --accept-risk to apply it anyway".into(),
                    ));
                }
                ApprovalInput::AcknowledgeRisk
            }
            (ApprovalState::Reviewing { .. }, None) => ApprovalInput::Approve {
                reason: reason.clone(),
            },
            _ => return Ok(()),
        };

        let (next, effects) = sessions.advance(session, input)?;
        state = next;
        pending = effects;

        if sessions.is_empty() && pending.is_empty() {
            return Ok(());
        }
    }
}
