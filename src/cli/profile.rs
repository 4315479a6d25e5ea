//! Financial profile CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::engine;
use crate::error::GoalPlanResult;
use crate::models::UserId;
use crate::services::ProfileService;
use crate::storage::Storage;

use super::parse_money;

/// Profile subcommands
#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Set monthly income and fixed costs
    Set {
        /// Monthly take-home income (e.g., "5000" or "5,000.00")
        #[arg(short, long)]
        income: Option<String>,
        /// Committed fixed costs per month (rent, bills, debt payments)
        #[arg(short, long)]
        fixed: Option<String>,
    },
    /// Show the profile and what is left for goals
    Show,
}

/// Handle a profile command
pub fn handle_profile_command(
    storage: &Storage,
    settings: &Settings,
    user_id: &UserId,
    cmd: ProfileCommands,
) -> GoalPlanResult<()> {
    let service = ProfileService::new(storage);

    match cmd {
        ProfileCommands::Set { income, fixed } => {
            let income = income.map(|v| parse_money(&v, "income")).transpose()?;
            let fixed = fixed.map(|v| parse_money(&v, "fixed costs")).transpose()?;

            let profile = service.set(user_id, income, fixed)?;
            println!("Profile saved for '{}'", user_id);
            println!("  Income:      {}", profile.total_income);
            println!("  Fixed costs: {}", profile.committed_fixed_costs);
        }

        ProfileCommands::Show => match service.get(user_id)? {
            Some(profile) => {
                let snapshot = engine::build_snapshot(
                    &profile,
                    &settings.safety_margin,
                    chrono::Local::now().date_naive(),
                );

                println!("Profile for '{}':", user_id);
                println!("  Income:              {}", snapshot.total_income);
                println!("  Fixed costs:         {}", snapshot.committed_fixed_costs);
                println!("  Safety margin:       {}", snapshot.safety_margin);
                println!("  Available for goals: {}", snapshot.available_for_goals);
                println!(
                    "  Updated:             {}",
                    profile.updated_at.format("%Y-%m-%d %H:%M")
                );
                if snapshot.is_over_committed() {
                    println!();
                    println!("Warning: fixed costs and the safety margin exceed your income.");
                }
            }
            None => {
                println!("No profile set for '{}'.", user_id);
                println!();
                println!("Use 'goalplan profile set --income <amount>' to create one.");
            }
        },
    }

    Ok(())
}
