//! CLI commands for exporting plans
//!
//! Writes to a file, or to stdout when no output path is given.

use clap::{Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::export::{csv, json, yaml};
use crate::models::{SimulationScenario, UserId};
use crate::services::PlannerService;
use crate::storage::Storage;

use super::parse_money;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (allocation records only)
    Csv,
    /// JSON format (full plan)
    Json,
    /// YAML format (full plan, human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the current allocation plan
    Plan {
        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export an income what-if simulation
    Simulation {
        /// Change in monthly income (e.g., "500" or "-250")
        #[arg(allow_hyphen_values = true)]
        income_delta: String,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (json or yaml)
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn open_output(output: Option<&PathBuf>) -> GoalPlanResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                GoalPlanError::Export(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    user_id: &UserId,
    cmd: ExportCommands,
) -> GoalPlanResult<()> {
    let planner = PlannerService::new(storage, settings);

    match cmd {
        ExportCommands::Plan {
            output,
            format,
            pretty,
        } => {
            let plan = planner.compute_allocation(user_id)?;
            let mut writer = open_output(output.as_ref())?;

            match format {
                ExportFormat::Csv => csv::export_allocations_csv(&plan.allocations, &mut writer)?,
                ExportFormat::Json => json::export_plan_json(user_id, &plan, &mut writer, pretty)?,
                ExportFormat::Yaml => yaml::export_plan_yaml(user_id, &plan, &mut writer)?,
            }
            writer
                .flush()
                .map_err(|e| GoalPlanError::Export(e.to_string()))?;

            if let Some(path) = output {
                eprintln!(
                    "Exported plan for {} goal(s) to: {}",
                    plan.allocations.len(),
                    path.display()
                );
            }
        }

        ExportCommands::Simulation {
            income_delta,
            output,
            format,
            pretty,
        } => {
            let delta = parse_money(&income_delta, "income change")?;
            let scenario = SimulationScenario::income_change(delta);
            if matches!(format, ExportFormat::Csv) {
                return Err(GoalPlanError::Export(
                    "Simulations can only be exported as JSON or YAML".into(),
                ));
            }

            let result = planner.simulate(user_id, &scenario)?;
            let mut writer = open_output(output.as_ref())?;

            if matches!(format, ExportFormat::Yaml) {
                yaml::export_simulation_yaml(user_id, &result, &mut writer)?;
            } else {
                json::export_simulation_json(user_id, &result, &mut writer, pretty)?;
            }
            writer
                .flush()
                .map_err(|e| GoalPlanError::Export(e.to_string()))?;

            if let Some(path) = output {
                eprintln!("Exported simulation to: {}", path.display());
            }
        }
    }

    Ok(())
}
