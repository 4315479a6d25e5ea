//! YAML export for human-readable plan snapshots

use std::io::Write;

use crate::error::{GoalPlanError, GoalPlanResult};
use crate::export::json::ExportDocument;
use crate::models::{AllocationResult, SimulationResult, UserId};

fn write_header<W: Write>(writer: &mut W, title: &str, user_id: &UserId) -> GoalPlanResult<()> {
    let header = format!(
        "# goalplan {}\n# User: {}\n# Generated: {}\n# App Version: {}\n\n",
        title,
        user_id,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        env!("CARGO_PKG_VERSION")
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| GoalPlanError::Export(e.to_string()))
}

/// Export an allocation plan as YAML
pub fn export_plan_yaml<W: Write>(
    user_id: &UserId,
    plan: &AllocationResult,
    writer: &mut W,
) -> GoalPlanResult<()> {
    write_header(writer, "allocation plan", user_id)?;

    let export = ExportDocument::new(user_id.clone(), plan);
    serde_yaml::to_writer(writer, &export).map_err(|e| GoalPlanError::Export(e.to_string()))
}

/// Export a simulation as YAML
pub fn export_simulation_yaml<W: Write>(
    user_id: &UserId,
    simulation: &SimulationResult,
    writer: &mut W,
) -> GoalPlanResult<()> {
    write_header(writer, "simulation", user_id)?;

    let export = ExportDocument::new(user_id.clone(), simulation);
    serde_yaml::to_writer(writer, &export).map_err(|e| GoalPlanError::Export(e.to_string()))
}
