//! JSON export of allocation plans and simulations
//!
//! Every export is wrapped in a document carrying a schema version so a
//! consumer can tell which layout it is reading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{GoalPlanError, GoalPlanResult};
use crate::models::{AllocationResult, SimulationResult, UserId};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Versioned wrapper around an exported value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument<T> {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// Owner of the goals the export describes
    pub user_id: UserId,

    pub content: T,
}

impl<T> ExportDocument<T> {
    pub fn new(user_id: UserId, content: T) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            user_id,
            content,
        }
    }
}

pub type PlanExport = ExportDocument<AllocationResult>;
pub type SimulationExport = ExportDocument<SimulationResult>;

pub(crate) fn write_json<T: Serialize, W: Write>(
    value: &T,
    writer: &mut W,
    pretty: bool,
) -> GoalPlanResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)
    } else {
        serde_json::to_writer(&mut *writer, value)
    }
    .map_err(|e| GoalPlanError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| GoalPlanError::Export(e.to_string()))?;
    Ok(())
}

/// Export an allocation plan as JSON
pub fn export_plan_json<W: Write>(
    user_id: &UserId,
    plan: &AllocationResult,
    writer: &mut W,
    pretty: bool,
) -> GoalPlanResult<()> {
    let export = ExportDocument::new(user_id.clone(), plan);
    write_json(&export, writer, pretty)
}

/// Export a simulation (both runs plus the impact summary) as JSON
pub fn export_simulation_json<W: Write>(
    user_id: &UserId,
    simulation: &SimulationResult,
    writer: &mut W,
    pretty: bool,
) -> GoalPlanResult<()> {
    let export = ExportDocument::new(user_id.clone(), simulation);
    write_json(&export, writer, pretty)
}

/// Read a plan export back, rejecting other schema versions
pub fn read_plan_json(json: &str) -> GoalPlanResult<PlanExport> {
    let export: PlanExport =
        serde_json::from_str(json).map_err(|e| GoalPlanError::Export(e.to_string()))?;

    if export.schema_version != EXPORT_SCHEMA_VERSION {
        return Err(GoalPlanError::Export(format!(
            "Schema version mismatch: expected {}, got {}",
            EXPORT_SCHEMA_VERSION, export.schema_version
        )));
    }

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{run_pipeline, EngineConfig};
    use crate::models::{BudgetSnapshot, Goal, Money};
    use chrono::NaiveDate;

    fn plan() -> AllocationResult {
        let snapshot = BudgetSnapshot::new(
            Money::from_units(5_000),
            Money::from_units(2_000),
            Money::zero(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        );
        let goal = Goal::new(UserId::new("sam"), "Car", Money::from_units(6_000), 1);
        run_pipeline(&snapshot, &[goal], &EngineConfig::default())
    }

    #[test]
    fn test_plan_export_reads_back() {
        let plan = plan();
        let mut output = Vec::new();
        export_plan_json(&UserId::new("sam"), &plan, &mut output, true).unwrap();

        let json = String::from_utf8(output).unwrap();
        assert!(json.contains("\"schema_version\": \"1.0.0\""));

        let export = read_plan_json(&json).unwrap();
        assert_eq!(export.user_id, UserId::new("sam"));
        assert_eq!(export.content, plan);
    }

    #[test]
    fn test_money_is_exported_as_cents() {
        let mut output = Vec::new();
        export_plan_json(&UserId::new("sam"), &plan(), &mut output, false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(value["content"]["summary"]["available_for_goals"], 300_000);
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let mut output = Vec::new();
        export_plan_json(&UserId::new("sam"), &plan(), &mut output, false).unwrap();
        let json = String::from_utf8(output)
            .unwrap()
            .replace(EXPORT_SCHEMA_VERSION, "0.1.0");

        let err = read_plan_json(&json).unwrap_err();
        assert!(err.to_string().contains("Schema version mismatch"));
    }
}
