//! Export module for goalplan
//!
//! - CSV: allocation records, one row per goal (spreadsheet-compatible)
//! - JSON: a plan or simulation in a versioned wrapper
//! - YAML: the same wrapper, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_allocations_csv;
pub use self::json::{
    export_plan_json, export_simulation_json, read_plan_json, ExportDocument, PlanExport,
    SimulationExport, EXPORT_SCHEMA_VERSION,
};
pub use self::yaml::{export_plan_yaml, export_simulation_yaml};
