//! Service layer for goalplan
//!
//! Business logic on top of the storage layer: validation, auditing, and the
//! planner that drives the allocation engine.

pub mod goal;
pub mod planner;
pub mod ports;
pub mod profile;

pub use goal::{GoalDraft, GoalService, GoalUpdate};
pub use planner::PlannerService;
pub use ports::{
    AllocationHistorySink, AllocationSink, FinancialProfileSink, FinancialProfileSource,
    GoalSource, PlanningBackend,
};
pub use profile::ProfileService;
