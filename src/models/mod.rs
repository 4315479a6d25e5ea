//! Core data models for goalplan
//!
//! Goals and financial profiles are the persistent inputs; snapshots,
//! allocation results and simulation results are the engine's values.

pub mod allocation;
pub mod goal;
pub mod ids;
pub mod money;
pub mod profile;
pub mod scenario;

pub use allocation::{
    AllocationRecord, AllocationResult, AllocationSummary, ComfortLevel, SafetyCheck, Suggestion,
    SuggestionPriority,
};
pub use goal::{Goal, GoalStatus, GoalValidationError};
pub use ids::{GoalId, SessionId, UserId};
pub use money::{Money, MoneyParseError};
pub use profile::{BudgetSnapshot, FinancialProfile};
pub use scenario::{GoalImpact, ImpactOutcome, ImpactSummary, SimulationResult, SimulationScenario};
