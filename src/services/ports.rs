//! Collaborator contracts of the planner
//!
//! The planner reads profiles and goals and writes plans only through these
//! traits. `Storage` implements all of them; tests plug in their own.

use std::sync::{Arc, Mutex};

use crate::audit::AuditEntry;
use crate::error::GoalPlanResult;
use crate::models::{AllocationRecord, FinancialProfile, Goal, Money, UserId};
use crate::storage::Storage;

use super::ProfileService;

/// Point-in-time income and fixed costs
pub trait FinancialProfileSource {
    fn financial_profile(&self, user_id: &UserId) -> GoalPlanResult<Option<FinancialProfile>>;
}

/// Persists an income change accepted from a scenario
pub trait FinancialProfileSink {
    fn update_income(&self, user_id: &UserId, total_income: Money) -> GoalPlanResult<()>;
}

/// The goals a plan is computed for
pub trait GoalSource {
    fn active_goals(&self, user_id: &UserId) -> GoalPlanResult<Vec<Goal>>;
}

/// Commits a plan onto the user's goals
pub trait AllocationSink {
    /// Must be all-or-nothing for one user
    fn apply_allocations(&self, user_id: &UserId, records: &[AllocationRecord]) -> GoalPlanResult<()>;

    /// Lock held for the whole compute-and-apply of one user's plan
    fn writer_lock(&self, user_id: &UserId) -> GoalPlanResult<Arc<Mutex<()>>>;
}

/// Records applied plans
pub trait AllocationHistorySink {
    fn record_allocation_history(
        &self,
        user_id: &UserId,
        records: &[AllocationRecord],
        reason: &str,
    ) -> GoalPlanResult<()>;
}

/// Everything the planner needs from its environment
pub trait PlanningBackend:
    FinancialProfileSource + FinancialProfileSink + GoalSource + AllocationSink + AllocationHistorySink
{
}

impl<T> PlanningBackend for T where
    T: FinancialProfileSource
        + FinancialProfileSink
        + GoalSource
        + AllocationSink
        + AllocationHistorySink
{
}

impl FinancialProfileSource for Storage {
    fn financial_profile(&self, user_id: &UserId) -> GoalPlanResult<Option<FinancialProfile>> {
        self.profiles.get(user_id)
    }
}

impl FinancialProfileSink for Storage {
    fn update_income(&self, user_id: &UserId, total_income: Money) -> GoalPlanResult<()> {
        ProfileService::new(self)
            .set(user_id, Some(total_income), None)
            .map(|_| ())
    }
}

impl GoalSource for Storage {
    fn active_goals(&self, user_id: &UserId) -> GoalPlanResult<Vec<Goal>> {
        self.goals.get_active_for_user(user_id)
    }
}

impl AllocationSink for Storage {
    fn apply_allocations(&self, user_id: &UserId, records: &[AllocationRecord]) -> GoalPlanResult<()> {
        self.goals.apply_allocations(user_id, records).map(|_| ())
    }

    fn writer_lock(&self, user_id: &UserId) -> GoalPlanResult<Arc<Mutex<()>>> {
        Storage::writer_lock(self, user_id)
    }
}

impl AllocationHistorySink for Storage {
    fn record_allocation_history(
        &self,
        user_id: &UserId,
        records: &[AllocationRecord],
        reason: &str,
    ) -> GoalPlanResult<()> {
        let total: Money = records.iter().map(|r| r.monthly_allocation).sum();
        let summary = format!("{} goal(s), {} per month", records.len(), total);
        self.audit()
            .log(&AuditEntry::apply(user_id.as_str(), records, reason, Some(summary)))
    }
}
