//! Budget snapshot builder
//!
//! Turns a financial profile and the configured safety margin into the
//! immutable `BudgetSnapshot` a single allocation run works from.

use chrono::NaiveDate;

use crate::config::SafetyMargin;
use crate::models::{BudgetSnapshot, FinancialProfile, Money};

/// Build the snapshot for one run
///
/// A negative `available_for_goals` is kept as-is; the allocator and the
/// safety classifier deal with over-committed budgets.
pub fn build_snapshot(
    profile: &FinancialProfile,
    margin: &SafetyMargin,
    as_of: NaiveDate,
) -> BudgetSnapshot {
    let safety_margin = margin.amount_for(profile.total_income).non_negative();
    let snapshot = BudgetSnapshot::new(
        profile.total_income,
        profile.committed_fixed_costs,
        safety_margin,
        as_of,
    );

    tracing::debug!(
        user = %profile.user_id,
        income = snapshot.total_income.cents(),
        fixed_costs = snapshot.committed_fixed_costs.cents(),
        safety_margin = snapshot.safety_margin.cents(),
        available = snapshot.available_for_goals.cents(),
        "budget_snapshot_built"
    );

    snapshot
}

/// The same snapshot with income shifted by `delta`
///
/// The safety margin amount is held constant so an income scenario only
/// moves the surplus.
pub fn with_income_delta(snapshot: &BudgetSnapshot, delta: Money) -> BudgetSnapshot {
    BudgetSnapshot::new(
        snapshot.total_income + delta,
        snapshot.committed_fixed_costs,
        snapshot.safety_margin,
        snapshot.as_of,
    )
}
