//! Financial profile and budget snapshot models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;
use super::money::Money;

/// Point-in-time income and committed costs for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub user_id: UserId,
    /// Monthly take-home income
    pub total_income: Money,
    /// Rent, loan payments, bills and other non-negotiable monthly costs
    pub committed_fixed_costs: Money,
    pub updated_at: DateTime<Utc>,
}

impl FinancialProfile {
    pub fn new(user_id: UserId, total_income: Money, committed_fixed_costs: Money) -> Self {
        Self {
            user_id,
            total_income,
            committed_fixed_costs,
            updated_at: Utc::now(),
        }
    }

    /// Monthly surplus before any safety margin is withheld
    pub fn surplus(&self) -> Money {
        self.total_income - self.committed_fixed_costs
    }
}

/// Immutable numeric inputs for one allocation run
///
/// `available_for_goals` may be negative when the budget is over-committed;
/// it is never clamped here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub total_income: Money,
    pub committed_fixed_costs: Money,
    pub safety_margin: Money,
    pub available_for_goals: Money,
    /// The "current month" that completion dates are projected from
    pub as_of: NaiveDate,
}

impl BudgetSnapshot {
    pub fn new(
        total_income: Money,
        committed_fixed_costs: Money,
        safety_margin: Money,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            total_income,
            committed_fixed_costs,
            safety_margin,
            available_for_goals: total_income - committed_fixed_costs - safety_margin,
            as_of,
        }
    }

    pub fn is_over_committed(&self) -> bool {
        self.available_for_goals.is_negative()
    }
}
