//! Financial profile service

use crate::audit::{generate_diff, EntityType};
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::models::{FinancialProfile, Money, UserId};
use crate::storage::Storage;

pub struct ProfileService<'a> {
    storage: &'a Storage,
}

impl<'a> ProfileService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self, user_id: &UserId) -> GoalPlanResult<Option<FinancialProfile>> {
        self.storage.profiles.get(user_id)
    }

    /// Like `get`, but a user without a profile is an error
    pub fn require(&self, user_id: &UserId) -> GoalPlanResult<FinancialProfile> {
        self.get(user_id)?
            .ok_or_else(|| GoalPlanError::MissingProfile(user_id.to_string()))
    }

    /// Set income and/or fixed costs; fields left `None` keep their value
    ///
    /// A user's first profile needs an income.
    pub fn set(
        &self,
        user_id: &UserId,
        total_income: Option<Money>,
        committed_fixed_costs: Option<Money>,
    ) -> GoalPlanResult<FinancialProfile> {
        let existing = self.get(user_id)?;

        let income = match (total_income, &existing) {
            (Some(income), _) => income,
            (None, Some(p)) => p.total_income,
            (None, None) => {
                return Err(GoalPlanError::Validation(
                    "Monthly income is required for a new profile".into(),
                ))
            }
        };
        let fixed = committed_fixed_costs
            .or(existing.as_ref().map(|p| p.committed_fixed_costs))
            .unwrap_or_default();

        if income.is_negative() {
            return Err(GoalPlanError::Validation("Income cannot be negative".into()));
        }
        if fixed.is_negative() {
            return Err(GoalPlanError::Validation("Fixed costs cannot be negative".into()));
        }

        let profile = FinancialProfile::new(user_id.clone(), income, fixed);
        self.storage.profiles.upsert(profile.clone())?;
        self.storage.profiles.save()?;

        match existing {
            Some(before) => {
                let diff = match (serde_json::to_value(&before), serde_json::to_value(&profile)) {
                    (Ok(b), Ok(a)) => generate_diff(&b, &a),
                    _ => None,
                };
                self.storage.log_update(
                    EntityType::Profile,
                    user_id.as_str(),
                    None,
                    &before,
                    &profile,
                    diff,
                )?;
            }
            None => {
                self.storage
                    .log_create(EntityType::Profile, user_id.as_str(), None, &profile)?;
            }
        }

        Ok(profile)
    }
}
