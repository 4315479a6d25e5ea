//! Planner service
//!
//! The query and commit surface over the allocation engine: compute a plan,
//! run a what-if, and apply a plan to the user's goals.

use chrono::{Local, NaiveDate};

use crate::config::{SafetyMargin, Settings};
use crate::engine::{self, EngineConfig};
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::models::{
    AllocationRecord, AllocationResult, BudgetSnapshot, Goal, SimulationResult,
    SimulationScenario, UserId,
};

use super::ports::PlanningBackend;

/// Service for computing, simulating and applying allocation plans
pub struct PlannerService<'a, B: PlanningBackend + ?Sized> {
    backend: &'a B,
    config: EngineConfig,
    margin: SafetyMargin,
    as_of: NaiveDate,
}

impl<'a, B: PlanningBackend + ?Sized> PlannerService<'a, B> {
    /// Planner for today's date with the engine settings from `settings`
    pub fn new(backend: &'a B, settings: &Settings) -> Self {
        Self {
            backend,
            config: settings.engine_config(),
            margin: settings.safety_margin.clone(),
            as_of: Local::now().date_naive(),
        }
    }

    /// Plan as if today were `as_of`
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    fn inputs(&self, user_id: &UserId) -> GoalPlanResult<(BudgetSnapshot, Vec<Goal>)> {
        let profile = self
            .backend
            .financial_profile(user_id)?
            .ok_or_else(|| GoalPlanError::MissingProfile(user_id.to_string()))?;
        let goals = self.backend.active_goals(user_id)?;
        let snapshot = engine::build_snapshot(&profile, &self.margin, self.as_of);
        Ok((snapshot, goals))
    }

    /// Current plan for the user; nothing is written
    pub fn compute_allocation(&self, user_id: &UserId) -> GoalPlanResult<AllocationResult> {
        let (snapshot, goals) = self.inputs(user_id)?;
        Ok(engine::run_pipeline(&snapshot, &goals, &self.config))
    }

    /// What-if run; nothing is written
    pub fn simulate(
        &self,
        user_id: &UserId,
        scenario: &SimulationScenario,
    ) -> GoalPlanResult<SimulationResult> {
        let (snapshot, goals) = self.inputs(user_id)?;
        engine::simulate(&goals, &snapshot, scenario, &self.config)
    }

    /// Compute the current plan and commit it
    pub fn apply_plan(&self, user_id: &UserId, reason: &str) -> GoalPlanResult<AllocationResult> {
        let lock = self.backend.writer_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| GoalPlanError::Conflict(user_id.to_string()))?;

        let result = self.compute_allocation(user_id)?;
        self.commit(user_id, &result.allocations, reason)?;
        Ok(result)
    }

    /// Commit the outcome of a scenario and return the plan that was applied
    ///
    /// An income scenario updates the stored income first and then applies
    /// the plan computed from it; the old income is restored if that plan
    /// cannot be written. A priority scenario persists the new priority with
    /// the allocations. A new-goal scenario cannot be applied, because the
    /// goal does not exist yet.
    pub fn apply_simulation(
        &self,
        user_id: &UserId,
        scenario: &SimulationScenario,
        reason: &str,
    ) -> GoalPlanResult<AllocationResult> {
        if let SimulationScenario::NewGoal { goal } = scenario {
            return Err(GoalPlanError::Validation(format!(
                "add '{}' as a goal before applying this scenario",
                goal.name
            )));
        }

        let lock = self.backend.writer_lock(user_id)?;
        let _guard = lock
            .lock()
            .map_err(|_| GoalPlanError::Conflict(user_id.to_string()))?;

        let result = self.simulate(user_id, scenario)?;
        let reason = format!("{} ({})", reason, scenario);

        let SimulationScenario::IncomeChange { delta } = scenario else {
            self.commit(user_id, &result.after.allocations, &reason)?;
            return Ok(result.after);
        };

        let previous = result.before.summary.total_income;
        let income = previous + *delta;
        if income.is_negative() {
            return Err(GoalPlanError::Validation(format!(
                "income cannot fall below zero (currently {})",
                previous
            )));
        }

        self.backend.update_income(user_id, income)?;
        let applied = self
            .compute_allocation(user_id)
            .and_then(|plan| self.commit(user_id, &plan.allocations, &reason).map(|_| plan));

        if applied.is_err() {
            if let Err(e) = self.backend.update_income(user_id, previous) {
                tracing::warn!(user = %user_id, error = %e, "income_restore_failed");
            }
        }
        applied
    }

    fn commit(&self, user_id: &UserId, records: &[AllocationRecord], reason: &str) -> GoalPlanResult<()> {
        self.backend.apply_allocations(user_id, records)?;

        tracing::info!(user = %user_id, goals = records.len(), reason, "plan_applied");

        if let Err(e) = self
            .backend
            .record_allocation_history(user_id, records, reason)
        {
            tracing::warn!(user = %user_id, error = %e, "allocation_history_failed");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinancialProfile, GoalId, Money};
    use crate::services::ports::{
        AllocationHistorySink, AllocationSink, FinancialProfileSink, FinancialProfileSource,
        GoalSource,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory backend with a history sink that can be told to fail
    #[derive(Default)]
    struct MemoryBackend {
        profiles: Mutex<HashMap<UserId, FinancialProfile>>,
        goals: Mutex<Vec<Goal>>,
        history: Mutex<Vec<String>>,
        fail_history: bool,
        fail_apply: bool,
        lock: Arc<Mutex<()>>,
    }

    impl MemoryBackend {
        fn income(&self) -> Money {
            self.profiles.lock().unwrap()[&user()].total_income
        }
    }

    impl FinancialProfileSource for MemoryBackend {
        fn financial_profile(&self, user_id: &UserId) -> GoalPlanResult<Option<FinancialProfile>> {
            Ok(self.profiles.lock().unwrap().get(user_id).cloned())
        }
    }

    impl FinancialProfileSink for MemoryBackend {
        fn update_income(&self, user_id: &UserId, total_income: Money) -> GoalPlanResult<()> {
            let mut profiles = self.profiles.lock().unwrap();
            let profile = profiles
                .get_mut(user_id)
                .ok_or_else(|| GoalPlanError::MissingProfile(user_id.to_string()))?;
            profile.total_income = total_income;
            Ok(())
        }
    }

    impl GoalSource for MemoryBackend {
        fn active_goals(&self, user_id: &UserId) -> GoalPlanResult<Vec<Goal>> {
            Ok(self
                .goals
                .lock()
                .unwrap()
                .iter()
                .filter(|g| &g.user_id == user_id && g.is_active())
                .cloned()
                .collect())
        }
    }

    impl AllocationSink for MemoryBackend {
        fn apply_allocations(&self, _user_id: &UserId, records: &[AllocationRecord]) -> GoalPlanResult<()> {
            if self.fail_apply {
                return Err(GoalPlanError::Storage("disk full".into()));
            }
            let mut goals = self.goals.lock().unwrap();
            for record in records {
                let goal = goals
                    .iter_mut()
                    .find(|g| g.id == record.goal_id)
                    .ok_or_else(|| GoalPlanError::goal_not_found(record.goal_id.to_string()))?;
                goal.monthly_allocation = record.monthly_allocation;
                goal.priority = record.priority;
            }
            Ok(())
        }

        fn writer_lock(&self, _user_id: &UserId) -> GoalPlanResult<Arc<Mutex<()>>> {
            Ok(Arc::clone(&self.lock))
        }
    }

    impl AllocationHistorySink for MemoryBackend {
        fn record_allocation_history(
            &self,
            _user_id: &UserId,
            _records: &[AllocationRecord],
            reason: &str,
        ) -> GoalPlanResult<()> {
            if self.fail_history {
                return Err(GoalPlanError::Io("history store unavailable".into()));
            }
            self.history.lock().unwrap().push(reason.to_string());
            Ok(())
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn user() -> UserId {
        UserId::new("alice")
    }

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::default();
        backend.profiles.lock().unwrap().insert(
            user(),
            FinancialProfile::new(user(), Money::from_units(15_000), Money::from_units(9_000)),
        );
        let g1 = Goal::new(user(), "g1", Money::from_units(6_000), 1)
            .with_deadline(NaiveDate::from_ymd_opt(2026, 4, 15).unwrap());
        let g2 = Goal::new(user(), "g2", Money::from_units(12_000), 5);
        *backend.goals.lock().unwrap() = vec![g1, g2];
        backend
    }

    fn settings() -> Settings {
        Settings {
            safety_margin: SafetyMargin::Fixed {
                amount: Money::from_units(1_000),
            },
            ..Settings::default()
        }
    }

    fn planner(backend: &MemoryBackend) -> PlannerService<'_, MemoryBackend> {
        PlannerService::new(backend, &settings()).with_as_of(as_of())
    }

    #[test]
    fn test_compute_allocation_is_read_only() {
        let backend = backend();
        let result = planner(&backend).compute_allocation(&user()).unwrap();

        assert_eq!(result.summary.available_for_goals, Money::from_units(5_000));
        assert_eq!(result.allocations[1].monthly_allocation, Money::from_units(3_000));
        assert!(backend
            .goals
            .lock()
            .unwrap()
            .iter()
            .all(|g| g.monthly_allocation.is_zero()));
    }

    #[test]
    fn test_missing_profile_is_fatal() {
        let backend = MemoryBackend::default();
        let err = planner(&backend).compute_allocation(&user()).unwrap_err();
        assert!(matches!(err, GoalPlanError::MissingProfile(_)));
    }

    #[test]
    fn test_apply_plan_writes_and_records_history() {
        let backend = backend();
        planner(&backend).apply_plan(&user(), "monthly plan").unwrap();

        let goals = backend.goals.lock().unwrap();
        assert_eq!(goals[0].monthly_allocation, Money::from_units(2_000));
        assert_eq!(goals[1].monthly_allocation, Money::from_units(3_000));
        assert_eq!(*backend.history.lock().unwrap(), vec!["monthly plan".to_string()]);
    }

    #[test]
    fn test_history_failure_does_not_fail_apply() {
        let mut backend = backend();
        backend.fail_history = true;

        let result = planner(&backend).apply_plan(&user(), "monthly plan").unwrap();
        assert_eq!(result.allocations.len(), 2);
        assert_eq!(
            backend.goals.lock().unwrap()[0].monthly_allocation,
            Money::from_units(2_000)
        );
    }

    #[test]
    fn test_simulate_does_not_write() {
        let backend = backend();
        let scenario = SimulationScenario::income_change(Money::from_units(2_000));
        let result = planner(&backend).simulate(&user(), &scenario).unwrap();

        assert_eq!(result.impact_summary.goals_improved, 1);
        assert!(backend.history.lock().unwrap().is_empty());
        assert!(backend
            .goals
            .lock()
            .unwrap()
            .iter()
            .all(|g| g.monthly_allocation.is_zero()));
    }

    #[test]
    fn test_apply_priority_simulation_persists_priority() {
        let backend = backend();
        let g2 = backend.goals.lock().unwrap()[1].id;
        let scenario = SimulationScenario::priority_change(g2, 0);

        planner(&backend)
            .apply_simulation(&user(), &scenario, "reprioritize")
            .unwrap();

        let goals = backend.goals.lock().unwrap();
        assert_eq!(goals[1].priority, 0);
        assert!(backend.history.lock().unwrap()[0].starts_with("reprioritize"));
    }

    #[test]
    fn test_apply_income_simulation_updates_income() {
        let backend = backend();
        let scenario = SimulationScenario::income_change(Money::from_units(2_000));

        let applied = planner(&backend)
            .apply_simulation(&user(), &scenario, "raise")
            .unwrap();

        assert_eq!(backend.income(), Money::from_units(17_000));
        assert_eq!(applied.summary.available_for_goals, Money::from_units(7_000));
        let stored: Money = backend
            .goals
            .lock()
            .unwrap()
            .iter()
            .map(|g| g.monthly_allocation)
            .sum();
        assert_eq!(stored, applied.summary.total_allocated);
        assert!(stored <= applied.summary.available_for_goals);

        // a later plan against the stored profile spends the same budget
        let next = planner(&backend).compute_allocation(&user()).unwrap();
        assert_eq!(next.summary.available_for_goals, Money::from_units(7_000));
        assert_eq!(next.allocations, applied.allocations);
    }

    #[test]
    fn test_failed_income_apply_restores_income() {
        let mut backend = backend();
        backend.fail_apply = true;
        let scenario = SimulationScenario::income_change(Money::from_units(2_000));

        assert!(planner(&backend)
            .apply_simulation(&user(), &scenario, "raise")
            .is_err());
        assert_eq!(backend.income(), Money::from_units(15_000));
        assert!(backend.history.lock().unwrap().is_empty());
    }

    #[test]
    fn test_income_cannot_be_applied_below_zero() {
        let backend = backend();
        let scenario = SimulationScenario::income_change(Money::from_units(-20_000));
        let err = planner(&backend)
            .apply_simulation(&user(), &scenario, "cut")
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(backend.income(), Money::from_units(15_000));
    }

    #[test]
    fn test_new_goal_simulation_cannot_be_applied() {
        let backend = backend();
        let goal = Goal::new(user(), "boat", Money::from_units(9_000), 3);
        let err = planner(&backend)
            .apply_simulation(&user(), &SimulationScenario::new_goal(goal), "try")
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_unknown_goal_priority_change() {
        let backend = backend();
        let scenario = SimulationScenario::priority_change(GoalId::new(), 1);
        assert!(planner(&backend)
            .simulate(&user(), &scenario)
            .unwrap_err()
            .is_not_found());
    }
}
