//! Goal service
//!
//! CRUD and lifecycle for savings goals. Every mutation is saved and audited.

use chrono::{NaiveDate, Utc};

use crate::audit::{generate_diff, EntityType};
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::models::{Goal, GoalId, GoalStatus, Money, UserId};
use crate::storage::Storage;

/// Structured input for a new goal
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub priority: i32,
    pub deadline: Option<NaiveDate>,
    pub is_flexible: bool,
    pub min_allocation: Money,
    pub auto_adjust: bool,
    pub notes: String,
}

impl GoalDraft {
    pub fn new(name: impl Into<String>, target_amount: Money, priority: i32) -> Self {
        Self {
            name: name.into(),
            target_amount,
            current_amount: Money::zero(),
            priority,
            deadline: None,
            is_flexible: true,
            min_allocation: Money::zero(),
            auto_adjust: true,
            notes: String::new(),
        }
    }

    pub fn into_goal(self, user_id: UserId) -> Goal {
        let mut goal = Goal::new(user_id, self.name.trim(), self.target_amount, self.priority);
        goal.current_amount = self.current_amount;
        goal.deadline = self.deadline;
        goal.is_flexible = self.is_flexible;
        goal.min_allocation = self.min_allocation;
        goal.auto_adjust = self.auto_adjust;
        goal.notes = self.notes;
        goal
    }
}

/// Field changes for `GoalService::update`; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<Money>,
    pub current_amount: Option<Money>,
    pub priority: Option<i32>,
    /// `Some(None)` clears the deadline
    pub deadline: Option<Option<NaiveDate>>,
    pub is_flexible: Option<bool>,
    pub min_allocation: Option<Money>,
    pub auto_adjust: Option<bool>,
    pub notes: Option<String>,
}

impl GoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.target_amount.is_none()
            && self.current_amount.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.is_flexible.is_none()
            && self.min_allocation.is_none()
            && self.auto_adjust.is_none()
            && self.notes.is_none()
    }
}

/// Service for goal management
pub struct GoalService<'a> {
    storage: &'a Storage,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a goal for `user_id`
    pub fn create(&self, user_id: &UserId, draft: GoalDraft) -> GoalPlanResult<Goal> {
        let goal = draft.into_goal(user_id.clone());

        goal.validate()
            .map_err(|e| GoalPlanError::Validation(e.to_string()))?;

        if self.storage.goals.name_exists(user_id, &goal.name, None)? {
            return Err(GoalPlanError::Duplicate {
                entity_type: "Goal",
                identifier: goal.name.clone(),
            });
        }

        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;

        self.storage.log_create(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;

        Ok(goal)
    }

    pub fn get(&self, id: GoalId) -> GoalPlanResult<Option<Goal>> {
        self.storage.goals.get(id)
    }

    /// Find a user's goal by name or ID string
    ///
    /// IDs may be given in full or as the short `gol-xxxxxxxx` form shown in
    /// listings; a short form that matches more than one goal finds nothing.
    pub fn find(&self, user_id: &UserId, identifier: &str) -> GoalPlanResult<Option<Goal>> {
        if let Some(goal) = self.storage.goals.get_by_name(user_id, identifier)? {
            return Ok(Some(goal));
        }

        let needle = identifier
            .strip_prefix("gol-")
            .unwrap_or(identifier)
            .to_lowercase();
        if needle.len() < 8 {
            return Ok(None);
        }

        let mut matches = self
            .storage
            .goals
            .get_for_user(user_id)?
            .into_iter()
            .filter(|g| g.id.as_uuid().to_string().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(goal), None) => Ok(Some(goal)),
            _ => Ok(None),
        }
    }

    /// Like `find`, but a missing goal is an error
    pub fn require(&self, user_id: &UserId, identifier: &str) -> GoalPlanResult<Goal> {
        self.find(user_id, identifier)?
            .ok_or_else(|| GoalPlanError::goal_not_found(identifier))
    }

    /// A user's goals in priority order
    pub fn list(&self, user_id: &UserId, include_inactive: bool) -> GoalPlanResult<Vec<Goal>> {
        if include_inactive {
            self.storage.goals.get_for_user(user_id)
        } else {
            self.storage.goals.get_active_for_user(user_id)
        }
    }

    pub fn update(&self, id: GoalId, changes: GoalUpdate) -> GoalPlanResult<Goal> {
        let mut goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| GoalPlanError::goal_not_found(id.to_string()))?;

        if changes.is_empty() {
            return Ok(goal);
        }

        let before = goal.clone();

        if let Some(name) = changes.name {
            let name = name.trim();
            if self.storage.goals.name_exists(&goal.user_id, name, Some(id))? {
                return Err(GoalPlanError::Duplicate {
                    entity_type: "Goal",
                    identifier: name.to_string(),
                });
            }
            goal.name = name.to_string();
        }
        if let Some(target) = changes.target_amount {
            goal.target_amount = target;
        }
        if let Some(current) = changes.current_amount {
            goal.current_amount = current;
        }
        if let Some(priority) = changes.priority {
            goal.priority = priority;
        }
        if let Some(deadline) = changes.deadline {
            goal.deadline = deadline;
        }
        if let Some(flexible) = changes.is_flexible {
            goal.is_flexible = flexible;
        }
        if let Some(min) = changes.min_allocation {
            goal.min_allocation = min;
        }
        if let Some(auto) = changes.auto_adjust {
            goal.auto_adjust = auto;
        }
        if let Some(notes) = changes.notes {
            goal.notes = notes;
        }
        goal.updated_at = Utc::now();

        goal.validate()
            .map_err(|e| GoalPlanError::Validation(e.to_string()))?;

        self.save_and_audit(&before, &goal)?;
        Ok(goal)
    }

    pub fn pause(&self, id: GoalId) -> GoalPlanResult<Goal> {
        self.transition(id, GoalStatus::Paused, &[GoalStatus::Active])
    }

    pub fn resume(&self, id: GoalId) -> GoalPlanResult<Goal> {
        self.transition(id, GoalStatus::Active, &[GoalStatus::Paused])
    }

    /// Mark a goal completed; it keeps its history but is no longer funded
    pub fn complete(&self, id: GoalId) -> GoalPlanResult<Goal> {
        self.transition(id, GoalStatus::Completed, &[GoalStatus::Active, GoalStatus::Paused])
    }

    pub fn delete(&self, id: GoalId) -> GoalPlanResult<Goal> {
        let goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| GoalPlanError::goal_not_found(id.to_string()))?;

        self.storage.goals.delete(id)?;
        self.storage.goals.save()?;

        self.storage.log_delete(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        )?;

        Ok(goal)
    }

    fn transition(&self, id: GoalId, to: GoalStatus, allowed_from: &[GoalStatus]) -> GoalPlanResult<Goal> {
        let mut goal = self
            .storage
            .goals
            .get(id)?
            .ok_or_else(|| GoalPlanError::goal_not_found(id.to_string()))?;

        if !allowed_from.contains(&goal.status) {
            return Err(GoalPlanError::Validation(format!(
                "Goal '{}' is {} and cannot become {}",
                goal.name, goal.status, to
            )));
        }

        let before = goal.clone();
        goal.set_status(to);
        if to != GoalStatus::Active {
            goal.monthly_allocation = Money::zero();
        }

        self.save_and_audit(&before, &goal)?;
        Ok(goal)
    }

    fn save_and_audit(&self, before: &Goal, after: &Goal) -> GoalPlanResult<()> {
        self.storage.goals.upsert(after.clone())?;
        self.storage.goals.save()?;

        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(b), Ok(a)) => generate_diff(&b, &a),
            _ => None,
        };

        self.storage.log_update(
            EntityType::Goal,
            after.id.to_string(),
            Some(after.name.clone()),
            before,
            after,
            diff,
        )
    }
}
