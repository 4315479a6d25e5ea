//! Goal repository for JSON storage
//!
//! Manages loading and saving goals to goals.json. Goals of every user live
//! in one file; queries are scoped by `UserId`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::GoalPlanError;
use crate::models::{AllocationRecord, Goal, GoalId, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GoalData {
    #[serde(default)]
    goals: Vec<Goal>,
}

/// Repository for goal persistence
pub struct GoalRepository {
    path: PathBuf,
    goals: RwLock<HashMap<GoalId, Goal>>,
}

fn by_priority(a: &Goal, b: &Goal) -> std::cmp::Ordering {
    a.priority
        .cmp(&b.priority)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

impl GoalRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            goals: RwLock::new(HashMap::new()),
        }
    }

    /// Load goals from disk
    pub fn load(&self) -> Result<(), GoalPlanError> {
        let file_data: GoalData = read_json(&self.path)?;

        let mut goals = self
            .goals
            .write()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        goals.clear();
        for goal in file_data.goals {
            goals.insert(goal.id, goal);
        }

        Ok(())
    }

    /// Save goals to disk
    pub fn save(&self) -> Result<(), GoalPlanError> {
        let goals = self
            .goals
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_snapshot(&self.path, &goals)
    }

    pub fn get(&self, id: GoalId) -> Result<Option<Goal>, GoalPlanError> {
        let goals = self
            .goals
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(goals.get(&id).cloned())
    }

    /// All goals of a user, in priority order
    pub fn get_for_user(&self, user_id: &UserId) -> Result<Vec<Goal>, GoalPlanError> {
        let goals = self
            .goals
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = goals
            .values()
            .filter(|g| &g.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(by_priority);
        Ok(list)
    }

    /// Active goals of a user, in priority order
    pub fn get_active_for_user(&self, user_id: &UserId) -> Result<Vec<Goal>, GoalPlanError> {
        let all = self.get_for_user(user_id)?;
        Ok(all.into_iter().filter(|g| g.is_active()).collect())
    }

    /// Get a user's goal by name (case-insensitive)
    pub fn get_by_name(&self, user_id: &UserId, name: &str) -> Result<Option<Goal>, GoalPlanError> {
        let goals = self
            .goals
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = name.to_lowercase();
        Ok(goals
            .values()
            .find(|g| &g.user_id == user_id && g.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Check if a user already has a goal with this name
    pub fn name_exists(
        &self,
        user_id: &UserId,
        name: &str,
        exclude_id: Option<GoalId>,
    ) -> Result<bool, GoalPlanError> {
        let goals = self
            .goals
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = name.to_lowercase();
        Ok(goals.values().any(|g| {
            &g.user_id == user_id && g.name.to_lowercase() == name_lower && Some(g.id) != exclude_id
        }))
    }

    pub fn upsert(&self, goal: Goal) -> Result<(), GoalPlanError> {
        let mut goals = self
            .goals
            .write()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        goals.insert(goal.id, goal);
        Ok(())
    }

    pub fn delete(&self, id: GoalId) -> Result<bool, GoalPlanError> {
        let mut goals = self
            .goals
            .write()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(goals.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, GoalPlanError> {
        let goals = self
            .goals
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(goals.len())
    }

    /// Write a batch of allocation records onto the user's goals
    ///
    /// Every record is checked before anything changes: the goal must exist,
    /// belong to `user_id`, be active, and still need the amount the plan was
    /// computed for. The batch is then written under one lock and saved; if
    /// the save fails the in-memory goals are restored. Returns the updated
    /// goals.
    pub fn apply_allocations(
        &self,
        user_id: &UserId,
        records: &[AllocationRecord],
    ) -> Result<Vec<Goal>, GoalPlanError> {
        let mut goals = self
            .goals
            .write()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        for record in records {
            let goal = goals
                .get(&record.goal_id)
                .filter(|g| &g.user_id == user_id)
                .ok_or_else(|| GoalPlanError::goal_not_found(record.goal_id.to_string()))?;

            if !goal.is_active() || goal.remaining_amount() != record.remaining_amount {
                return Err(GoalPlanError::Conflict(format!(
                    "goal '{}' changed after the plan was computed",
                    goal.name
                )));
            }
        }

        let previous: Vec<Goal> = records
            .iter()
            .filter_map(|r| goals.get(&r.goal_id).cloned())
            .collect();

        let mut updated = Vec::with_capacity(records.len());
        for record in records {
            if let Some(goal) = goals.get_mut(&record.goal_id) {
                goal.set_monthly_allocation(record.monthly_allocation);
                if goal.priority != record.priority {
                    goal.set_priority(record.priority);
                }
                updated.push(goal.clone());
            }
        }

        if let Err(e) = write_snapshot(&self.path, &goals) {
            for goal in previous {
                goals.insert(goal.id, goal);
            }
            return Err(e);
        }

        Ok(updated)
    }
}

fn write_snapshot(path: &Path, goals: &HashMap<GoalId, Goal>) -> Result<(), GoalPlanError> {
    let mut goal_list: Vec<_> = goals.values().cloned().collect();
    goal_list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    write_json_atomic(path, &GoalData { goals: goal_list })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalStatus, Money};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, GoalRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("goals.json");
        let repo = GoalRepository::new(path);
        (temp_dir, repo)
    }

    fn goal(user: &str, name: &str, priority: i32) -> Goal {
        Goal::new(UserId::new(user), name, Money::from_units(1_000), priority)
    }

    fn record_for(goal: &Goal, amount: i64) -> AllocationRecord {
        let mut record = AllocationRecord::new(goal.id, &goal.name, goal.priority, goal.remaining_amount());
        record.monthly_allocation = Money::from_units(amount);
        record
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let g = goal("alice", "Vacation", 2);
        let id = g.id;
        repo.upsert(g).unwrap();
        repo.save().unwrap();

        let repo2 = GoalRepository::new(temp_dir.path().join("goals.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().name, "Vacation");
    }

    #[test]
    fn test_scoped_by_user_and_sorted() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(goal("alice", "Later", 5)).unwrap();
        repo.upsert(goal("alice", "First", 1)).unwrap();
        repo.upsert(goal("bob", "Bob's", 1)).unwrap();
        let mut paused = goal("alice", "Paused", 0);
        paused.status = GoalStatus::Paused;
        repo.upsert(paused).unwrap();

        let alice = UserId::new("alice");
        let names: Vec<_> = repo
            .get_for_user(&alice)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Paused", "First", "Later"]);
        assert_eq!(repo.get_active_for_user(&alice).unwrap().len(), 2);
    }

    #[test]
    fn test_name_lookup_is_case_insensitive_and_scoped() {
        let (_temp_dir, repo) = create_test_repo();
        let g = goal("alice", "New Car", 1);
        let id = g.id;
        repo.upsert(g).unwrap();

        let alice = UserId::new("alice");
        assert!(repo.get_by_name(&alice, "new car").unwrap().is_some());
        assert!(repo.get_by_name(&UserId::new("bob"), "new car").unwrap().is_none());
        assert!(repo.name_exists(&alice, "NEW CAR", None).unwrap());
        assert!(!repo.name_exists(&alice, "new car", Some(id)).unwrap());
    }

    #[test]
    fn test_apply_allocations_writes_batch() {
        let (temp_dir, repo) = create_test_repo();
        let a = goal("alice", "A", 1);
        let b = goal("alice", "B", 2);
        let records = vec![record_for(&a, 300), record_for(&b, 200)];
        repo.upsert(a.clone()).unwrap();
        repo.upsert(b.clone()).unwrap();

        let updated = repo.apply_allocations(&UserId::new("alice"), &records).unwrap();
        assert_eq!(updated.len(), 2);

        let reloaded = GoalRepository::new(temp_dir.path().join("goals.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(a.id).unwrap().unwrap().monthly_allocation, Money::from_units(300));
        assert_eq!(reloaded.get(b.id).unwrap().unwrap().monthly_allocation, Money::from_units(200));
    }

    #[test]
    fn test_apply_allocations_is_all_or_nothing() {
        let (_temp_dir, repo) = create_test_repo();
        let a = goal("alice", "A", 1);
        let stranger = goal("bob", "Bob's", 1);
        repo.upsert(a.clone()).unwrap();
        repo.upsert(stranger.clone()).unwrap();

        let records = vec![record_for(&a, 300), record_for(&stranger, 100)];
        let err = repo.apply_allocations(&UserId::new("alice"), &records).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.get(a.id).unwrap().unwrap().monthly_allocation, Money::zero());
    }

    #[test]
    fn test_apply_allocations_detects_stale_plan() {
        let (_temp_dir, repo) = create_test_repo();
        let a = goal("alice", "A", 1);
        let record = record_for(&a, 300);
        let mut changed = a.clone();
        changed.current_amount = Money::from_units(400);
        repo.upsert(changed).unwrap();

        let err = repo.apply_allocations(&UserId::new("alice"), &[record]).unwrap_err();
        assert!(matches!(err, GoalPlanError::Conflict(_)));
    }

    #[test]
    fn test_apply_allocations_persists_priority() {
        let (_temp_dir, repo) = create_test_repo();
        let a = goal("alice", "A", 4);
        let mut record = record_for(&a, 100);
        record.priority = 1;
        repo.upsert(a.clone()).unwrap();

        repo.apply_allocations(&UserId::new("alice"), &[record]).unwrap();
        assert_eq!(repo.get(a.id).unwrap().unwrap().priority, 1);
    }
}
