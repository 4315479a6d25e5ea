//! Storage layer for goalplan
//!
//! JSON file storage with atomic writes, the audit log, and the per-user
//! writer locks that serialize plan applies.

pub mod file_io;
pub mod goals;
pub mod init;
pub mod profiles;

pub use file_io::{read_json, write_json_atomic};
pub use goals::GoalRepository;
pub use init::initialize_storage;
pub use profiles::ProfileRepository;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::GoalPlanPaths;
use crate::error::{GoalPlanError, GoalPlanResult};
use crate::models::UserId;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: GoalPlanPaths,
    pub goals: GoalRepository,
    pub profiles: ProfileRepository,
    audit: AuditLogger,
    writer_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl Storage {
    pub fn new(paths: GoalPlanPaths) -> Result<Self, GoalPlanError> {
        paths.ensure_directories()?;

        Ok(Self {
            goals: GoalRepository::new(paths.goals_file()),
            profiles: ProfileRepository::new(paths.profiles_file()),
            audit: AuditLogger::new(paths.audit_log()),
            writer_locks: Mutex::new(HashMap::new()),
            paths,
        })
    }

    pub fn paths(&self) -> &GoalPlanPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), GoalPlanError> {
        self.goals.load()?;
        self.profiles.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), GoalPlanError> {
        self.goals.save()?;
        self.profiles.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// The lock that serializes plan applies for one user
    pub fn writer_lock(&self, user_id: &UserId) -> GoalPlanResult<Arc<Mutex<()>>> {
        let mut locks = self
            .writer_locks
            .lock()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire lock table: {}", e)))?;

        Ok(locks
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> GoalPlanResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> GoalPlanResult<()> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> GoalPlanResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GoalPlanPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_writer_lock_is_shared_per_user() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(GoalPlanPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();

        let alice = UserId::new("alice");
        let a1 = storage.writer_lock(&alice).unwrap();
        let a2 = storage.writer_lock(&alice).unwrap();
        let b = storage.writer_lock(&UserId::new("bob")).unwrap();
        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));

        let _held = a1.lock().unwrap();
        assert!(a2.try_lock().is_err());
        assert!(b.try_lock().is_ok());
    }

    #[test]
    fn test_audit_hooks_append() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(GoalPlanPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let value = serde_json::json!({"name": "Car"});

        storage
            .log_create(EntityType::Goal, "gol-1", Some("Car".into()), &value)
            .unwrap();
        storage
            .log_delete(EntityType::Goal, "gol-1", Some("Car".into()), &value)
            .unwrap();
        assert_eq!(storage.audit().read_all().unwrap().len(), 2);
    }
}
