//! Financial profile repository for JSON storage
//!
//! One profile per user in profiles.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::GoalPlanError;
use crate::models::{FinancialProfile, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ProfileData {
    #[serde(default)]
    profiles: Vec<FinancialProfile>,
}

pub struct ProfileRepository {
    path: PathBuf,
    profiles: RwLock<HashMap<UserId, FinancialProfile>>,
}

impl ProfileRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            profiles: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), GoalPlanError> {
        let file_data: ProfileData = read_json(&self.path)?;

        let mut profiles = self
            .profiles
            .write()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        profiles.clear();
        for profile in file_data.profiles {
            profiles.insert(profile.user_id.clone(), profile);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), GoalPlanError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut profile_list: Vec<_> = profiles.values().cloned().collect();
        profile_list.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        write_json_atomic(
            &self.path,
            &ProfileData {
                profiles: profile_list,
            },
        )
    }

    pub fn get(&self, user_id: &UserId) -> Result<Option<FinancialProfile>, GoalPlanError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(profiles.get(user_id).cloned())
    }

    /// Insert or replace the user's profile, returning the previous one
    pub fn upsert(&self, profile: FinancialProfile) -> Result<Option<FinancialProfile>, GoalPlanError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|e| GoalPlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(profiles.insert(profile.user_id.clone(), profile))
    }
}
