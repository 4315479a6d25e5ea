//! Append-only audit log
//!
//! One JSON object per line. Goal and profile changes land here, and so does
//! every applied plan, which doubles as the allocation history.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{GoalPlanError, GoalPlanResult};

use super::entry::{AuditEntry, EntityType, Operation};

pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append an entry and flush
    pub fn log(&self, entry: &AuditEntry) -> GoalPlanResult<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| GoalPlanError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| GoalPlanError::Io(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", json)
            .and_then(|()| file.flush())
            .map_err(|e| GoalPlanError::Io(format!("Failed to append to audit log: {}", e)))
    }

    /// Visit entries oldest first; a line that does not parse is an error
    fn scan<F>(&self, mut visit: F) -> GoalPlanResult<()>
    where
        F: FnMut(AuditEntry),
    {
        if !self.log_path.exists() {
            return Ok(());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| GoalPlanError::Io(format!("Failed to open audit log: {}", e)))?;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                GoalPlanError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let entry = serde_json::from_str(&line).map_err(|e| {
                GoalPlanError::Json(format!("Bad audit entry at line {}: {}", index + 1, e))
            })?;
            visit(entry);
        }

        Ok(())
    }

    /// Every entry, oldest first
    pub fn read_all(&self) -> GoalPlanResult<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        self.scan(|entry| entries.push(entry))?;
        Ok(entries)
    }

    /// The last `limit` plans applied for one user, most recent first
    pub fn allocation_history(&self, user_id: &str, limit: usize) -> GoalPlanResult<Vec<AuditEntry>> {
        let mut latest = VecDeque::with_capacity(limit.min(64));
        self.scan(|entry| {
            let is_plan = entry.operation == Operation::Apply
                && entry.entity_type == EntityType::AllocationPlan
                && entry.entity_id == user_id;
            if !is_plan || limit == 0 {
                return;
            }
            if latest.len() == limit {
                latest.pop_front();
            }
            latest.push_back(entry);
        })?;

        Ok(latest.into_iter().rev().collect())
    }
}
