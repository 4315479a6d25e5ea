//! Audit entry data structures
//!
//! Defines the structure of audit log entries including operation types,
//! entity types, and the entry format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
    /// An allocation plan was committed to the user's goals
    Apply,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Apply => write!(f, "APPLY"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Goal,
    Profile,
    AllocationPlan,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Goal => write!(f, "Goal"),
            EntityType::Profile => write!(f, "Profile"),
            EntityType::AllocationPlan => write!(f, "AllocationPlan"),
        }
    }
}

/// A single audit log entry
///
/// Records one operation on an entity with optional before/after values.
/// Applied allocation plans are recorded with the user id as `entity_id`
/// and the applied records as `after`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// Human-readable description of the entity (e.g., goal name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Entity before the operation (updates and deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// Entity after the operation (creates, updates and applies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,

    /// Why an allocation plan was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuditEntry {
    fn new(operation: Operation, entity_type: EntityType, entity_id: String) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name: None,
            before: None,
            after: None,
            diff_summary: None,
            reason: None,
        }
    }

    /// Create a new audit entry for a create operation
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            entity_name,
            after: serde_json::to_value(entity).ok(),
            ..Self::new(Operation::Create, entity_type, entity_id.into())
        }
    }

    /// Create a new audit entry for an update operation
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        Self {
            entity_name,
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            diff_summary,
            ..Self::new(Operation::Update, entity_type, entity_id.into())
        }
    }

    /// Create a new audit entry for a delete operation
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            entity_name,
            before: serde_json::to_value(entity).ok(),
            ..Self::new(Operation::Delete, entity_type, entity_id.into())
        }
    }

    /// Create an entry for an applied allocation plan
    pub fn apply<T: Serialize + ?Sized>(
        user_id: impl Into<String>,
        records: &T,
        reason: impl Into<String>,
        diff_summary: Option<String>,
    ) -> Self {
        Self {
            after: serde_json::to_value(records).ok(),
            diff_summary,
            reason: Some(reason.into()),
            ..Self::new(Operation::Apply, EntityType::AllocationPlan, user_id.into())
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(reason) = &self.reason {
            output.push_str(&format!(" - {}", reason));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Apply.to_string(), "APPLY");
    }

    #[test]
    fn test_entity_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntityType::AllocationPlan).unwrap(),
            "\"allocation_plan\""
        );
        assert_eq!(EntityType::Goal.to_string(), "Goal");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"name": "Emergency fund", "target_amount": 500000});
        let entry = AuditEntry::create(
            EntityType::Goal,
            "gol-12345678",
            Some("Emergency fund".to_string()),
            &data,
        );

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Goal);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
        assert!(entry.reason.is_none());
    }

    #[test]
    fn test_update_and_delete_entries() {
        let before = json!({"priority": 2});
        let after = json!({"priority": 1});
        let update = AuditEntry::update(
            EntityType::Goal,
            "gol-1",
            None,
            &before,
            &after,
            Some("priority: 2 -> 1".to_string()),
        );
        assert_eq!(update.operation, Operation::Update);
        assert!(update.before.is_some() && update.after.is_some());

        let delete = AuditEntry::delete(EntityType::Goal, "gol-1", None, &before);
        assert!(delete.before.is_some());
        assert!(delete.after.is_none());
    }

    #[test]
    fn test_apply_entry() {
        let records = json!([{"goal_name": "Car", "monthly_allocation": 20000}]);
        let entry = AuditEntry::apply("alice", &records, "monthly plan", None);

        assert_eq!(entry.operation, Operation::Apply);
        assert_eq!(entry.entity_type, EntityType::AllocationPlan);
        assert_eq!(entry.entity_id, "alice");
        assert_eq!(entry.reason.as_deref(), Some("monthly plan"));

        let line = serde_json::to_string(&entry).unwrap();
        let back: AuditEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back.operation, Operation::Apply);
        assert!(entry.format_human_readable().contains("APPLY AllocationPlan alice - monthly plan"));
    }

    #[test]
    fn test_entry_without_reason_deserializes() {
        let line = r#"{"timestamp":"2026-01-15T10:00:00Z","operation":"create","entity_type":"goal","entity_id":"gol-1"}"#;
        let entry: AuditEntry = serde_json::from_str(line).unwrap();
        assert!(entry.reason.is_none());
    }
}
