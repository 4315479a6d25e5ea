//! Audit logging for goalplan
//!
//! Records goal and profile changes with before/after values, and every
//! applied allocation plan, in an append-only JSONL log.
//!
//! - `AuditEntry`: one line of the log
//! - `AuditLogger`: appends and reads entries
//! - `generate_diff`: human-readable field diff between two entity states
//!
//! ```rust,ignore
//! use goalplan::audit::{AuditEntry, AuditLogger, EntityType, generate_diff};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(EntityType::Goal, goal.id.to_string(), Some(goal.name.clone()), &goal))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::{field_changes, generate_diff};
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
