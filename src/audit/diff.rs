//! Field-level diffs for audit entries
//!
//! Compares the top-level fields of two serialized entities. Bookkeeping
//! timestamps are left out so a diff only lists what the user changed.

use serde_json::Value;

/// Fields that change on every write and carry no information for the reader
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Human-readable summary of what changed, or `None` if nothing did
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = field_changes(before, after);
    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// One `field: old -> new` line per changed top-level field
pub fn field_changes(before: &Value, after: &Value) -> Vec<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        if before == after {
            return Vec::new();
        }
        return vec![format!("{} -> {}", format_value(before), format_value(after))];
    };

    let mut changes = Vec::new();

    for (key, before_val) in before_obj {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after_obj.get(key) {
            Some(after_val) if after_val != before_val => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(before_val),
                format_value(after_val)
            )),
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
        }
    }

    for (key, after_val) in after_obj {
        if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
            changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
        }
    }

    changes
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
