//! Plan safety classification

use crate::config::ComfortThresholds;
use crate::models::{AllocationSummary, ComfortLevel, SafetyCheck};

/// Classify how much of the available budget the plan spends
///
/// The ratio is `total_allocated / max(available_for_goals, 1 cent)`. An
/// over-committed budget is always critical.
pub fn classify(summary: &AllocationSummary, thresholds: &ComfortThresholds) -> SafetyCheck {
    if summary.available_for_goals.is_negative() {
        return SafetyCheck::new(ComfortLevel::Critical);
    }

    let available = summary.available_for_goals.cents().max(1) as f64;
    let ratio = summary.total_allocated.cents() as f64 / available;

    let level = if ratio < thresholds.excellent_below {
        ComfortLevel::Excellent
    } else if ratio < thresholds.comfortable_below {
        ComfortLevel::Comfortable
    } else if ratio < thresholds.tight_below {
        ComfortLevel::Tight
    } else {
        ComfortLevel::Critical
    };

    SafetyCheck::new(level)
}
