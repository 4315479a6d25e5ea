//! Actionable recommendations derived from an allocation outcome
//!
//! Each trigger yields at most one suggestion. Output is sorted with
//! high-priority suggestions first; ties keep trigger order.

use super::projector::months_to_complete;
use crate::models::{
    AllocationRecord, AllocationSummary, ComfortLevel, SafetyCheck, Suggestion,
    SuggestionPriority,
};

/// Everything the heuristics look at
pub struct SuggestionInput<'a> {
    pub records: &'a [AllocationRecord],
    pub summary: &'a AllocationSummary,
    pub safety: &'a SafetyCheck,
    pub flexible_goals: usize,
    pub near_priority_gap: u32,
}

pub fn generate(input: &SuggestionInput<'_>) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = [
        unreachable_goal(input),
        too_many_flexible_goals(input),
        accelerate_top_goal(input),
        ambiguous_priorities(input),
    ]
    .into_iter()
    .flatten()
    .collect();

    suggestions.sort_by_key(|s| s.priority);
    suggestions
}

fn unreachable_goal(input: &SuggestionInput<'_>) -> Option<Suggestion> {
    let stalled: Vec<&AllocationRecord> =
        input.records.iter().filter(|r| r.is_unreachable()).collect();
    let first = stalled.first()?;

    let others = match stalled.len() {
        1 => String::new(),
        n => format!(" ({} other goal(s) are also stalled)", n - 1),
    };

    Some(Suggestion {
        message: format!(
            "Extend the deadline or raise the priority of '{}'{}",
            first.goal_name, others
        ),
        impact: format!(
            "'{}' gets no money at the current pace and still needs {}",
            first.goal_name, first.remaining_amount
        ),
        priority: SuggestionPriority::High,
    })
}

fn too_many_flexible_goals(input: &SuggestionInput<'_>) -> Option<Suggestion> {
    if input.safety.comfort_level != ComfortLevel::Critical {
        return None;
    }

    let message = if input.flexible_goals > 1 {
        format!(
            "Pause one of your {} flexible goals until the budget loosens",
            input.flexible_goals
        )
    } else {
        "Reduce the number of goals you fund at the same time".to_string()
    };

    Some(Suggestion {
        message,
        impact: "Frees budget for the goals that matter most and lifts the plan out of critical"
            .to_string(),
        priority: SuggestionPriority::High,
    })
}

fn accelerate_top_goal(input: &SuggestionInput<'_>) -> Option<Suggestion> {
    if input.safety.comfort_level != ComfortLevel::Excellent || !input.summary.unallocated.is_positive()
    {
        return None;
    }

    let top = input
        .records
        .iter()
        .find(|r| r.remaining_amount.is_positive())?;
    let extra = input.summary.unallocated;
    let faster = months_to_complete(top.remaining_amount, top.monthly_allocation + extra);

    let impact = match (top.months_to_complete, faster) {
        (Some(now), Some(then)) if then < now => format!(
            "'{}' would finish in {} month(s) instead of {}",
            top.goal_name, then, now
        ),
        (None, Some(then)) => format!("'{}' would finish in {} month(s)", top.goal_name, then),
        _ => format!("'{}' would finish sooner", top.goal_name),
    };

    Some(Suggestion {
        message: format!("Put the unallocated {} toward '{}'", extra, top.goal_name),
        impact,
        priority: SuggestionPriority::Low,
    })
}

fn ambiguous_priorities(input: &SuggestionInput<'_>) -> Option<Suggestion> {
    let gap = i64::from(input.near_priority_gap);
    let pair = input.records.windows(2).find(|w| {
        let (a, b) = (&w[0], &w[1]);
        (i64::from(b.priority) - i64::from(a.priority)).abs() <= gap
            && a.is_underfunded()
            && b.is_underfunded()
    })?;

    Some(Suggestion {
        message: format!(
            "Decide whether '{}' or '{}' comes first; their priorities are nearly equal",
            pair[0].goal_name, pair[1].goal_name
        ),
        impact: "A clear order lets the more important goal be funded in full".to_string(),
        priority: SuggestionPriority::Medium,
    })
}
