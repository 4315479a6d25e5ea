//! Priority waterfall allocation
//!
//! Splits `available_for_goals` across active goals in three phases:
//!
//! 1. Fixed goals (`auto_adjust == false`) take their last applied amount,
//!    or their ideal amount if none was applied yet, in priority order.
//! 2. If the flexible goals' ideal amounts fit in what is left, each gets its
//!    ideal and any surplus flows to open-ended goals (no deadline) by
//!    priority weight.
//! 3. Otherwise a floor pass funds each goal's minimum in strict priority
//!    order, and a weighted pass spreads the remainder up to each ideal.
//!
//! Every phase only spends what the previous one left, so the total never
//! exceeds a non-negative `available_for_goals`.

use chrono::{Datelike, Months, NaiveDate};

use super::EngineConfig;
use crate::models::{AllocationRecord, BudgetSnapshot, Goal, GoalId, Money};

/// Allocator output before projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// One record per eligible goal, in priority order
    pub records: Vec<AllocationRecord>,
    /// Run-level warnings, most urgent first
    pub warnings: Vec<String>,
    /// Number of eligible goals that take part in rebalancing
    pub flexible_goals: usize,
}

/// Per-goal working state during a run
#[derive(Debug, Clone)]
struct Slot {
    goal_id: GoalId,
    name: String,
    priority: i32,
    remaining: Money,
    ideal: Money,
    floor: Money,
    fixed: bool,
    open_ended: bool,
    allocation: Money,
    warnings: Vec<String>,
}

impl Slot {
    fn new(goal: &Goal, as_of: NaiveDate, config: &EngineConfig) -> Self {
        let remaining = goal.remaining_amount();
        let mut warnings = Vec::new();

        let (paced, due_now) = ideal_monthly(goal, as_of, config.default_pacing_months);
        if due_now {
            warnings.push(format!(
                "'{}' is due immediately: its deadline has arrived with {} still needed",
                goal.name, remaining
            ));
        }

        let fixed = !goal.auto_adjust;
        let ideal = if fixed && goal.monthly_allocation.is_positive() {
            goal.monthly_allocation.min(remaining)
        } else {
            paced
        };
        let floor = if goal.is_flexible {
            goal.min_allocation.min(ideal)
        } else {
            ideal
        };

        Self {
            goal_id: goal.id,
            name: goal.name.clone(),
            priority: goal.priority,
            remaining,
            ideal,
            floor,
            fixed,
            open_ended: goal.deadline.is_none(),
            allocation: Money::zero(),
            warnings,
        }
    }

    fn into_record(self) -> AllocationRecord {
        let mut record =
            AllocationRecord::new(self.goal_id, self.name, self.priority, self.remaining);
        record.monthly_allocation = self.allocation;
        record.ideal_allocation = self.ideal;
        record.warnings = self.warnings;
        record
    }
}

/// Whole calendar months from `from` to `to` (negative when `to` is earlier)
///
/// A month only counts once it has fully elapsed, so moving `from` forward
/// by the result never lands past `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = to.year() as i64 - from.year() as i64;
    let months = years * 12 + to.month() as i64 - from.month() as i64;
    if months <= 0 {
        return months;
    }

    let landed = u32::try_from(months)
        .ok()
        .and_then(|m| from.checked_add_months(Months::new(m)));
    match landed {
        Some(date) if date <= to => months,
        _ => months - 1,
    }
}

/// Monthly amount that keeps a goal on pace, and whether it is due now
///
/// With a deadline the remaining amount is spread over the months left;
/// a deadline this month or earlier makes the whole remainder due. Without a
/// deadline the remainder is spread over `pacing_months`.
pub fn ideal_monthly(goal: &Goal, as_of: NaiveDate, pacing_months: u32) -> (Money, bool) {
    let remaining = goal.remaining_amount();
    if remaining.is_zero() {
        return (Money::zero(), false);
    }

    match goal.deadline {
        Some(deadline) => {
            let months = months_between(as_of, deadline);
            if months <= 0 {
                (remaining, true)
            } else {
                (remaining.div_ceil(months).min(remaining), false)
            }
        }
        None => (
            remaining.div_ceil(pacing_months.max(1) as i64).min(remaining),
            false,
        ),
    }
}

/// Run the waterfall over `goals`
///
/// Inactive goals are ignored and malformed goals are skipped with a warning
/// that names them.
pub fn allocate(
    snapshot: &BudgetSnapshot,
    goals: &[Goal],
    config: &EngineConfig,
) -> AllocationOutcome {
    let mut warnings = Vec::new();

    if snapshot.is_over_committed() {
        warnings.push(format!(
            "Budget is over-committed by {}: fixed costs and the safety margin exceed income, so no goal can be funded",
            snapshot.available_for_goals.abs()
        ));
    }

    let mut eligible: Vec<&Goal> = Vec::with_capacity(goals.len());
    for goal in goals.iter().filter(|g| g.is_active()) {
        match goal.validate() {
            Ok(()) => eligible.push(goal),
            Err(e) => {
                tracing::warn!(goal_id = %goal.id, goal = %goal.name, error = %e, "goal_skipped");
                warnings.push(format!("Skipped goal '{}': {}", goal.name, e));
            }
        }
    }

    eligible.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut slots: Vec<Slot> = eligible
        .iter()
        .map(|g| Slot::new(g, snapshot.as_of, config))
        .collect();

    let available = snapshot.available_for_goals.non_negative();
    let after_fixed = fund_fixed(&mut slots, available);
    let leftover = fund_flexible(&mut slots, after_fixed);

    for slot in slots.iter_mut() {
        if slot.remaining.is_positive() && slot.allocation.is_zero() {
            slot.warnings.push(format!(
                "'{}' is unreachable at the current pace: it receives nothing this month",
                slot.name
            ));
        }
    }

    tracing::debug!(
        goals = slots.len(),
        excluded = goals.len() - slots.len(),
        allocated = (available - leftover).cents(),
        leftover = leftover.cents(),
        "waterfall_complete"
    );

    let flexible_goals = slots.iter().filter(|s| !s.fixed).count();
    AllocationOutcome {
        records: slots.into_iter().map(Slot::into_record).collect(),
        warnings,
        flexible_goals,
    }
}

/// Phase 1: fixed goals in priority order; returns the budget left
fn fund_fixed(slots: &mut [Slot], mut budget: Money) -> Money {
    for slot in slots.iter_mut().filter(|s| s.fixed) {
        if slot.ideal <= budget {
            slot.allocation = slot.ideal;
            budget -= slot.ideal;
        } else {
            slot.allocation = budget;
            budget = Money::zero();
            slot.warnings.push(format!(
                "Fixed amount {} for '{}' could not be fully funded; it receives {}",
                slot.ideal, slot.name, slot.allocation
            ));
        }
    }
    budget
}

/// Phases 2 and 3: flexible goals; returns the budget left
fn fund_flexible(slots: &mut [Slot], mut budget: Money) -> Money {
    let members: Vec<usize> = (0..slots.len()).filter(|&i| !slots[i].fixed).collect();
    if members.is_empty() {
        return budget;
    }

    let total_ideal: Money = members.iter().map(|&i| slots[i].ideal).sum();

    if total_ideal <= budget {
        for &i in &members {
            slots[i].allocation = slots[i].ideal;
        }
        budget -= total_ideal;

        let open_ended: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| slots[i].open_ended)
            .collect();
        tracing::debug!(
            surplus = budget.cents(),
            absorbers = open_ended.len(),
            "flexible_fully_funded"
        );
        return distribute_weighted(slots, &open_ended, budget, |s| s.remaining - s.allocation);
    }

    tracing::debug!(
        budget = budget.cents(),
        total_ideal = total_ideal.cents(),
        "flexible_scaling"
    );

    // Floor pass: strict priority order
    for &i in &members {
        let slot = &mut slots[i];
        let give = slot.floor.min(budget);
        slot.allocation = give;
        budget -= give;
        if give < slot.floor {
            slot.warnings.push(format!(
                "Minimum of {} for '{}' was not met; it receives {}",
                slot.floor, slot.name, give
            ));
        }
    }

    // Remainder pass: weighted, up to each ideal
    let leftover = distribute_weighted(slots, &members, budget, |s| s.ideal - s.allocation);

    for &i in &members {
        let slot = &mut slots[i];
        if slot.allocation >= slot.floor && slot.allocation < slot.ideal && slot.allocation.is_positive()
        {
            slot.warnings.push(format!(
                "'{}' was scaled down to {} of the {} needed to stay on pace",
                slot.name, slot.allocation, slot.ideal
            ));
        }
    }

    leftover
}

/// Spread `budget` over `members` in proportion to priority weight
///
/// Weight is `max_priority - priority + 1`, so more urgent goals get larger
/// shares. `cap` bounds what each goal can still take. Rounding residue goes
/// to goals in priority order. Returns the budget that could not be placed.
fn distribute_weighted<F>(slots: &mut [Slot], members: &[usize], mut budget: Money, cap: F) -> Money
where
    F: Fn(&Slot) -> Money,
{
    let Some(max_priority) = members.iter().map(|&i| slots[i].priority as i64).max() else {
        return budget;
    };
    let weight = |slot: &Slot| max_priority - slot.priority as i64 + 1;

    while budget.is_positive() {
        let open: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| cap(&slots[i]).is_positive())
            .collect();
        if open.is_empty() {
            break;
        }

        let total_weight: i64 = open.iter().map(|&i| weight(&slots[i])).sum();
        let mut handed = Money::zero();
        for &i in &open {
            let share = budget.mul_div_floor(weight(&slots[i]), total_weight);
            let give = share.min(cap(&slots[i]));
            slots[i].allocation += give;
            handed += give;
        }

        if handed.is_zero() {
            for &i in &open {
                let give = budget.min(cap(&slots[i]));
                slots[i].allocation += give;
                budget -= give;
                if budget.is_zero() {
                    break;
                }
            }
            break;
        }

        budget -= handed;
    }

    budget
}
