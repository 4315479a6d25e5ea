//! Achievability projection
//!
//! Turns a monthly allocation into a completion month and a verdict against
//! the goal's deadline.

use chrono::{Months, NaiveDate};

use crate::models::{AllocationRecord, Money};

/// Whole months needed to cover `remaining` at `per_month`, rounded up
///
/// `None` when nothing is allocated but money is still needed.
pub fn months_to_complete(remaining: Money, per_month: Money) -> Option<u32> {
    if !remaining.is_positive() {
        return Some(0);
    }
    if !per_month.is_positive() {
        return None;
    }
    let (r, p) = (remaining.cents(), per_month.cents());
    let months = r / p + i64::from(r % p > 0);
    Some(u32::try_from(months).unwrap_or(u32::MAX))
}

/// `as_of` moved forward by `months` calendar months
pub fn add_months(as_of: NaiveDate, months: u32) -> Option<NaiveDate> {
    as_of.checked_add_months(Months::new(months))
}

/// Fill in months, completion date and achievability on a record
pub fn project(record: &mut AllocationRecord, deadline: Option<NaiveDate>, as_of: NaiveDate) {
    record.months_to_complete =
        months_to_complete(record.remaining_amount, record.monthly_allocation);
    record.expected_completion_date = record
        .months_to_complete
        .and_then(|months| add_months(as_of, months));

    record.is_achievable = match (record.expected_completion_date, deadline) {
        _ if !record.remaining_amount.is_positive() => true,
        (None, _) => false,
        (Some(_), None) => true,
        (Some(done), Some(deadline)) => done <= deadline,
    };

    if let (Some(done), Some(deadline)) = (record.expected_completion_date, deadline) {
        if done > deadline && record.remaining_amount.is_positive() {
            record.warnings.push(format!(
                "'{}' will miss its deadline of {} (expected {})",
                record.goal_name, deadline, done
            ));
        }
    }
}
