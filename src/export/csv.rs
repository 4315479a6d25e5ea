//! CSV export of allocation records (spreadsheet-compatible)

use serde::Serialize;
use std::io::Write;

use crate::error::{GoalPlanError, GoalPlanResult};
use crate::models::{AllocationRecord, Money};

#[derive(Serialize)]
struct AllocationCsvRow<'a> {
    #[serde(rename = "Goal ID")]
    goal_id: String,
    #[serde(rename = "Goal")]
    goal_name: &'a str,
    #[serde(rename = "Priority")]
    priority: i32,
    #[serde(rename = "Monthly")]
    monthly_allocation: String,
    #[serde(rename = "Ideal")]
    ideal_allocation: String,
    #[serde(rename = "Remaining")]
    remaining_amount: String,
    #[serde(rename = "Months")]
    months_to_complete: Option<u32>,
    #[serde(rename = "Expected Completion")]
    expected_completion_date: Option<String>,
    #[serde(rename = "Achievable")]
    is_achievable: bool,
    #[serde(rename = "Warnings")]
    warnings: String,
}

fn decimal(amount: Money) -> String {
    format!("{:.2}", amount.cents() as f64 / 100.0)
}

impl<'a> From<&'a AllocationRecord> for AllocationCsvRow<'a> {
    fn from(record: &'a AllocationRecord) -> Self {
        Self {
            goal_id: record.goal_id.as_uuid().to_string(),
            goal_name: &record.goal_name,
            priority: record.priority,
            monthly_allocation: decimal(record.monthly_allocation),
            ideal_allocation: decimal(record.ideal_allocation),
            remaining_amount: decimal(record.remaining_amount),
            months_to_complete: record.months_to_complete,
            expected_completion_date: record.expected_completion_date.map(|d| d.to_string()),
            is_achievable: record.is_achievable,
            warnings: record.warnings.join("; "),
        }
    }
}

/// Export allocation records, one row per goal
pub fn export_allocations_csv<W: Write>(
    records: &[AllocationRecord],
    writer: &mut W,
) -> GoalPlanResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for record in records {
        csv_writer
            .serialize(AllocationCsvRow::from(record))
            .map_err(|e| GoalPlanError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| GoalPlanError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalId, Money};
    use chrono::NaiveDate;

    fn record(name: &str, monthly: i64) -> AllocationRecord {
        let mut record = AllocationRecord::new(GoalId::new(), name, 1, Money::from_units(1_000));
        record.monthly_allocation = Money::from_cents(monthly);
        record.ideal_allocation = Money::from_cents(monthly);
        record.months_to_complete = Some(4);
        record.expected_completion_date = NaiveDate::from_ymd_opt(2026, 5, 1);
        record.is_achievable = true;
        record
    }

    #[test]
    fn test_csv_rows() {
        let mut output = Vec::new();
        export_allocations_csv(&[record("Trip, Japan", 25_050)], &mut output).unwrap();

        let csv = String::from_utf8(output).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Goal ID,Goal,Priority,Monthly,Ideal,Remaining,Months,Expected Completion,Achievable,Warnings"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("\"Trip, Japan\",1,250.50,250.50,1000.00,4,2026-05-01,true,"));
    }

    #[test]
    fn test_empty_records_write_nothing() {
        let mut output = Vec::new();
        export_allocations_csv(&[], &mut output).unwrap();
        assert!(output.is_empty());
    }
}
