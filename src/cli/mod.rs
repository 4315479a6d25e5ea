//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod export;
pub mod goal;
pub mod plan;
pub mod profile;

pub use export::{handle_export_command, ExportCommands};
pub use goal::{handle_goal_command, GoalCommands};
pub use plan::{handle_plan_command, PlanCommands};
pub use profile::{handle_profile_command, ProfileCommands};

use chrono::NaiveDate;

use crate::error::{GoalPlanError, GoalPlanResult};
use crate::flows::{Flow, FlowError, SessionStore};
use crate::models::Money;

/// Parse a user-supplied amount such as "1500", "1,500.00" or "$1500"
pub(crate) fn parse_money(value: &str, what: &str) -> GoalPlanResult<Money> {
    Money::parse(value)
        .map_err(|e| GoalPlanError::Validation(format!("Invalid {}: {}", what, e)))
}

/// Parse a YYYY-MM-DD date
pub(crate) fn parse_date(value: &str) -> GoalPlanResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        GoalPlanError::Validation(format!(
            "Invalid date format '{}'. Use YYYY-MM-DD: {}",
            value, e
        ))
    })
}

/// Feed a sequence of inputs through a fresh session of a flow
///
/// Returns the final state and every effect emitted along the way.
pub(crate) fn drive<F: Flow>(
    inputs: impl IntoIterator<Item = F::Input>,
) -> GoalPlanResult<(F::State, Vec<F::Effect>)> {
    let mut sessions = SessionStore::<F>::new();
    let (session, mut effects) = sessions.start();
    let mut state = sessions.state(session).cloned();

    for input in inputs {
        let (next, emitted) = sessions.advance(session, input)?;
        state = Some(next);
        effects.extend(emitted);
    }

    let state = state.ok_or(FlowError::UnknownSession(session))?;
    Ok((state, effects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::goal_creation::{CreationEffect, CreationInput};
    use crate::flows::GoalCreationFlow;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("1,500", "income").unwrap(), Money::from_units(1_500));
        let err = parse_money("abc", "income").unwrap_err();
        assert!(err.to_string().contains("Invalid income"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2027-06-30").unwrap(),
            NaiveDate::from_ymd_opt(2027, 6, 30).unwrap()
        );
        assert!(parse_date("06/30/2027").is_err());
    }

    #[test]
    fn test_drive_collects_effects() {
        let (state, effects) = drive::<GoalCreationFlow>(vec![
            CreationInput::Name("Bike".into()),
            CreationInput::Target(Money::from_units(900)),
            CreationInput::Deadline(None),
            CreationInput::Priority(3),
            CreationInput::Confirm,
        ])
        .unwrap();

        assert!(GoalCreationFlow::is_terminal(&state));
        assert!(matches!(effects.last(), Some(CreationEffect::CreateGoal(_))));
    }

    #[test]
    fn test_drive_rejects_input_after_the_flow_ends() {
        let err = drive::<GoalCreationFlow>(vec![
            CreationInput::Name("Bike".into()),
            CreationInput::Cancel,
            CreationInput::Name("Boat".into()),
        ])
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_drive_surfaces_flow_errors() {
        let err = drive::<GoalCreationFlow>(vec![CreationInput::Name("  ".into())]).unwrap_err();
        assert!(err.is_validation());
    }
}
