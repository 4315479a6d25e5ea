//! What-if conversation
//!
//! The user picks a scenario, sees its impact, then applies it, tries
//! another one, or leaves.

use super::{Flow, FlowError};
use crate::models::SimulationScenario;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationState {
    ChoosingScenario,
    /// A scenario has been run and its result shown
    Reviewing { scenario: SimulationScenario },
    Applied { scenario: SimulationScenario },
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationInput {
    Scenario(SimulationScenario),
    Apply,
    TryAnother,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEffect {
    Prompt(String),
    RunSimulation(SimulationScenario),
    ApplySimulation(SimulationScenario),
}

pub struct SimulationFlow;

impl SimulationState {
    fn label(&self) -> &'static str {
        match self {
            Self::ChoosingScenario => "choosing a scenario",
            Self::Reviewing { .. } => "reviewing a simulation",
            Self::Applied { .. } => "applied",
            Self::Closed => "closed",
        }
    }
}

impl SimulationInput {
    fn label(&self) -> &'static str {
        match self {
            Self::Scenario(_) => "scenario",
            Self::Apply => "apply",
            Self::TryAnother => "try another",
            Self::Close => "close",
        }
    }
}

impl Flow for SimulationFlow {
    type State = SimulationState;
    type Input = SimulationInput;
    type Effect = SimulationEffect;

    fn initial() -> (SimulationState, Vec<SimulationEffect>) {
        (
            SimulationState::ChoosingScenario,
            vec![SimulationEffect::Prompt(
                "What would you like to try: an income change, a new goal, or a new priority?"
                    .to_string(),
            )],
        )
    }

    fn transition(
        state: &SimulationState,
        input: SimulationInput,
    ) -> Result<(SimulationState, Vec<SimulationEffect>), FlowError> {
        use SimulationInput as I;
        use SimulationState as S;

        if Self::is_terminal(state) {
            return Err(FlowError::Finished);
        }

        match (state, input) {
            (_, I::Close) => Ok((S::Closed, Vec::new())),

            (S::ChoosingScenario, I::Scenario(scenario))
            | (S::Reviewing { .. }, I::Scenario(scenario)) => Ok((
                S::Reviewing {
                    scenario: scenario.clone(),
                },
                vec![SimulationEffect::RunSimulation(scenario)],
            )),

            (S::Reviewing { scenario }, I::Apply) => {
                if let SimulationScenario::NewGoal { goal } = scenario {
                    return Err(FlowError::Invalid(format!(
                        "'{}' has to be added as a goal before this can be applied",
                        goal.name
                    )));
                }
                Ok((
                    S::Applied {
                        scenario: scenario.clone(),
                    },
                    vec![SimulationEffect::ApplySimulation(scenario.clone())],
                ))
            }

            (S::Reviewing { .. }, I::TryAnother) => Ok(Self::initial()),

            (state, input) => Err(FlowError::UnexpectedInput {
                state: state.label(),
                input: input.label(),
            }),
        }
    }

    fn is_terminal(state: &SimulationState) -> bool {
        matches!(state, SimulationState::Applied { .. } | SimulationState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Goal, Money, UserId};

    fn raise() -> SimulationScenario {
        SimulationScenario::income_change(Money::from_units(500))
    }

    #[test]
    fn test_run_then_apply() {
        let (state, _) = SimulationFlow::initial();
        let (state, effects) =
            SimulationFlow::transition(&state, SimulationInput::Scenario(raise())).unwrap();
        assert_eq!(effects, vec![SimulationEffect::RunSimulation(raise())]);

        let (state, effects) = SimulationFlow::transition(&state, SimulationInput::Apply).unwrap();
        assert!(SimulationFlow::is_terminal(&state));
        assert_eq!(effects, vec![SimulationEffect::ApplySimulation(raise())]);
    }

    #[test]
    fn test_new_goal_scenario_cannot_be_applied() {
        let goal = Goal::new(UserId::new("u"), "Boat", Money::from_units(9_000), 4);
        let state = SimulationState::Reviewing {
            scenario: SimulationScenario::new_goal(goal),
        };
        let err = SimulationFlow::transition(&state, SimulationInput::Apply).unwrap_err();
        assert!(matches!(err, FlowError::Invalid(_)));
    }

    #[test]
    fn test_apply_before_running_is_unexpected() {
        let (state, _) = SimulationFlow::initial();
        let err = SimulationFlow::transition(&state, SimulationInput::Apply).unwrap_err();
        assert!(matches!(err, FlowError::UnexpectedInput { .. }));
    }

    #[test]
    fn test_try_another_and_close() {
        let state = SimulationState::Reviewing { scenario: raise() };
        let (state, _) = SimulationFlow::transition(&state, SimulationInput::TryAnother).unwrap();
        assert_eq!(state, SimulationState::ChoosingScenario);

        let (state, effects) = SimulationFlow::transition(&state, SimulationInput::Close).unwrap();
        assert_eq!(state, SimulationState::Closed);
        assert!(effects.is_empty());
    }
}
