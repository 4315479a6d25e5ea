//! Step-by-step goal creation
//!
//! name -> target -> deadline -> priority -> confirm. Confirming emits a
//! `CreateGoal` effect with the finished draft; nothing is saved here.

use chrono::NaiveDate;

use super::{Flow, FlowError};
use crate::models::Money;
use crate::services::GoalDraft;

#[derive(Debug, Clone, PartialEq)]
pub enum CreationState {
    AwaitingName,
    AwaitingTarget { name: String },
    AwaitingDeadline { name: String, target: Money },
    AwaitingPriority {
        name: String,
        target: Money,
        deadline: Option<NaiveDate>,
    },
    Confirming { draft: GoalDraft },
    Created { draft: GoalDraft },
    Cancelled,
}

impl CreationState {
    fn label(&self) -> &'static str {
        match self {
            Self::AwaitingName => "waiting for a name",
            Self::AwaitingTarget { .. } => "waiting for a target amount",
            Self::AwaitingDeadline { .. } => "waiting for a deadline",
            Self::AwaitingPriority { .. } => "waiting for a priority",
            Self::Confirming { .. } => "waiting for confirmation",
            Self::Created { .. } => "created",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreationInput {
    Name(String),
    Target(Money),
    /// `None` means the goal is open-ended
    Deadline(Option<NaiveDate>),
    Priority(i32),
    Confirm,
    /// Start over from the name
    Restart,
    Cancel,
}

impl CreationInput {
    fn label(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Target(_) => "target",
            Self::Deadline(_) => "deadline",
            Self::Priority(_) => "priority",
            Self::Confirm => "confirm",
            Self::Restart => "restart",
            Self::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreationEffect {
    Prompt(String),
    /// Summary of the draft the user is asked to confirm
    ShowDraft(GoalDraft),
    CreateGoal(GoalDraft),
}

pub struct GoalCreationFlow;

fn prompt(text: &str) -> Vec<CreationEffect> {
    vec![CreationEffect::Prompt(text.to_string())]
}

impl Flow for GoalCreationFlow {
    type State = CreationState;
    type Input = CreationInput;
    type Effect = CreationEffect;

    fn initial() -> (CreationState, Vec<CreationEffect>) {
        (CreationState::AwaitingName, prompt("What are you saving for?"))
    }

    fn transition(
        state: &CreationState,
        input: CreationInput,
    ) -> Result<(CreationState, Vec<CreationEffect>), FlowError> {
        use CreationInput as I;
        use CreationState as S;

        if Self::is_terminal(state) {
            return Err(FlowError::Finished);
        }

        match (state, input) {
            (_, I::Cancel) => Ok((S::Cancelled, Vec::new())),
            (_, I::Restart) => Ok(Self::initial()),

            (S::AwaitingName, I::Name(name)) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(FlowError::Invalid("A goal needs a name".into()));
                }
                Ok((S::AwaitingTarget { name }, prompt("How much do you need in total?")))
            }

            (S::AwaitingTarget { name }, I::Target(target)) => {
                if !target.is_positive() {
                    return Err(FlowError::Invalid("The target must be more than zero".into()));
                }
                Ok((
                    S::AwaitingDeadline {
                        name: name.clone(),
                        target,
                    },
                    prompt("When do you need it by? (leave empty for no deadline)"),
                ))
            }

            (S::AwaitingDeadline { name, target }, I::Deadline(deadline)) => Ok((
                S::AwaitingPriority {
                    name: name.clone(),
                    target: *target,
                    deadline,
                },
                prompt("How important is it? (1 = most important)"),
            )),

            (
                S::AwaitingPriority {
                    name,
                    target,
                    deadline,
                },
                I::Priority(priority),
            ) => {
                if priority < 0 {
                    return Err(FlowError::Invalid("Priority cannot be negative".into()));
                }
                let mut draft = GoalDraft::new(name.clone(), *target, priority);
                draft.deadline = *deadline;
                Ok((
                    S::Confirming {
                        draft: draft.clone(),
                    },
                    vec![CreationEffect::ShowDraft(draft)],
                ))
            }

            (S::Confirming { draft }, I::Confirm) => Ok((
                S::Created {
                    draft: draft.clone(),
                },
                vec![CreationEffect::CreateGoal(draft.clone())],
            )),

            (state, input) => Err(FlowError::UnexpectedInput {
                state: state.label(),
                input: input.label(),
            }),
        }
    }

    fn is_terminal(state: &CreationState) -> bool {
        matches!(state, CreationState::Created { .. } | CreationState::Cancelled)
    }
}
