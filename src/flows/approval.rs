//! Plan approval
//!
//! A computed plan is shown to the user before it is applied. A plan whose
//! safety check failed needs the risk acknowledged before it can be approved.

use super::{Flow, FlowError};
use crate::models::AllocationResult;

#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalState {
    AwaitingPlan,
    Reviewing {
        plan: Box<AllocationResult>,
        risk_acknowledged: bool,
    },
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalInput {
    PlanReady(AllocationResult),
    AcknowledgeRisk,
    Approve { reason: String },
    /// Throw the plan away and compute a fresh one
    Recompute,
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalEffect {
    ComputePlan,
    ShowPlan(Box<AllocationResult>),
    Warn(String),
    ApplyPlan { reason: String },
}

pub struct ApprovalFlow;

impl ApprovalState {
    fn label(&self) -> &'static str {
        match self {
            Self::AwaitingPlan => "waiting for a plan",
            Self::Reviewing { .. } => "reviewing a plan",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl ApprovalInput {
    fn label(&self) -> &'static str {
        match self {
            Self::PlanReady(_) => "plan ready",
            Self::AcknowledgeRisk => "acknowledge risk",
            Self::Approve { .. } => "approve",
            Self::Recompute => "recompute",
            Self::Reject => "reject",
        }
    }
}

impl Flow for ApprovalFlow {
    type State = ApprovalState;
    type Input = ApprovalInput;
    type Effect = ApprovalEffect;

    fn initial() -> (ApprovalState, Vec<ApprovalEffect>) {
        (ApprovalState::AwaitingPlan, vec![ApprovalEffect::ComputePlan])
    }

    fn transition(
        state: &ApprovalState,
        input: ApprovalInput,
    ) -> Result<(ApprovalState, Vec<ApprovalEffect>), FlowError> {
        use ApprovalInput as I;
        use ApprovalState as S;

        if Self::is_terminal(state) {
            return Err(FlowError::Finished);
        }

        match (state, input) {
            (_, I::Reject) => Ok((S::Rejected, Vec::new())),

            (S::AwaitingPlan, I::PlanReady(plan)) => {
                let plan = Box::new(plan);
                let mut effects = vec![ApprovalEffect::ShowPlan(plan.clone())];
                if !plan.safety_check.passed {
                    effects.push(ApprovalEffect::Warn(format!(
                        "This plan is {}: it commits most or all of your available budget",
                        plan.safety_check.comfort_level
                    )));
                }
                Ok((
                    S::Reviewing {
                        plan,
                        risk_acknowledged: false,
                    },
                    effects,
                ))
            }

            (S::Reviewing { plan, .. }, I::AcknowledgeRisk) => Ok((
                S::Reviewing {
                    plan: plan.clone(),
                    risk_acknowledged: true,
                },
                Vec::new(),
            )),

            (
                S::Reviewing {
                    plan,
                    risk_acknowledged,
                },
                I::Approve { reason },
            ) => {
                if !plan.safety_check.passed && !risk_acknowledged {
                    return Err(FlowError::Invalid(
                        "Acknowledge the critical budget before approving this plan".into(),
                    ));
                }
                Ok((S::Approved, vec![ApprovalEffect::ApplyPlan { reason }]))
            }

            (S::Reviewing { .. }, I::Recompute) => Ok(Self::initial()),

            (state, input) => Err(FlowError::UnexpectedInput {
                state: state.label(),
                input: input.label(),
            }),
        }
    }

    fn is_terminal(state: &ApprovalState) -> bool {
        matches!(state, ApprovalState::Approved | ApprovalState::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{run_pipeline, EngineConfig};
    use crate::models::{BudgetSnapshot, Goal, Money, UserId};
    use chrono::NaiveDate;

    fn plan(available: i64) -> AllocationResult {
        let snapshot = BudgetSnapshot::new(
            Money::from_units(available),
            Money::zero(),
            Money::zero(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        );
        let goal = Goal::new(UserId::new("u"), "Fund", Money::from_units(12_000), 1)
            .with_deadline(NaiveDate::from_ymd_opt(2027, 1, 15).unwrap());
        run_pipeline(&snapshot, &[goal], &EngineConfig::default())
    }

    fn review(available: i64) -> (ApprovalState, Vec<ApprovalEffect>) {
        let (state, effects) = ApprovalFlow::initial();
        assert_eq!(effects, vec![ApprovalEffect::ComputePlan]);
        ApprovalFlow::transition(&state, ApprovalInput::PlanReady(plan(available))).unwrap()
    }

    fn approve() -> ApprovalInput {
        ApprovalInput::Approve {
            reason: "monthly plan".into(),
        }
    }

    #[test]
    fn test_healthy_plan_approves_directly() {
        // 1,000 a month toward the deadline out of 5,000 is excellent
        let (state, effects) = review(5_000);
        assert_eq!(effects.len(), 1);

        let (state, effects) = ApprovalFlow::transition(&state, approve()).unwrap();
        assert_eq!(state, ApprovalState::Approved);
        assert_eq!(
            effects,
            vec![ApprovalEffect::ApplyPlan {
                reason: "monthly plan".into()
            }]
        );
    }

    #[test]
    fn test_critical_plan_needs_acknowledgement() {
        // the whole 500 goes toward a 1,000 ideal
        let (state, effects) = review(500);
        assert!(matches!(effects.last(), Some(ApprovalEffect::Warn(_))));

        let err = ApprovalFlow::transition(&state, approve()).unwrap_err();
        assert!(matches!(err, FlowError::Invalid(_)));

        let (state, _) = ApprovalFlow::transition(&state, ApprovalInput::AcknowledgeRisk).unwrap();
        let (state, _) = ApprovalFlow::transition(&state, approve()).unwrap();
        assert_eq!(state, ApprovalState::Approved);
    }

    #[test]
    fn test_recompute_and_reject() {
        let (state, _) = review(5_000);
        let (state, effects) = ApprovalFlow::transition(&state, ApprovalInput::Recompute).unwrap();
        assert_eq!(state, ApprovalState::AwaitingPlan);
        assert_eq!(effects, vec![ApprovalEffect::ComputePlan]);

        let (state, _) = ApprovalFlow::transition(&state, ApprovalInput::Reject).unwrap();
        assert!(ApprovalFlow::is_terminal(&state));
        assert_eq!(
            ApprovalFlow::transition(&state, ApprovalInput::Reject).unwrap_err(),
            FlowError::Finished
        );
    }
}
