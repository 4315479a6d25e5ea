//! Multi-step conversation flows
//!
//! Each flow is its own state machine: a state enum, an input enum, and a
//! pure `transition` that returns the next state plus the effects the caller
//! should carry out. Sessions of one flow type live in a `SessionStore`.

pub mod approval;
pub mod goal_creation;
pub mod simulation;

use std::collections::HashMap;

use thiserror::Error;

use crate::error::GoalPlanError;
use crate::models::SessionId;

pub use approval::ApprovalFlow;
pub use goal_creation::GoalCreationFlow;
pub use simulation::SimulationFlow;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The input makes no sense in the current state
    #[error("'{input}' is not expected while {state}")]
    UnexpectedInput {
        state: &'static str,
        input: &'static str,
    },

    /// The input was expected but its value is unusable
    #[error("{0}")]
    Invalid(String),

    /// The flow already finished
    #[error("this conversation has already ended")]
    Finished,

    #[error("no conversation with id {0}")]
    UnknownSession(SessionId),
}

impl From<FlowError> for GoalPlanError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::UnknownSession(id) => GoalPlanError::NotFound {
                entity_type: "Session",
                identifier: id.to_string(),
            },
            other => GoalPlanError::Validation(other.to_string()),
        }
    }
}

/// A conversation state machine
pub trait Flow {
    type State: Clone + std::fmt::Debug;
    type Input;
    type Effect;

    fn initial() -> (Self::State, Vec<Self::Effect>);

    fn transition(
        state: &Self::State,
        input: Self::Input,
    ) -> Result<(Self::State, Vec<Self::Effect>), FlowError>;

    fn is_terminal(state: &Self::State) -> bool;
}

/// Live sessions of one flow type
///
/// A session is dropped from the store as soon as it reaches a terminal
/// state.
pub struct SessionStore<F: Flow> {
    sessions: HashMap<SessionId, F::State>,
}

impl<F: Flow> Default for SessionStore<F> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl<F: Flow> SessionStore<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session and return its id with the opening effects
    pub fn start(&mut self) -> (SessionId, Vec<F::Effect>) {
        let id = SessionId::new();
        let (state, effects) = F::initial();
        self.sessions.insert(id, state);
        (id, effects)
    }

    pub fn state(&self, id: SessionId) -> Option<&F::State> {
        self.sessions.get(&id)
    }

    /// Feed one input to a session
    ///
    /// On error the session keeps its previous state. The returned state is
    /// the new one, which for a terminal state is no longer stored.
    pub fn advance(
        &mut self,
        id: SessionId,
        input: F::Input,
    ) -> Result<(F::State, Vec<F::Effect>), FlowError> {
        let current = self
            .sessions
            .get(&id)
            .ok_or(FlowError::UnknownSession(id))?;
        let (next, effects) = F::transition(current, input)?;

        if F::is_terminal(&next) {
            self.sessions.remove(&id);
        } else {
            self.sessions.insert(id, next.clone());
        }

        Ok((next, effects))
    }

    pub fn cancel(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::goal_creation::{CreationInput, CreationState};
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_sessions_are_independent() {
        let mut store: SessionStore<GoalCreationFlow> = SessionStore::new();
        let (a, _) = store.start();
        let (b, _) = store.start();

        store.advance(a, CreationInput::Name("Car".into())).unwrap();
        assert!(matches!(store.state(a), Some(CreationState::AwaitingTarget { .. })));
        assert!(matches!(store.state(b), Some(CreationState::AwaitingName)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failed_input_keeps_state() {
        let mut store: SessionStore<GoalCreationFlow> = SessionStore::new();
        let (id, _) = store.start();
        store.advance(id, CreationInput::Name("Car".into())).unwrap();

        let err = store
            .advance(id, CreationInput::Target(Money::zero()))
            .unwrap_err();
        assert!(matches!(err, FlowError::Invalid(_)));
        assert!(matches!(store.state(id), Some(CreationState::AwaitingTarget { .. })));
    }

    #[test]
    fn test_terminal_state_removes_session() {
        let mut store: SessionStore<GoalCreationFlow> = SessionStore::new();
        let (id, _) = store.start();
        let (state, _) = store.advance(id, CreationInput::Cancel).unwrap();
        assert!(matches!(state, CreationState::Cancelled));
        assert!(store.is_empty());

        let err = store.advance(id, CreationInput::Cancel).unwrap_err();
        assert_eq!(err, FlowError::UnknownSession(id));
        assert!(GoalPlanError::from(err).is_not_found());
    }
}
