//! Per-invocation dispatch state and outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use filedesk_core::{Action, FileSystemEvent, ServiceError, ValidationError};

static NEXT_INVOCATION: AtomicU64 = AtomicU64::new(1);

/// The state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    Idle,
    Validating,
    /// Local validation refused the request.
    Blocked,
    AwaitingConfirmation,
    AwaitingTarget,
    /// Waiting for a name from a text prompt.
    AwaitingInput,
    /// The single remote call is in flight.
    Dispatching,
    Succeeded,
    Failed,
}

impl DispatchState {
    /// Check if `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: DispatchState) -> bool {
        use DispatchState::*;
        match self {
            Idle => next == Validating,
            Validating => matches!(
                next,
                Blocked | AwaitingConfirmation | AwaitingTarget | AwaitingInput | Dispatching | Idle
            ),
            AwaitingConfirmation | AwaitingTarget | AwaitingInput => {
                matches!(next, Validating | Dispatching | Idle)
            }
            Blocked => next == Idle,
            Dispatching => matches!(next, Succeeded | Failed),
            Succeeded | Failed => next == Idle,
        }
    }

    /// Check if the invocation is suspended on a prompt.
    pub fn is_awaiting(self) -> bool {
        matches!(
            self,
            Self::AwaitingConfirmation | Self::AwaitingTarget | Self::AwaitingInput
        )
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Validating => write!(f, "validating"),
            Self::Blocked => write!(f, "blocked"),
            Self::AwaitingConfirmation => write!(f, "awaiting confirmation"),
            Self::AwaitingTarget => write!(f, "awaiting target"),
            Self::AwaitingInput => write!(f, "awaiting input"),
            Self::Dispatching => write!(f, "dispatching"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// An attempted transition the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Illegal transition from {from} to {to}")]
pub struct TransitionError {
    pub from: DispatchState,
    pub to: DispatchState,
}

/// Tracks one invocation through the state machine.
#[derive(Debug, Clone)]
pub struct Invocation {
    id: u64,
    action: Action,
    state: DispatchState,
    history: Vec<DispatchState>,
}

impl Invocation {
    /// Start a new invocation in `Validating`.
    pub fn start(action: Action) -> Self {
        let mut invocation = Self {
            id: NEXT_INVOCATION.fetch_add(1, Ordering::Relaxed),
            action,
            state: DispatchState::Idle,
            history: vec![DispatchState::Idle],
        };
        invocation.advance(DispatchState::Validating);
        invocation
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Every state visited so far, in order.
    pub fn history(&self) -> &[DispatchState] {
        &self.history
    }

    /// Move to `next`, refusing illegal transitions.
    pub fn transition(&mut self, next: DispatchState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransitionError {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(
            invocation = self.id,
            action = %self.action,
            from = %self.state,
            to = %next,
            "state transition"
        );
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Move to `next`; an illegal transition is logged and ignored.
    pub(crate) fn advance(&mut self, next: DispatchState) {
        if let Err(e) = self.transition(next) {
            debug_assert!(false, "{e}");
            tracing::warn!(invocation = self.id, "{e}");
        }
    }

    /// Return to `Idle` from wherever the invocation ended.
    pub(crate) fn finish(&mut self) {
        if self.state.is_awaiting() {
            tracing::debug!(invocation = self.id, state = %self.state, "ended at a prompt");
        }
        if self.state != DispatchState::Idle {
            self.advance(DispatchState::Idle);
        }
    }
}

/// What became of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The remote call succeeded and this event was published.
    Dispatched(FileSystemEvent),
    /// A non-mutating action was handed to its collaborator.
    Completed,
    /// The remote call failed.
    Failed(ServiceError),
    /// The user declined a prompt.
    Cancelled,
    /// Local validation refused the request.
    Rejected(ValidationError),
    /// Unsupported batch action; nothing happened.
    Ignored,
}

impl InvocationOutcome {
    /// The published event, if the invocation dispatched successfully.
    pub fn event(&self) -> Option<&FileSystemEvent> {
        match self {
            Self::Dispatched(event) => Some(event),
            _ => None,
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_validating() {
        let invocation = Invocation::start(Action::Copy);
        assert_eq!(invocation.state(), DispatchState::Validating);
        assert_eq!(
            invocation.history(),
            &[DispatchState::Idle, DispatchState::Validating]
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Invocation::start(Action::Copy);
        let b = Invocation::start(Action::Copy);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_full_success_path() {
        let mut invocation = Invocation::start(Action::Move);
        invocation.transition(DispatchState::AwaitingTarget).unwrap();
        invocation.transition(DispatchState::Validating).unwrap();
        invocation.transition(DispatchState::Dispatching).unwrap();
        invocation.transition(DispatchState::Succeeded).unwrap();
        invocation.finish();
        assert_eq!(invocation.state(), DispatchState::Idle);
        assert_eq!(invocation.history().len(), 7);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut invocation = Invocation::start(Action::Delete);
        let err = invocation.transition(DispatchState::Succeeded).unwrap_err();
        assert_eq!(err.from, DispatchState::Validating);
        assert_eq!(invocation.state(), DispatchState::Validating);

        assert!(!DispatchState::Dispatching.can_transition_to(DispatchState::Idle));
        assert!(!DispatchState::Blocked.can_transition_to(DispatchState::Dispatching));
        assert!(!DispatchState::Idle.can_transition_to(DispatchState::Dispatching));
    }

    #[test]
    fn test_awaiting_states() {
        assert!(DispatchState::AwaitingTarget.is_awaiting());
        assert!(!DispatchState::Dispatching.is_awaiting());
    }
}
