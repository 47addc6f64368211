//! Resolution state machine.

use crate::core::errors::{FailureKind, OcrResult};
use tracing::debug;

/// States of one resolution attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Uninitialized,
    AssetsVerified,
    RawLoaded,
    Normalized,
    Merged,
    Persisted,
    EngineReady,
    /// Terminal; reachable from any other state.
    Failed(FailureKind),
}

impl ResolutionState {
    /// The state that must directly precede `self`.
    fn predecessor(self) -> Option<ResolutionState> {
        use ResolutionState::*;
        match self {
            Uninitialized | Failed(_) => None,
            AssetsVerified => Some(Uninitialized),
            RawLoaded => Some(AssetsVerified),
            Normalized => Some(RawLoaded),
            Merged => Some(Normalized),
            Persisted => Some(Merged),
            EngineReady => Some(Persisted),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ResolutionState::EngineReady | ResolutionState::Failed(_))
    }
}

/// Drives one attempt through the states, recording the path taken.
#[derive(Debug)]
pub(crate) struct StateMachine {
    state: ResolutionState,
    history: Vec<ResolutionState>,
}

impl StateMachine {
    pub(crate) fn new() -> Self {
        Self {
            state: ResolutionState::Uninitialized,
            history: vec![ResolutionState::Uninitialized],
        }
    }

    pub(crate) fn state(&self) -> ResolutionState {
        self.state
    }

    pub(crate) fn into_history(self) -> Vec<ResolutionState> {
        self.history
    }

    /// Runs the work that leads to `next`.
    ///
    /// Steps must follow the declared order; after a failure no further step
    /// runs.
    pub(crate) fn step<T>(
        &mut self,
        next: ResolutionState,
        work: impl FnOnce() -> OcrResult<T>,
    ) -> OcrResult<T> {
        debug_assert_eq!(next.predecessor(), Some(self.state()), "out of order transition");
        match work() {
            Ok(value) => {
                self.transition(next);
                Ok(value)
            }
            Err(e) => {
                self.transition(ResolutionState::Failed(e.kind()));
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: ResolutionState) {
        debug!(from = ?self.state, to = ?next, "resolution state");
        self.state = next;
        self.history.push(next);
    }
}
