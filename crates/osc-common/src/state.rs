//! Clock generator state machine.
//!
//! The generator has two states:
//! IDLE (clock held low) ⇄ RUNNING (toggling)
//!
//! IDLE → RUNNING happens when the effective enable rises. RUNNING → IDLE
//! only happens with the clock in its low phase.

use crate::error::{OscError, OscResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneratorState {
    /// Disabled; clock held low and no toggle pending.
    #[default]
    Idle,
    /// Enabled; a toggle is pending or the final high phase is completing.
    Running,
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
        }
    }
}

impl GeneratorState {
    /// Check if a transition to `target` is valid from the current state.
    #[must_use]
    pub fn can_transition_to(&self, target: GeneratorState) -> bool {
        use GeneratorState::{Idle, Running};

        matches!((self, target), (Idle, Running) | (Running, Idle))
    }

    /// Returns true if the generator is toggling.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// State machine wrapper with transition history tracking.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current: GeneratorState,
    transition_count: u64,
}

impl StateMachine {
    /// Create a new state machine starting in IDLE.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> GeneratorState {
        self.current
    }

    /// Get total number of transitions.
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Attempt a state transition.
    ///
    /// # Errors
    ///
    /// Returns [`OscError::InvalidStateTransition`] if `target` is not
    /// reachable from the current state.
    pub fn transition(&mut self, target: GeneratorState) -> OscResult<()> {
        if self.current.can_transition_to(target) {
            self.current = target;
            self.transition_count += 1;
            Ok(())
        } else {
            Err(OscError::InvalidStateTransition {
                from: self.current.to_string(),
                to: target.to_string(),
            })
        }
    }
}
