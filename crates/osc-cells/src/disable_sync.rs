//! Falling-edge disable synchronizer.
//!
//! A flip-flop clocked on the falling edge of the internal clock with an
//! asynchronous, reset-dominant clear driven by loss of power-good:
//!
//! ```text
//! always @(negedge clk or negedge power_good)
//!   if (!power_good) trailing <= 0;
//!   else             trailing <= filtered;
//! ```
//!
//! Because the filtered enable is only sampled when the clock falls, a
//! disable that arrives during a high phase cannot stop the clock until that
//! phase completes.

use crate::triggers::{Edge, EdgeDetector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Synchronizer output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    /// TrailingEnable low.
    #[default]
    Disabled,
    /// TrailingEnable high.
    Enabled,
}

impl From<bool> for SyncState {
    fn from(level: bool) -> Self {
        if level {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "DISABLED"),
            Self::Enabled => write!(f, "ENABLED"),
        }
    }
}

/// Disable synchronizer.
///
/// | power_good | clk edge | filtered | trailing (new) |
/// |------------|----------|----------|----------------|
/// |     0      |    X     |    X     |   Disabled     | ← reset dominant
/// |     1      | negedge  |    D     |   D            |
/// |     1      |  other   |    X     |   hold         |
///
/// # Example
///
/// ```
/// use osc_cells::disable_sync::{DisableSynchronizer, SyncState};
///
/// let mut sync = DisableSynchronizer::new();
///
/// // Rising clock edge - no sample
/// assert!(!sync.clock(true, true, true));
///
/// // Falling edge samples the filtered enable
/// assert!(sync.clock(false, true, true));
/// assert_eq!(sync.state(), SyncState::Enabled);
///
/// // Power loss clears it without a clock edge
/// assert!(sync.power_lost());
/// assert!(!sync.output());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisableSynchronizer {
    state: SyncState,
    clk: EdgeDetector,
}

impl DisableSynchronizer {
    /// Create a synchronizer in the disabled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate on a change of the internal clock.
    ///
    /// Must be called after the new clock level has been written so that a
    /// falling edge samples the filtered enable of the same instant.
    /// Returns TrailingEnable.
    pub fn clock(&mut self, clk: bool, filtered: bool, power_good: bool) -> bool {
        let edge = self.clk.call(clk);
        if !power_good {
            self.state = SyncState::Disabled;
        } else if edge == Some(Edge::Falling) {
            self.state = SyncState::from(filtered);
        }
        self.output()
    }

    /// Asynchronous clear on loss of power-good.
    ///
    /// Returns `true` if the output changed.
    pub fn power_lost(&mut self) -> bool {
        let was_enabled = self.output();
        self.state = SyncState::Disabled;
        was_enabled
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// TrailingEnable.
    #[must_use]
    pub fn output(&self) -> bool {
        self.state == SyncState::Enabled
    }
}
