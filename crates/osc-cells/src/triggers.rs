//! Edge detection on boolean signals.
//!
//! [`EdgeDetector`] remembers the previous level of a signal and reports the
//! direction of each transition. The disable synchronizer uses it to find the
//! falling edges of the internal clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a signal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// FALSE → TRUE.
    Rising,
    /// TRUE → FALSE.
    Falling,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rising => write!(f, "posedge"),
            Self::Falling => write!(f, "negedge"),
        }
    }
}

/// Level-to-edge converter.
///
/// # Example
///
/// ```
/// use osc_cells::triggers::{Edge, EdgeDetector};
///
/// let mut clk = EdgeDetector::new();
///
/// // Initial state - no edge
/// assert_eq!(clk.call(false), None);
///
/// // Rising edge detected
/// assert_eq!(clk.call(true), Some(Edge::Rising));
///
/// // Stays high - no edge
/// assert_eq!(clk.call(true), None);
///
/// // Falling edge detected
/// assert_eq!(clk.call(false), Some(Edge::Falling));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeDetector {
    /// Previous level.
    prev: bool,
}

impl EdgeDetector {
    /// Create a detector whose previous level is low.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level and report the transition, if any.
    pub fn call(&mut self, level: bool) -> Option<Edge> {
        let edge = match (self.prev, level) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        };
        self.prev = level;
        edge
    }
}
