//! RC turn-on delay on the enable path.
//!
//! The filter behaves like an on-delay timer whose timing is done by the
//! owner's event queue: a rising request arms a timer, a falling request
//! clears the output immediately and cancels any armed timer.

use osc_common::time::SimTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the owner must do with the filter's turn-on timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Leave any pending timer untouched.
    Keep,
    /// Schedule [`EnableFilter::expire`] after `delay`.
    Arm {
        /// Turn-on delay in picoseconds.
        delay: SimTime,
    },
    /// Cancel the pending timer.
    Cancel,
}

/// Enable filter (delayed rising edge, immediate falling edge).
///
/// # Timing Diagram
///
/// ```text
///          +--+      +-------------------+
/// REQUEST  |  |      |                   |
///       ---+  +------+                   +----
///                              +---------+
/// OUTPUT                       |         |
///       -----------------------+         +----
///                    |<-DELAY->|
/// ```
///
/// The first pulse is shorter than the delay, so the timer it armed is
/// cancelled and the output never rises.
///
/// # Example
///
/// ```
/// use osc_cells::enable_filter::{EnableFilter, TimerCommand};
///
/// let mut filter = EnableFilter::new(5_000_000);
///
/// // Rising request arms the timer, output stays low
/// assert_eq!(filter.set_request(true), TimerCommand::Arm { delay: 5_000_000 });
/// assert!(!filter.output());
///
/// // Request drops before expiry - timer cancelled
/// assert_eq!(filter.set_request(false), TimerCommand::Cancel);
///
/// // A stale expiry is ignored
/// assert!(!filter.expire());
/// assert!(!filter.output());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnableFilter {
    /// Turn-on delay in picoseconds.
    turn_on_delay: SimTime,
    /// Current EnableRequest level.
    request: bool,
    /// FilteredEnable.
    output: bool,
    /// A turn-on timer is pending.
    armed: bool,
}

impl EnableFilter {
    /// Create a filter with the given turn-on delay.
    #[must_use]
    pub fn new(turn_on_delay: SimTime) -> Self {
        Self {
            turn_on_delay,
            ..Self::default()
        }
    }

    /// Apply a new EnableRequest level.
    ///
    /// Returns the timer action the owner must perform.
    pub fn set_request(&mut self, request: bool) -> TimerCommand {
        if request == self.request {
            return TimerCommand::Keep;
        }
        self.request = request;

        if request {
            self.armed = true;
            debug!(delay = self.turn_on_delay, "Enable filter armed");
            TimerCommand::Arm {
                delay: self.turn_on_delay,
            }
        } else {
            self.output = false;
            if std::mem::take(&mut self.armed) {
                debug!("Enable filter timer cancelled");
                TimerCommand::Cancel
            } else {
                TimerCommand::Keep
            }
        }
    }

    /// Turn-on timer fired.
    ///
    /// Returns `true` if the output rose. Expiries that arrive while no timer
    /// is armed are ignored.
    pub fn expire(&mut self) -> bool {
        if !self.armed || !self.request {
            return false;
        }
        self.armed = false;
        self.output = true;
        true
    }

    /// FilteredEnable.
    #[must_use]
    pub fn output(&self) -> bool {
        self.output
    }

    /// Current EnableRequest level.
    #[must_use]
    pub fn request(&self) -> bool {
        self.request
    }

    /// Whether a turn-on timer is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Configured turn-on delay.
    #[must_use]
    pub fn turn_on_delay(&self) -> SimTime {
        self.turn_on_delay
    }
}
