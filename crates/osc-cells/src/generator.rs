//! Jittered clock generator.
//!
//! The generator owns the internal clock. While running, its owner schedules
//! a toggle every [`JitteredClockGenerator::next_half_period`] and calls
//! [`JitteredClockGenerator::toggle`] when it fires. The toggle is gated by
//! the effective enable at that instant:
//!
//! ```text
//! clk <= !clk && effective_enable
//! ```
//!
//! so a rising toggle is only committed while enabled, while a falling toggle
//! always completes.

use crate::jitter::JitterSource;
use osc_common::config::OscParams;
use osc_common::error::{OscError, OscResult};
use osc_common::state::{GeneratorState, StateMachine};
use osc_common::time::SimTime;
use tracing::debug;

/// Clock generator with an injectable jitter source.
#[derive(Debug)]
pub struct JitteredClockGenerator<J> {
    nominal_half_period: SimTime,
    max_jitter: SimTime,
    jitter_enabled: bool,
    clock: bool,
    machine: StateMachine,
    source: J,
    last_jitter: SimTime,
}

impl<J: JitterSource> JitteredClockGenerator<J> {
    /// Create an idle generator with a low clock.
    pub fn new(params: &OscParams, source: J) -> Self {
        Self {
            nominal_half_period: params.nominal_half_period,
            max_jitter: params.max_jitter,
            jitter_enabled: false,
            clock: false,
            machine: StateMachine::new(),
            source,
            last_jitter: 0,
        }
    }

    /// Set the jitter-enable input. Takes effect from the next scheduled half period.
    pub fn set_jitter_enabled(&mut self, enabled: bool) {
        self.jitter_enabled = enabled;
    }

    /// Jitter-enable input level.
    #[must_use]
    pub fn jitter_enabled(&self) -> bool {
        self.jitter_enabled
    }

    /// Current clock level.
    #[must_use]
    pub fn clock(&self) -> bool {
        self.clock
    }

    /// Current generator state.
    #[must_use]
    pub fn state(&self) -> GeneratorState {
        self.machine.state()
    }

    /// Number of IDLE/RUNNING transitions so far.
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.machine.transition_count()
    }

    /// Jitter term used for the most recently scheduled half period.
    #[must_use]
    pub fn last_jitter(&self) -> SimTime {
        self.last_jitter
    }

    /// IDLE → RUNNING.
    ///
    /// # Errors
    ///
    /// Returns [`OscError::InvalidStateTransition`] if already running.
    pub fn start(&mut self) -> OscResult<()> {
        self.machine.transition(GeneratorState::Running)?;
        debug!("Clock generator started");
        Ok(())
    }

    /// RUNNING → IDLE. Only legal in the low phase.
    ///
    /// # Errors
    ///
    /// Returns [`OscError::InvalidStateTransition`] if idle already or if the
    /// clock is high, since stopping then would truncate the pulse.
    pub fn stop(&mut self) -> OscResult<()> {
        if self.clock {
            return Err(OscError::InvalidStateTransition {
                from: format!("{} (clock high)", self.machine.state()),
                to: GeneratorState::Idle.to_string(),
            });
        }
        self.machine.transition(GeneratorState::Idle)?;
        debug!("Clock generator stopped");
        Ok(())
    }

    /// Length of the next half period: nominal plus a jitter sample.
    ///
    /// The sample is zero when jitter is disabled and never exceeds the
    /// configured maximum, whatever the source returns.
    pub fn next_half_period(&mut self) -> SimTime {
        self.last_jitter = if self.jitter_enabled {
            self.source.sample(self.max_jitter).min(self.max_jitter)
        } else {
            0
        };
        self.nominal_half_period + self.last_jitter
    }

    /// Apply a scheduled toggle gated by `effective_enable`.
    ///
    /// Returns the new clock level.
    pub fn toggle(&mut self, effective_enable: bool) -> bool {
        self.clock = !self.clock && effective_enable;
        self.clock
    }
}
