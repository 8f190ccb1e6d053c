//! Invariant checks over a recorded waveform.
//!
//! The checker never looks at simulator internals, only at the [`Trace`], so
//! it can also be pointed at waveforms produced elsewhere.

use crate::trace::Trace;
use osc_common::config::OscParams;
use osc_common::signal::Signal;
use osc_common::time::SimTime;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// A timing invariant broken by a trace.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// High phase shorter than the nominal half period.
    #[error("glitch at {start} ps: high for {length} ps, minimum {minimum} ps")]
    Glitch {
        /// Rising edge time.
        start: SimTime,
        /// Phase length.
        length: SimTime,
        /// Nominal half period.
        minimum: SimTime,
    },

    /// Phase outside the allowed jitter window.
    #[error("{} phase at {start} ps lasted {length} ps, allowed [{min}, {max}] ps", level_name(.high))]
    JitterRange {
        /// Whether the phase was high.
        high: bool,
        /// Phase start.
        start: SimTime,
        /// Phase length.
        length: SimTime,
        /// Shortest allowed length.
        min: SimTime,
        /// Longest allowed length.
        max: SimTime,
    },

    /// Filtered enable rose before the request was held long enough.
    #[error("filtered enable rose at {at} ps after {held} ps of request, required {required} ps")]
    Debounce {
        /// Rise time.
        at: SimTime,
        /// How long the request had been continuously held.
        held: SimTime,
        /// Turn-on delay.
        required: SimTime,
    },

    /// Clock still high too long after power loss.
    #[error("clock settled {latency} ps after power loss at {at} ps, bound {bound} ps")]
    PowerLossLatency {
        /// Power loss time.
        at: SimTime,
        /// Time until the clock fell.
        latency: SimTime,
        /// Longest half period.
        bound: SimTime,
    },

    /// Clock rose without power.
    #[error("clock rose at {at} ps while power good was low")]
    UnpoweredActivity {
        /// Rise time.
        at: SimTime,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn level_name(high: &bool) -> &'static str {
    if *high {
        "high"
    } else {
        "low"
    }
}

/// Result of checking one trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Violations in detection order.
    pub violations: Vec<Violation>,
    /// High phases examined.
    pub high_phases: usize,
    /// Low phases examined (only those with the generator running throughout).
    pub low_phases: usize,
    /// Rising edges of the filtered enable.
    pub filter_activations: usize,
}

impl CheckReport {
    /// Whether no invariant was broken.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks a trace against one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct TraceChecker {
    params: OscParams,
}

impl TraceChecker {
    /// Create a checker for `params`.
    #[must_use]
    pub fn new(params: OscParams) -> Self {
        Self { params }
    }

    /// Check `trace`, which was simulated up to `end`.
    #[must_use]
    pub fn check(&self, trace: &Trace, end: SimTime) -> CheckReport {
        let mut report = CheckReport::default();
        self.check_phases(trace, &mut report);
        self.check_debounce(trace, &mut report);
        self.check_power_loss(trace, end, &mut report);

        for violation in &report.violations {
            warn!(%violation, "Invariant violated");
        }
        debug!(
            high_phases = report.high_phases,
            low_phases = report.low_phases,
            violations = report.violations.len(),
            "Trace checked"
        );
        report
    }

    /// Allowed half-period window for a phase starting at `start`.
    fn window(&self, trace: &Trace, start: SimTime) -> (SimTime, SimTime) {
        let nominal = self.params.nominal_half_period;
        if trace.value_at(Signal::JitterEnable, start) {
            (nominal, self.params.max_half_period())
        } else {
            (nominal, nominal)
        }
    }

    fn check_phases(&self, trace: &Trace, report: &mut CheckReport) {
        let nominal = self.params.nominal_half_period;

        for phase in trace.phases(Signal::Clock) {
            let length = phase.len();
            if phase.level {
                report.high_phases += 1;
                if length < nominal {
                    report.violations.push(Violation::Glitch {
                        start: phase.start,
                        length,
                        minimum: nominal,
                    });
                    continue;
                }
            } else {
                // Low phases that span a stop and restart have no bound
                if !trace.value_at(Signal::EffectiveEnable, phase.start)
                    || trace.changes_within(Signal::EffectiveEnable, phase.start, phase.end)
                {
                    continue;
                }
                report.low_phases += 1;
            }

            let (min, max) = self.window(trace, phase.start);
            if length < min || length > max {
                report.violations.push(Violation::JitterRange {
                    high: phase.level,
                    start: phase.start,
                    length,
                    min,
                    max,
                });
            }
        }
    }

    fn check_debounce(&self, trace: &Trace, report: &mut CheckReport) {
        let required = self.params.enable_turn_on_delay;

        for at in trace.rising_edges(Signal::FilteredEnable) {
            report.filter_activations += 1;
            let requested = trace.value_at(Signal::PowerGood, at)
                && trace.value_at(Signal::RawEnable, at);
            let since = [Signal::PowerGood, Signal::RawEnable]
                .into_iter()
                .filter_map(|signal| trace.last_change(signal, at).map(|t| t.time))
                .max()
                .unwrap_or(0);
            let held = at - since;
            if !requested || held < required {
                report.violations.push(Violation::Debounce { at, held, required });
            }
        }
    }

    fn check_power_loss(&self, trace: &Trace, end: SimTime, report: &mut CheckReport) {
        let bound = self.params.max_half_period();

        for loss in trace.of(Signal::PowerGood).filter(|t| !t.value) {
            let at = loss.time;
            if !trace.value_at(Signal::Clock, at) {
                continue;
            }
            let latency = match trace.next_change(Signal::Clock, false, at) {
                Some(fall) => fall.time - at,
                None if end.saturating_sub(at) > bound => end - at,
                None => continue,
            };
            if latency > bound {
                report.violations.push(Violation::PowerLossLatency { at, latency, bound });
            }
        }

        for at in trace.rising_edges(Signal::Clock) {
            if !trace.value_at(Signal::PowerGood, at) {
                report.violations.push(Violation::UnpoweredActivity { at });
            }
        }
    }
}
