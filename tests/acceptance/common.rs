//! Common utilities for integration tests.
//!
//! Provides helpers for:
//! - Building oscillators with scripted, fixed or seeded jitter
//! - Checking traces against the timing invariants

#![allow(dead_code)] // Not every helper is used by every test module

use osc_cells::{ClockBuffer, FixedJitter, JitterSource, SequenceJitter, UniformJitter};
use osc_common::config::OscParams;
use osc_common::signal::{Input, Signal};
use osc_common::time::SimTime;
use osc_sim::{CheckReport, Oscillator, TraceChecker};

/// Nominal half period (100 MHz).
pub const HALF: SimTime = 5_000;
/// RC turn-on delay.
pub const DELAY: SimTime = 5_000_000;
/// Largest jitter term.
pub const MAX_JITTER: SimTime = 1_000;

/// Default cell parameters.
pub fn params() -> OscParams {
    OscParams::new(HALF, DELAY, MAX_JITTER).unwrap()
}

/// Oscillator whose jitter term is always zero.
pub fn quiet() -> Oscillator<FixedJitter> {
    Oscillator::new(params(), FixedJitter(0))
}

/// Oscillator drawing jitter from `values` in order.
pub fn scripted(values: Vec<SimTime>) -> Oscillator<SequenceJitter> {
    Oscillator::new(params(), SequenceJitter::new(values))
}

/// Oscillator with a reproducible uniform jitter source.
pub fn seeded(params: OscParams, seed: u64) -> Oscillator<UniformJitter> {
    Oscillator::new(params, UniformJitter::seeded(seed))
}

/// Power up and enable at the current time.
pub fn power_up<J: JitterSource, B: ClockBuffer>(osc: &mut Oscillator<J, B>) {
    osc.set_input(Input::PowerGood, true).unwrap();
    osc.set_input(Input::RawEnable, true).unwrap();
}

/// Times of every clock change.
pub fn clock_times<J: JitterSource, B: ClockBuffer>(osc: &Oscillator<J, B>) -> Vec<SimTime> {
    osc.trace().of(Signal::Clock).map(|t| t.time).collect()
}

/// Run the checker over everything simulated so far.
pub fn check<J: JitterSource, B: ClockBuffer>(osc: &Oscillator<J, B>) -> CheckReport {
    TraceChecker::new(*osc.params()).check(osc.trace(), osc.now())
}

/// Assert the trace breaks no timing invariant.
pub fn assert_clean<J: JitterSource, B: ClockBuffer>(osc: &Oscillator<J, B>) {
    let report = check(osc);
    assert!(report.is_clean(), "violations: {:#?}", report.violations);
}
