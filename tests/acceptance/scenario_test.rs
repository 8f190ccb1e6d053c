//! Scripted scenario tests.
//!
//! Each test drives the inputs through a fixed sequence and compares the
//! resulting clock waveform against exact expected edge times.

use super::common::*;
use osc_common::signal::{Input, Signal};
use osc_common::state::GeneratorState;
use osc_common::time::SimTime;

/// Clock edge times for `count` toggles starting from `start` without jitter.
fn nominal_edges(start: SimTime, count: u64) -> Vec<SimTime> {
    (1..=count).map(|k| start + k * HALF).collect()
}

#[test]
fn test_unpowered_clock_stays_low() {
    let mut osc = quiet();
    osc.set_input(Input::RawEnable, true).unwrap();
    osc.set_input(Input::JitterEnable, true).unwrap();
    osc.run_until(20 * DELAY).unwrap();

    assert!(clock_times(&osc).is_empty());
    assert!(!osc.filtered_enable());
    assert!(!osc.output_clock());
    assert_eq!(osc.generator_state(), GeneratorState::Idle);
    assert_clean(&osc);
}

#[test]
fn test_short_enable_pulse_is_debounced() {
    let mut osc = quiet();
    osc.set_input(Input::PowerGood, true).unwrap();
    osc.schedule_input(1_000, Input::RawEnable, true).unwrap();
    osc.schedule_input(1_000 + DELAY - 1, Input::RawEnable, false)
        .unwrap();
    osc.run_until(10 * DELAY).unwrap();

    assert!(osc.trace().of(Signal::FilteredEnable).next().is_none());
    assert!(clock_times(&osc).is_empty());
    assert_clean(&osc);
}

#[test]
fn test_enable_drop_at_expiry_instant_wins() {
    let mut osc = quiet();
    osc.set_input(Input::PowerGood, true).unwrap();
    osc.set_input(Input::RawEnable, true).unwrap();
    osc.schedule_input(DELAY, Input::RawEnable, false).unwrap();
    osc.run_until(3 * DELAY).unwrap();

    assert!(osc.trace().of(Signal::FilteredEnable).next().is_none());
    assert!(clock_times(&osc).is_empty());
}

#[test]
fn test_power_glitch_restarts_turn_on_delay() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.schedule_input(DELAY / 2, Input::PowerGood, false).unwrap();
    osc.schedule_input(DELAY / 2 + 1, Input::PowerGood, true)
        .unwrap();
    osc.run_until(3 * DELAY).unwrap();

    let rise = osc.trace().next_change(Signal::FilteredEnable, true, 0);
    assert_eq!(rise.map(|t| t.time), Some(DELAY / 2 + 1 + DELAY));
    assert_clean(&osc);
}

#[test]
fn test_exact_half_periods_without_jitter() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.run_until(DELAY + 20 * HALF).unwrap();

    assert_eq!(clock_times(&osc), nominal_edges(DELAY, 20));
    let levels: Vec<bool> = osc.trace().of(Signal::Clock).map(|t| t.value).collect();
    assert!(levels.iter().step_by(2).all(|v| *v));
    assert!(levels.iter().skip(1).step_by(2).all(|v| !*v));

    let metrics = osc.metrics().snapshot();
    assert_eq!(metrics.high.min_ps, Some(HALF));
    assert_eq!(metrics.high.max_ps, Some(HALF));
    assert_eq!(metrics.low.min_ps, Some(HALF));
    assert_eq!(metrics.jitter.count, 0);
    assert_clean(&osc);
}

#[test]
fn test_scripted_jitter_extends_each_half_period() {
    let mut osc = scripted(vec![0, 250, 1_000, 999, 1]);
    osc.set_input(Input::JitterEnable, true).unwrap();
    power_up(&mut osc);
    osc.run_until(DELAY + 5 * HALF + 2_250).unwrap();

    let expected: Vec<SimTime> = [0, 250, 1_000, 999, 1]
        .iter()
        .scan(DELAY, |t, j| {
            *t += HALF + j;
            Some(*t)
        })
        .collect();
    assert_eq!(clock_times(&osc), expected);
    assert_clean(&osc);
}

#[test]
fn test_disable_while_high_completes_pulse() {
    let mut osc = quiet();
    power_up(&mut osc);
    // Fifth toggle is a rising edge
    osc.schedule_input(DELAY + 5 * HALF + 2_000, Input::RawEnable, false)
        .unwrap();
    osc.run_until(DELAY + 100 * HALF).unwrap();

    assert_eq!(clock_times(&osc), nominal_edges(DELAY, 6));
    assert!(!osc.clock());
    assert!(!osc.trailing_enable());
    assert_eq!(osc.generator_state(), GeneratorState::Idle);
    assert_clean(&osc);
}

#[test]
fn test_disable_during_first_high_phase() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.schedule_input(DELAY + HALF + 1, Input::RawEnable, false)
        .unwrap();
    osc.run_until(DELAY + 100 * HALF).unwrap();

    assert_eq!(clock_times(&osc), nominal_edges(DELAY, 2));
    assert_clean(&osc);
}

#[test]
fn test_disable_while_low_runs_one_more_period() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.schedule_input(DELAY + 2 * HALF + 1, Input::RawEnable, false)
        .unwrap();
    osc.run_until(DELAY + 100 * HALF).unwrap();

    // The synchronizer still holds the enable sampled at the last falling edge
    assert_eq!(clock_times(&osc), nominal_edges(DELAY, 4));
    let trailing_drop = osc.trace().next_change(Signal::TrailingEnable, false, 0);
    assert_eq!(trailing_drop.map(|t| t.time), Some(DELAY + 4 * HALF));
    assert_clean(&osc);
}

#[test]
fn test_disable_at_falling_edge_instant() {
    let mut osc = quiet();
    power_up(&mut osc);
    // Inputs settle before the same-instant toggle samples them
    osc.schedule_input(DELAY + 4 * HALF, Input::RawEnable, false)
        .unwrap();
    osc.run_until(DELAY + 100 * HALF).unwrap();

    assert_eq!(clock_times(&osc), nominal_edges(DELAY, 4));
    assert_clean(&osc);
}

#[test]
fn test_power_loss_while_high_settles_within_one_toggle() {
    let mut osc = quiet();
    power_up(&mut osc);
    let loss = DELAY + 3 * HALF + 1_234;
    osc.schedule_input(loss, Input::PowerGood, false).unwrap();

    osc.run_until(loss).unwrap();
    assert!(osc.clock());
    assert!(!osc.effective_enable());
    assert!(!osc.trailing_enable());

    osc.run_until(DELAY + 200 * HALF).unwrap();
    assert_eq!(clock_times(&osc), nominal_edges(DELAY, 4));
    assert!(DELAY + 4 * HALF - loss <= params().max_half_period());
    assert_clean(&osc);
}

#[test]
fn test_power_loss_at_rising_instant_suppresses_edge() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.schedule_input(DELAY + 3 * HALF, Input::PowerGood, false)
        .unwrap();
    osc.run_until(DELAY + 100 * HALF).unwrap();

    assert_eq!(clock_times(&osc), nominal_edges(DELAY, 2));
    assert_eq!(osc.snapshot().pending_events, 0);
    assert_clean(&osc);
}

#[test]
fn test_restart_after_disable() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.schedule_input(DELAY + 4 * HALF, Input::RawEnable, false)
        .unwrap();
    let again = DELAY + 50 * HALF;
    osc.schedule_input(again, Input::RawEnable, true).unwrap();
    osc.run_until(again + DELAY + 4 * HALF).unwrap();

    let mut expected = nominal_edges(DELAY, 4);
    expected.extend(nominal_edges(again + DELAY, 4));
    assert_eq!(clock_times(&osc), expected);
    assert_eq!(osc.metrics().rising_edges(), 4);
    // The gap across the restart is not a phase
    assert_eq!(osc.metrics().low.max(), Some(HALF));
    assert_clean(&osc);
}

#[test]
fn test_output_pin_mirrors_clock() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.run_until(DELAY + 30 * HALF).unwrap();

    let clk: Vec<_> = osc.trace().of(Signal::Clock).map(|t| (t.time, t.value)).collect();
    let out: Vec<_> = osc
        .trace()
        .of(Signal::OutputClock)
        .map(|t| (t.time, t.value))
        .collect();
    assert_eq!(clk, out);
}

#[test]
fn test_output_gate_never_truncates_pulse() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.run_until(DELAY + 3 * HALF + 100).unwrap();
    osc.set_output_gate(false);
    osc.run_until(DELAY + 9 * HALF + 100).unwrap();
    osc.set_output_gate(true);
    osc.run_until(DELAY + 20 * HALF).unwrap();

    let phases = osc.trace().phases(Signal::OutputClock);
    assert!(phases.iter().filter(|p| p.level).all(|p| p.len() == HALF));
    // Gated from the fourth toggle until the gate reopened in a high phase
    assert_eq!(
        osc.trace().rising_edges(Signal::OutputClock),
        vec![
            DELAY + HALF,
            DELAY + 3 * HALF,
            DELAY + 11 * HALF,
            DELAY + 13 * HALF,
            DELAY + 15 * HALF,
            DELAY + 17 * HALF,
            DELAY + 19 * HALF,
        ]
    );
}

#[test]
fn test_long_run_checks_clean() {
    let mut osc = seeded(params(), 3);
    osc.set_input(Input::JitterEnable, true).unwrap();
    power_up(&mut osc);
    osc.run_until(DELAY + 1_000_000_000).unwrap();

    // A millisecond of jittered clock; checking must stay near-linear in trace length
    let report = check(&osc);
    assert!(report.is_clean(), "{:#?}", report.violations);
    assert!(report.high_phases + report.low_phases > 100_000);
}
