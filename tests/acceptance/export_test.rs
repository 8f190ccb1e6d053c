//! Waveform export and scenario file tests.

use super::common::*;
use osc_cells::UniformJitter;
use osc_common::config::SimConfig;
use osc_common::signal::{Input, Signal};
use osc_sim::{write_vcd_file, Oscillator};
use std::path::Path;

fn default_scenario_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"))
}

/// Run a scenario the way the command-line runner does.
fn run_config(config: &SimConfig) -> Oscillator<UniformJitter> {
    let jitter = UniformJitter::seeded(config.jitter.seed.unwrap_or(0));
    let mut osc = Oscillator::from_config(&config.oscillator, jitter).unwrap();
    if config.jitter.enabled {
        osc.schedule_input(0, Input::JitterEnable, true).unwrap();
    }
    osc.apply_stimulus(&config.stimulus).unwrap();
    osc.run_for(config.run.duration).unwrap();
    osc
}

#[test]
fn test_default_scenario_file_runs_clean() {
    let config = SimConfig::from_file(default_scenario_path()).unwrap();
    assert_eq!(config.jitter.seed, Some(42));
    assert_eq!(config.stimulus.len(), 6);

    let osc = run_config(&config);
    assert_clean(&osc);
    assert_eq!(osc.now(), 30_000_000);
    // Enabled twice, the enable dip stopped the clock in between
    assert_eq!(
        osc.trace().rising_edges(Signal::FilteredEnable),
        vec![6_000_000, 17_500_000]
    );
    assert!(!osc.clock());
}

#[test]
fn test_builtin_scenario_runs_clean() {
    let mut config = SimConfig::power_cycle_scenario();
    config.jitter.seed = Some(5);
    let osc = run_config(&config);

    assert_clean(&osc);
    assert!(osc.metrics().rising_edges() > 1_000);
    assert!(!osc.power_good());
    assert!(!osc.clock());
}

#[test]
fn test_scenario_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.toml");
    let config = SimConfig::power_cycle_scenario();
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    let loaded = SimConfig::from_file(&path).unwrap();
    assert_eq!(loaded.stimulus, config.stimulus);
    assert_eq!(
        loaded.oscillator.validate().unwrap(),
        config.oscillator.validate().unwrap()
    );
}

#[test]
fn test_invalid_jitter_bound_rejected() {
    let config = SimConfig::from_toml(
        r#"
[oscillator]
nominal_half_period = "5ns"
max_jitter = "2ns"
"#,
    )
    .unwrap();
    assert!(Oscillator::from_config(&config.oscillator, UniformJitter::seeded(0)).is_err());
}

#[test]
fn test_vcd_file_matches_trace() {
    let mut osc = quiet();
    power_up(&mut osc);
    osc.run_until(DELAY + 10 * HALF).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wave.vcd");
    write_vcd_file(osc.trace(), osc.now(), &path).unwrap();
    let dump = std::fs::read_to_string(&path).unwrap();

    assert!(dump.contains("$timescale 1ps $end"));
    assert!(dump.contains("$scope module sys_osc $end"));
    assert!(dump.contains(" clk $end"));
    assert!(dump.contains(&format!("#{DELAY}\n")));
    assert!(dump.contains(&format!("#{}\n", DELAY + 10 * HALF)));

    // Every recorded change appears once after the initial dump
    let body = dump.split("$dumpvars").nth(1).unwrap();
    let body = &body[body.find("$end").unwrap() + 4..];
    let changes = body
        .lines()
        .filter(|l| l.starts_with('0') || l.starts_with('1'))
        .count();
    assert_eq!(changes, osc.trace().len());
}
