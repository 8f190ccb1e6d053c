//! sysosc runner entry point.
//!
//! Loads a scenario, simulates the oscillator, checks the recorded waveform
//! against its timing invariants and optionally exports it as VCD.

mod report;

use anyhow::{bail, Context, Result};
use clap::Parser;
use osc_cells::UniformJitter;
use osc_common::config::SimConfig;
use osc_common::signal::Input;
use osc_common::time::format_sim_time;
use osc_sim::{write_vcd_file, Oscillator, TraceChecker};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::report::RunReport;

/// sysosc command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sysosc",
    about = "System clock oscillator model - simulate, check and dump the clock waveform",
    version,
    long_about = None
)]
struct Args {
    /// Path to a scenario configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Simulated run length, e.g. `30us` (overrides config file).
    #[arg(long, short = 'd', value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Jitter seed (overrides config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the jitter-enable input low for the whole run.
    #[arg(long)]
    no_jitter: bool,

    /// Write the waveform to this VCD file (overrides config file).
    #[arg(long, value_name = "FILE")]
    vcd: Option<PathBuf>,

    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting sysosc");

    let mut config = load_config(&args)?;
    apply_overrides(&mut config, &args);

    let report = run_scenario(&config)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
        );
    } else {
        println!("{report}");
    }

    if !report.passed() {
        bail!(
            "{} timing violation(s) found",
            report.check.violations.len()
        );
    }
    Ok(())
}

/// Initialize logging with the specified log level.
///
/// Logs go to stderr so the report on stdout stays machine-readable.
fn init_logging(level: &str) {
    let filter = format!(
        "sysosc={level},osc_sim={level},osc_cells={level},osc_common={level}"
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use the built-in scenario.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `SYSOSC_CONFIG` environment variable
/// 3. `config/default.toml` (local development)
/// 4. Built-in power-cycle scenario
fn load_config(args: &Args) -> Result<SimConfig> {
    // 1. Command-line argument (highest priority)
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return SimConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"));
    }

    // 2. Environment variable
    if let Ok(env_path) = std::env::var("SYSOSC_CONFIG") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from SYSOSC_CONFIG");
            return SimConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from SYSOSC_CONFIG={env_path:?}")
            });
        }
        warn!(
            path = %env_path,
            "SYSOSC_CONFIG set but file does not exist, checking other locations"
        );
    }

    // 3. Local development path
    let local_path = PathBuf::from("config/default.toml");
    if local_path.exists() {
        info!(?local_path, "Loading config from local path");
        return SimConfig::from_file(&local_path)
            .with_context(|| format!("Failed to load config from {local_path:?}"));
    }

    // 4. Built-in scenario
    info!("No config file found, using built-in power-cycle scenario");
    Ok(SimConfig::power_cycle_scenario())
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut SimConfig, args: &Args) {
    if let Some(duration) = args.duration {
        config.run.duration = duration;
    }
    if let Some(seed) = args.seed {
        config.jitter.seed = Some(seed);
    }
    if args.no_jitter {
        config.jitter.enabled = false;
        config
            .stimulus
            .retain(|event| event.input != Input::JitterEnable);
    }
    if let Some(vcd) = &args.vcd {
        config.run.vcd = Some(vcd.clone());
    }
}

/// Simulate one scenario and check the resulting waveform.
fn run_scenario(config: &SimConfig) -> Result<RunReport> {
    let jitter = match config.jitter.seed {
        Some(seed) => UniformJitter::seeded(seed),
        None => UniformJitter::from_entropy(),
    };
    let mut osc =
        Oscillator::from_config(&config.oscillator, jitter).context("Invalid oscillator config")?;
    let params = *osc.params();

    if config.jitter.enabled {
        osc.schedule_input(0, Input::JitterEnable, true)?;
    }
    osc.apply_stimulus(&config.stimulus)
        .context("Invalid stimulus")?;

    info!(
        duration = %humantime::format_duration(config.run.duration),
        stimulus = config.stimulus.len(),
        "Running scenario"
    );
    let events_processed = osc.run_for(config.run.duration)?;
    let end = osc.now();

    let check = TraceChecker::new(params).check(osc.trace(), end);
    info!(
        end = %format_sim_time(end),
        events = events_processed,
        violations = check.violations.len(),
        "Run complete"
    );

    if let Some(path) = &config.run.vcd {
        write_vcd_file(osc.trace(), end, path)
            .with_context(|| format!("Failed to write VCD to {path:?}"))?;
    }

    Ok(RunReport {
        seed: config.jitter.seed,
        params,
        events_processed,
        transitions: osc.trace().len(),
        final_state: osc.snapshot(),
        metrics: osc.metrics().snapshot(),
        check,
        vcd: config.run.vcd.clone(),
    })
}
