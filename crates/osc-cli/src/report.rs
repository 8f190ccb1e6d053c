//! Run report for the sysosc runner.
//!
//! Collects the final signal state, phase metrics and checker results of a
//! run, and renders them as text or JSON.

use osc_common::config::OscParams;
use osc_common::metrics::{ClockMetricsSnapshot, PhaseSnapshot};
use osc_common::time::{format_sim_time, SimTime};
use osc_sim::{CheckReport, OscSnapshot};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Jitter seed, when one was configured.
    pub seed: Option<u64>,
    /// Validated timing parameters.
    pub params: OscParams,
    /// Events processed by the queue.
    pub events_processed: u64,
    /// Signal changes recorded.
    pub transitions: usize,
    /// Signal state at the end of the run.
    pub final_state: OscSnapshot,
    /// Phase statistics.
    pub metrics: ClockMetricsSnapshot,
    /// Invariant check results.
    pub check: CheckReport,
    /// Where the waveform was written.
    pub vcd: Option<PathBuf>,
}

impl RunReport {
    /// Whether the run passed every check.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.check.is_clean()
    }
}

fn fmt_opt(value: Option<SimTime>) -> String {
    value.map_or_else(|| "-".to_string(), format_sim_time)
}

fn write_phase(f: &mut fmt::Formatter<'_>, name: &str, phase: &PhaseSnapshot) -> fmt::Result {
    writeln!(
        f,
        "  {name:<7} n={:<6} min={:<8} mean={:<8} max={:<8} p99={:<8} spread={}",
        phase.count,
        fmt_opt(phase.min_ps),
        fmt_opt(phase.mean_ps),
        fmt_opt(phase.max_ps),
        fmt_opt(phase.p99_ps),
        fmt_opt(phase.spread_ps()),
    )
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        writeln!(
            f,
            "sysosc: half period {}, turn-on delay {}, max jitter {}",
            format_sim_time(p.nominal_half_period),
            format_sim_time(p.enable_turn_on_delay),
            format_sim_time(p.max_jitter),
        )?;
        if let Some(seed) = self.seed {
            writeln!(f, "  seed    {seed}")?;
        }
        writeln!(
            f,
            "  ran to  {} ({} events, {} transitions), generator {}",
            format_sim_time(self.final_state.time),
            self.events_processed,
            self.transitions,
            self.final_state.state,
        )?;
        writeln!(
            f,
            "  edges   {} rising, {} falling",
            self.metrics.rising_edges, self.metrics.falling_edges
        )?;
        write_phase(f, "high", &self.metrics.high)?;
        write_phase(f, "low", &self.metrics.low)?;
        write_phase(f, "jitter", &self.metrics.jitter)?;
        if let Some(path) = &self.vcd {
            writeln!(f, "  vcd     {}", path.display())?;
        }

        if self.check.is_clean() {
            write!(
                f,
                "PASS: {} high and {} low phases checked",
                self.check.high_phases, self.check.low_phases
            )
        } else {
            writeln!(f, "FAIL: {} violation(s)", self.check.violations.len())?;
            for violation in &self.check.violations {
                writeln!(f, "  - {violation}")?;
            }
            Ok(())
        }
    }
}
