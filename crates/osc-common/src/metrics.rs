//! Clock phase metrics.
//!
//! Provides ring buffer-based histograms of high-phase, low-phase, and jitter
//! lengths, so long runs keep a bounded memory footprint.

use crate::time::SimTime;
use serde::Serialize;

/// Default number of samples retained per histogram.
pub const DEFAULT_HISTOGRAM_SIZE: usize = 4_096;

/// Ring buffer statistics over a stream of picosecond lengths.
#[derive(Debug, Clone)]
pub struct PhaseStats {
    /// Ring buffer of lengths in picoseconds.
    samples: Box<[SimTime]>,
    /// Current write position in the ring buffer.
    write_pos: usize,
    /// Number of samples collected (saturates at buffer size).
    sample_count: usize,
    /// Total samples recorded.
    total: u64,
    min_ps: SimTime,
    max_ps: SimTime,
    sum_ps: u64,
    /// Samples below the configured floor.
    short_count: u64,
    floor_ps: SimTime,
}

impl PhaseStats {
    /// Create a histogram retaining `histogram_size` samples.
    ///
    /// Samples strictly below `floor` are counted as short.
    #[must_use]
    pub fn new(histogram_size: usize, floor: SimTime) -> Self {
        let size = histogram_size.max(1);
        Self {
            samples: vec![0; size].into_boxed_slice(),
            write_pos: 0,
            sample_count: 0,
            total: 0,
            min_ps: SimTime::MAX,
            max_ps: 0,
            sum_ps: 0,
            short_count: 0,
            floor_ps: floor,
        }
    }

    /// Record one length in picoseconds.
    pub fn record(&mut self, ps: SimTime) {
        self.samples[self.write_pos] = ps;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
        self.sample_count = self.sample_count.saturating_add(1).min(self.samples.len());

        self.total += 1;
        self.min_ps = self.min_ps.min(ps);
        self.max_ps = self.max_ps.max(ps);
        self.sum_ps = self.sum_ps.wrapping_add(ps);

        if ps < self.floor_ps {
            self.short_count += 1;
        }
    }

    /// Total samples recorded.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Minimum observed length.
    #[must_use]
    pub fn min(&self) -> Option<SimTime> {
        (self.total > 0).then_some(self.min_ps)
    }

    /// Maximum observed length.
    #[must_use]
    pub fn max(&self) -> Option<SimTime> {
        (self.total > 0).then_some(self.max_ps)
    }

    /// Mean length.
    #[must_use]
    pub fn mean(&self) -> Option<SimTime> {
        (self.total > 0).then(|| self.sum_ps / self.total)
    }

    /// Number of samples below the floor.
    #[must_use]
    pub fn short_count(&self) -> u64 {
        self.short_count
    }

    /// Compute a percentile (0.0 to 100.0) from the ring buffer.
    ///
    /// Returns `None` if no samples have been collected or if percentile is out of range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn percentile(&self, percentile: f64) -> Option<SimTime> {
        if self.sample_count == 0 || !(0.0..=100.0).contains(&percentile) {
            return None;
        }

        let mut sorted: Vec<SimTime> = self.samples[..self.sample_count].to_vec();
        sorted.sort_unstable();

        let idx = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    /// Get a snapshot of current statistics.
    #[must_use]
    pub fn snapshot(&self) -> PhaseSnapshot {
        PhaseSnapshot {
            count: self.total,
            min_ps: self.min(),
            max_ps: self.max(),
            mean_ps: self.mean(),
            p99_ps: self.percentile(99.0),
            short_count: self.short_count,
        }
    }
}

/// Immutable snapshot of one histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSnapshot {
    /// Samples recorded.
    pub count: u64,
    /// Minimum length in picoseconds.
    pub min_ps: Option<SimTime>,
    /// Maximum length in picoseconds.
    pub max_ps: Option<SimTime>,
    /// Mean length in picoseconds.
    pub mean_ps: Option<SimTime>,
    /// 99th percentile in picoseconds.
    pub p99_ps: Option<SimTime>,
    /// Samples below the floor.
    pub short_count: u64,
}

impl PhaseSnapshot {
    /// Spread (max - min) in picoseconds.
    #[must_use]
    pub fn spread_ps(&self) -> Option<SimTime> {
        match (self.min_ps, self.max_ps) {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        }
    }
}

/// Aggregate metrics for one oscillator instance.
#[derive(Debug, Clone)]
pub struct ClockMetrics {
    /// Completed high phases.
    pub high: PhaseStats,
    /// Completed low phases between two toggles.
    pub low: PhaseStats,
    /// Jitter samples drawn.
    pub jitter: PhaseStats,
    rising_edges: u64,
    falling_edges: u64,
}

impl ClockMetrics {
    /// Create metrics for a clock with the given nominal half period.
    #[must_use]
    pub fn new(histogram_size: usize, nominal_half_period: SimTime) -> Self {
        Self {
            high: PhaseStats::new(histogram_size, nominal_half_period),
            low: PhaseStats::new(histogram_size, nominal_half_period),
            jitter: PhaseStats::new(histogram_size, 0),
            rising_edges: 0,
            falling_edges: 0,
        }
    }

    /// Record a clock edge that closed a phase of `phase_ps` picoseconds.
    ///
    /// `rising` is the direction of the edge; a rising edge closes a low phase.
    pub fn record_edge(&mut self, rising: bool, phase_ps: Option<SimTime>) {
        if rising {
            self.rising_edges += 1;
            if let Some(ps) = phase_ps {
                self.low.record(ps);
            }
        } else {
            self.falling_edges += 1;
            if let Some(ps) = phase_ps {
                self.high.record(ps);
            }
        }
    }

    /// Number of rising edges observed.
    #[must_use]
    pub fn rising_edges(&self) -> u64 {
        self.rising_edges
    }

    /// Number of falling edges observed.
    #[must_use]
    pub fn falling_edges(&self) -> u64 {
        self.falling_edges
    }

    /// Get a snapshot of all histograms.
    #[must_use]
    pub fn snapshot(&self) -> ClockMetricsSnapshot {
        ClockMetricsSnapshot {
            rising_edges: self.rising_edges,
            falling_edges: self.falling_edges,
            high: self.high.snapshot(),
            low: self.low.snapshot(),
            jitter: self.jitter.snapshot(),
        }
    }
}

impl Default for ClockMetrics {
    fn default() -> Self {
        Self::new(DEFAULT_HISTOGRAM_SIZE, 0)
    }
}

/// Serializable snapshot of [`ClockMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockMetricsSnapshot {
    /// Rising edges observed.
    pub rising_edges: u64,
    /// Falling edges observed.
    pub falling_edges: u64,
    /// High phase statistics.
    pub high: PhaseSnapshot,
    /// Low phase statistics.
    pub low: PhaseSnapshot,
    /// Jitter sample statistics.
    pub jitter: PhaseSnapshot,
}
