//! Waveform trace of every signal change.
//!
//! All signals start low at time zero; the trace stores only changes.

use osc_common::signal::Signal;
use osc_common::time::SimTime;
use serde::Serialize;

/// One signal change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Simulation time of the change.
    pub time: SimTime,
    /// Signal that changed.
    pub signal: Signal,
    /// New level.
    pub value: bool,
}

/// Interval between two consecutive transitions of one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Phase {
    /// Start of the interval.
    pub start: SimTime,
    /// End of the interval.
    pub end: SimTime,
    /// Level held during the interval.
    pub level: bool,
}

impl Phase {
    /// Interval length.
    #[must_use]
    pub fn len(&self) -> SimTime {
        self.end - self.start
    }

    /// Whether the interval has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Ordered record of signal changes, indexed per signal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    transitions: Vec<Transition>,
    /// Changes of each signal, by [`Signal::index`].
    #[serde(skip)]
    by_signal: [Vec<Transition>; Signal::COUNT],
}

impl Trace {
    /// Create an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change. Times must be non-decreasing.
    pub fn record(&mut self, time: SimTime, signal: Signal, value: bool) {
        debug_assert!(self.transitions.last().map_or(true, |t| t.time <= time));
        let transition = Transition { time, signal, value };
        self.transitions.push(transition);
        self.by_signal[signal.index()].push(transition);
    }

    /// All changes in order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Changes of one signal in time order.
    #[must_use]
    pub fn changes(&self, signal: Signal) -> &[Transition] {
        &self.by_signal[signal.index()]
    }

    /// Changes of one signal.
    pub fn of(&self, signal: Signal) -> impl Iterator<Item = &Transition> + '_ {
        self.changes(signal).iter()
    }

    /// Level of `signal` after all changes at or before `time`.
    #[must_use]
    pub fn value_at(&self, signal: Signal, time: SimTime) -> bool {
        self.last_change(signal, time).map_or(false, |t| t.value)
    }

    /// Most recent change of `signal` at or before `time`.
    #[must_use]
    pub fn last_change(&self, signal: Signal, time: SimTime) -> Option<&Transition> {
        let changes = self.changes(signal);
        changes[..changes.partition_point(|t| t.time <= time)].last()
    }

    /// First change of `signal` to `value` at or after `time`.
    #[must_use]
    pub fn next_change(&self, signal: Signal, value: bool, time: SimTime) -> Option<&Transition> {
        let changes = self.changes(signal);
        changes[changes.partition_point(|t| t.time < time)..]
            .iter()
            .find(|t| t.value == value)
    }

    /// Whether `signal` changes strictly inside `(start, end)`.
    #[must_use]
    pub fn changes_within(&self, signal: Signal, start: SimTime, end: SimTime) -> bool {
        let changes = self.changes(signal);
        changes
            .get(changes.partition_point(|t| t.time <= start))
            .map_or(false, |t| t.time < end)
    }

    /// Closed intervals between consecutive changes of `signal`.
    ///
    /// The initial low interval before the first change and the open
    /// interval after the last change are not included.
    #[must_use]
    pub fn phases(&self, signal: Signal) -> Vec<Phase> {
        self.changes(signal)
            .windows(2)
            .map(|w| Phase {
                start: w[0].time,
                end: w[1].time,
                level: w[0].value,
            })
            .collect()
    }

    /// Times of rising changes of `signal`.
    #[must_use]
    pub fn rising_edges(&self, signal: Signal) -> Vec<SimTime> {
        self.of(signal).filter(|t| t.value).map(|t| t.time).collect()
    }

    /// Time of the last recorded change.
    #[must_use]
    pub fn end_time(&self) -> SimTime {
        self.transitions.last().map_or(0, |t| t.time)
    }

    /// Number of recorded changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
