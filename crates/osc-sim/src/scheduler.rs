//! Time-ordered event queue for one oscillator instance.
//!
//! Events are popped in order of time, then rank, then scheduling order.
//! The rank encodes the fixed priority between same-instant events:
//!
//! 1. power-good changes (asynchronous reset)
//! 2. other input changes
//! 3. clock toggles (falling-edge sampling happens inside the toggle)
//! 4. enable filter turn-on expiries
//!
//! Cancellation is lazy: a cancelled event stays in the heap and is dropped
//! when it reaches the top.

use osc_common::signal::Input;
use osc_common::time::SimTime;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Handle to a scheduled event, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

/// What happens when an event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// External input change.
    Input {
        /// Driven pin.
        input: Input,
        /// New level.
        value: bool,
    },
    /// Scheduled clock toggle.
    ClockToggle,
    /// Enable filter turn-on delay elapsed.
    FilterExpire,
}

impl EventKind {
    /// Same-instant priority; lower runs first.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Input {
                input: Input::PowerGood,
                ..
            } => 0,
            Self::Input { .. } => 1,
            Self::ClockToggle => 2,
            Self::FilterExpire => 3,
        }
    }
}

/// A scheduled event.
#[derive(Debug, Clone, Copy)]
pub struct SimEvent {
    /// Firing time.
    pub time: SimTime,
    /// Handle.
    pub id: EventId,
    /// Action.
    pub kind: EventKind,
}

impl PartialEq for SimEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SimEvent {}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest event has highest priority (BinaryHeap is a max-heap)
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.kind.rank().cmp(&self.kind.rank()))
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Event queue with cancellable entries.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<SimEvent>,
    live: HashSet<EventId>,
    next_id: u64,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` at absolute time `time`.
    pub fn schedule(&mut self, time: SimTime, kind: EventKind) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.heap.push(SimEvent { time, id, kind });
        self.live.insert(id);
        id
    }

    /// Cancel a pending event.
    ///
    /// Returns `false` if the event already fired or was cancelled.
    pub fn cancel(&mut self, id: EventId) -> bool {
        self.live.remove(&id)
    }

    /// Time of the next live event.
    pub fn next_time(&mut self) -> Option<SimTime> {
        self.discard_cancelled();
        self.heap.peek().map(|e| e.time)
    }

    /// Pop the next live event.
    pub fn pop(&mut self) -> Option<SimEvent> {
        self.discard_cancelled();
        let event = self.heap.pop()?;
        self.live.remove(&event.id);
        Some(event)
    }

    /// Number of live events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no live events remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn discard_cancelled(&mut self) {
        while let Some(top) = self.heap.peek() {
            if self.live.contains(&top.id) {
                break;
            }
            self.heap.pop();
        }
    }
}
