//! Event-driven model of the system clock oscillator.
//!
//! The [`Oscillator`] wires the cells together and owns the event queue:
//!
//! ```text
//! power_good ─┐
//!             AND ─► EnableFilter ─┬──────────────── OR ─► generator ─► clk ─► OutputStage
//! raw_enable ─┘                    └─► DisableSync ──┘          ▲        │
//!                                          ▲                    │        │
//!                                          └──── negedge ───────┴────────┘
//! ```
//!
//! Every handler ends in [`Oscillator::settle`], which recomputes the
//! effective enable and starts or stops the generator.

use crate::scheduler::{EventId, EventKind, EventQueue};
use crate::trace::Trace;
use osc_cells::{
    ClockBuffer, DisableSynchronizer, EnableFilter, JitterSource, JitteredClockGenerator,
    OutputStage, TimerCommand, UniformJitter,
};
use osc_common::config::{OscConfig, OscParams, StimulusEvent};
use osc_common::error::{OscError, OscResult};
use osc_common::metrics::{ClockMetrics, DEFAULT_HISTOGRAM_SIZE};
use osc_common::signal::{Input, Signal};
use osc_common::state::GeneratorState;
use osc_common::time::{format_sim_time, sim_time_from_duration, SimTime};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Point-in-time view of the oscillator's signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OscSnapshot {
    /// Current simulation time.
    pub time: SimTime,
    /// PowerGood input.
    pub power_good: bool,
    /// RawEnable input.
    pub raw_enable: bool,
    /// FilteredEnable.
    pub filtered_enable: bool,
    /// TrailingEnable.
    pub trailing_enable: bool,
    /// EffectiveEnable.
    pub effective_enable: bool,
    /// Internal clock.
    pub clock: bool,
    /// Generator state.
    pub state: GeneratorState,
    /// Live events in the queue.
    pub pending_events: usize,
}

/// One oscillator instance with its own event queue.
pub struct Oscillator<J = UniformJitter, B = OutputStage> {
    params: OscParams,
    now: SimTime,
    queue: EventQueue,
    power_good: bool,
    raw_enable: bool,
    filter: EnableFilter,
    filter_timer: Option<EventId>,
    sync: DisableSynchronizer,
    generator: JitteredClockGenerator<J>,
    toggle_event: Option<EventId>,
    output: B,
    effective: bool,
    /// Last clock edge of the current run, for phase metrics.
    last_edge: Option<SimTime>,
    trace: Trace,
    metrics: ClockMetrics,
}

impl<J, B> std::fmt::Debug for Oscillator<J, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oscillator")
            .field("now", &self.now)
            .field("power_good", &self.power_good)
            .field("raw_enable", &self.raw_enable)
            .field("effective", &self.effective)
            .field("pending_events", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl<J: JitterSource> Oscillator<J> {
    /// Create an unpowered oscillator at time zero with a gated output stage.
    ///
    /// # Example
    ///
    /// ```
    /// use osc_cells::FixedJitter;
    /// use osc_common::{Input, OscParams};
    /// use osc_sim::Oscillator;
    ///
    /// let params = OscParams::new(5_000, 1_000, 0).unwrap();
    /// let mut osc = Oscillator::new(params, FixedJitter(0));
    /// osc.set_input(Input::PowerGood, true).unwrap();
    /// osc.set_input(Input::RawEnable, true).unwrap();
    ///
    /// osc.run_until(6_000).unwrap();
    /// assert!(osc.clock());
    /// ```
    pub fn new(params: OscParams, jitter: J) -> Self {
        Self::with_buffer(params, jitter, OutputStage::new())
    }

    /// Create an oscillator from a configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(config: &OscConfig, jitter: J) -> OscResult<Self> {
        Ok(Self::new(config.validate()?, jitter))
    }
}

impl<J: JitterSource, B: ClockBuffer> Oscillator<J, B> {
    /// Create an unpowered oscillator driving `buffer`.
    pub fn with_buffer(params: OscParams, jitter: J, buffer: B) -> Self {
        Self {
            params,
            now: 0,
            queue: EventQueue::new(),
            power_good: false,
            raw_enable: false,
            filter: EnableFilter::new(params.enable_turn_on_delay),
            filter_timer: None,
            sync: DisableSynchronizer::new(),
            generator: JitteredClockGenerator::new(&params, jitter),
            toggle_event: None,
            output: buffer,
            effective: false,
            last_edge: None,
            trace: Trace::new(),
            metrics: ClockMetrics::new(DEFAULT_HISTOGRAM_SIZE, params.nominal_half_period),
        }
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Timing parameters.
    #[must_use]
    pub fn params(&self) -> &OscParams {
        &self.params
    }

    /// Schedule an input change at absolute time `at`.
    ///
    /// # Errors
    ///
    /// Returns [`OscError::Stimulus`] if `at` lies in the past.
    pub fn schedule_input(&mut self, at: SimTime, input: Input, value: bool) -> OscResult<EventId> {
        if at < self.now {
            return Err(OscError::Stimulus(format!(
                "{input} change at {} is before current time {}",
                format_sim_time(at),
                format_sim_time(self.now)
            )));
        }
        Ok(self.queue.schedule(at, EventKind::Input { input, value }))
    }

    /// Schedule a list of stimulus events.
    ///
    /// # Errors
    ///
    /// Returns an error if an event time overflows or lies in the past.
    pub fn apply_stimulus(&mut self, events: &[StimulusEvent]) -> OscResult<()> {
        for event in events {
            let at = sim_time_from_duration(event.at)?;
            self.schedule_input(at, event.input, event.value)?;
        }
        debug!(count = events.len(), "Stimulus scheduled");
        Ok(())
    }

    /// Change an input now and process everything due at the current instant.
    ///
    /// # Errors
    ///
    /// Propagates errors from event handling.
    pub fn set_input(&mut self, input: Input, value: bool) -> OscResult<()> {
        self.schedule_input(self.now, input, value)?;
        self.run_until(self.now)?;
        Ok(())
    }

    /// Open or close the output clock gate.
    pub fn set_output_gate(&mut self, enable: bool) {
        let before = self.output.output();
        let out = self.output.set_gate(enable, self.generator.clock());
        if out != before {
            self.record(Signal::OutputClock, out);
        }
    }

    /// Process the next event, if any.
    ///
    /// Returns the time of the processed event.
    ///
    /// # Errors
    ///
    /// Propagates state-machine errors from event handling.
    pub fn step(&mut self) -> OscResult<Option<SimTime>> {
        let Some(event) = self.queue.pop() else {
            return Ok(None);
        };
        debug_assert!(event.time >= self.now);
        self.now = event.time;
        self.dispatch(event.kind)?;
        Ok(Some(event.time))
    }

    /// Process all events up to and including `until`, then advance time to it.
    ///
    /// Returns the number of events processed.
    ///
    /// # Errors
    ///
    /// Propagates state-machine errors from event handling.
    pub fn run_until(&mut self, until: SimTime) -> OscResult<u64> {
        let mut processed = 0;
        while let Some(time) = self.queue.next_time() {
            if time > until {
                break;
            }
            self.step()?;
            processed += 1;
        }
        self.now = self.now.max(until);
        Ok(processed)
    }

    /// Run for `duration` of simulated time from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration overflows or event handling fails.
    pub fn run_for(&mut self, duration: Duration) -> OscResult<u64> {
        let until = self
            .now
            .checked_add(sim_time_from_duration(duration)?)
            .ok_or_else(|| OscError::Config("run end overflows simulation time".into()))?;
        self.run_until(until)
    }

    fn dispatch(&mut self, kind: EventKind) -> OscResult<()> {
        match kind {
            EventKind::Input {
                input: Input::PowerGood,
                value,
            } => self.on_power_good(value),
            EventKind::Input {
                input: Input::RawEnable,
                value,
            } => {
                if self.raw_enable != value {
                    self.raw_enable = value;
                    self.record(Signal::RawEnable, value);
                }
                self.update_request();
            }
            EventKind::Input {
                input: Input::JitterEnable,
                value,
            } => {
                if self.generator.jitter_enabled() != value {
                    self.generator.set_jitter_enabled(value);
                    self.record(Signal::JitterEnable, value);
                }
            }
            EventKind::ClockToggle => self.on_toggle(),
            EventKind::FilterExpire => {
                self.filter_timer = None;
                if self.filter.expire() {
                    debug!(at = %format_sim_time(self.now), "Enable filter settled high");
                    self.record(Signal::FilteredEnable, true);
                }
            }
        }
        self.settle()
    }

    fn on_power_good(&mut self, value: bool) {
        if self.power_good == value {
            return;
        }
        self.power_good = value;
        self.record(Signal::PowerGood, value);

        if !value {
            debug!(at = %format_sim_time(self.now), "Power good lost, clearing enables");
            if self.sync.power_lost() {
                self.record(Signal::TrailingEnable, false);
            }
        }
        self.update_request();
    }

    /// Feed `power_good && raw_enable` to the enable filter and manage its timer.
    fn update_request(&mut self) {
        let before = self.filter.output();
        match self.filter.set_request(self.power_good && self.raw_enable) {
            TimerCommand::Keep => {}
            TimerCommand::Arm { delay } => {
                let id = self
                    .queue
                    .schedule(self.now.saturating_add(delay), EventKind::FilterExpire);
                self.filter_timer = Some(id);
            }
            TimerCommand::Cancel => {
                if let Some(id) = self.filter_timer.take() {
                    self.queue.cancel(id);
                }
            }
        }
        let after = self.filter.output();
        if after != before {
            self.record(Signal::FilteredEnable, after);
        }
    }

    fn on_toggle(&mut self) {
        self.toggle_event = None;
        let before = self.generator.clock();
        let enable = self.filter.output() || self.sync.output();
        let clk = self.generator.toggle(enable);
        if clk == before {
            return;
        }

        self.record(Signal::Clock, clk);
        let phase = self.last_edge.map(|t| self.now - t);
        self.metrics.record_edge(clk, phase);
        self.last_edge = Some(self.now);

        let out_before = self.output.output();
        let out = self.output.drive(clk);
        if out != out_before {
            self.record(Signal::OutputClock, out);
        }

        // Sampled after the clock write, so a falling edge sees this instant's enable
        let trailing_before = self.sync.output();
        let trailing = self.sync.clock(clk, self.filter.output(), self.power_good);
        if trailing != trailing_before {
            self.record(Signal::TrailingEnable, trailing);
        }
    }

    /// Recompute the effective enable and start or stop the generator.
    fn settle(&mut self) -> OscResult<()> {
        let effective = self.filter.output() || self.sync.output();
        if effective != self.effective {
            self.effective = effective;
            self.record(Signal::EffectiveEnable, effective);
        }

        match (self.generator.state(), effective) {
            (GeneratorState::Idle, true) => {
                self.generator.start()?;
                info!(at = %format_sim_time(self.now), "Oscillator started");
                self.schedule_toggle();
            }
            (GeneratorState::Running, true) if self.toggle_event.is_none() => {
                self.schedule_toggle();
            }
            (GeneratorState::Running, false) if !self.generator.clock() => {
                if let Some(id) = self.toggle_event.take() {
                    self.queue.cancel(id);
                }
                self.generator.stop()?;
                self.last_edge = None;
                info!(at = %format_sim_time(self.now), "Oscillator stopped");
            }
            _ => {}
        }
        Ok(())
    }

    fn schedule_toggle(&mut self) {
        let half_period = self.generator.next_half_period();
        if self.generator.jitter_enabled() {
            self.metrics.jitter.record(self.generator.last_jitter());
        }
        let id = self
            .queue
            .schedule(self.now.saturating_add(half_period), EventKind::ClockToggle);
        self.toggle_event = Some(id);
    }

    fn record(&mut self, signal: Signal, value: bool) {
        trace!(time = self.now, %signal, value, "Signal change");
        self.trace.record(self.now, signal, value);
    }

    /// PowerGood input level.
    #[must_use]
    pub fn power_good(&self) -> bool {
        self.power_good
    }

    /// RawEnable input level.
    #[must_use]
    pub fn raw_enable(&self) -> bool {
        self.raw_enable
    }

    /// JitterEnable input level.
    #[must_use]
    pub fn jitter_enabled(&self) -> bool {
        self.generator.jitter_enabled()
    }

    /// FilteredEnable.
    #[must_use]
    pub fn filtered_enable(&self) -> bool {
        self.filter.output()
    }

    /// TrailingEnable.
    #[must_use]
    pub fn trailing_enable(&self) -> bool {
        self.sync.output()
    }

    /// EffectiveEnable.
    #[must_use]
    pub fn effective_enable(&self) -> bool {
        self.effective
    }

    /// Internal clock level.
    #[must_use]
    pub fn clock(&self) -> bool {
        self.generator.clock()
    }

    /// Output pin level.
    #[must_use]
    pub fn output_clock(&self) -> bool {
        self.output.output()
    }

    /// Generator state.
    #[must_use]
    pub fn generator_state(&self) -> GeneratorState {
        self.generator.state()
    }

    /// Recorded waveform.
    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Consume the oscillator, keeping its waveform.
    #[must_use]
    pub fn into_trace(self) -> Trace {
        self.trace
    }

    /// Phase metrics.
    #[must_use]
    pub fn metrics(&self) -> &ClockMetrics {
        &self.metrics
    }

    /// Current signal snapshot.
    #[must_use]
    pub fn snapshot(&self) -> OscSnapshot {
        OscSnapshot {
            time: self.now,
            power_good: self.power_good,
            raw_enable: self.raw_enable,
            filtered_enable: self.filter.output(),
            trailing_enable: self.sync.output(),
            effective_enable: self.effective,
            clock: self.generator.clock(),
            state: self.generator.state(),
            pending_events: self.queue.len(),
        }
    }
}
