//! Discrete-event simulation of the system clock oscillator.
//!
//! This crate provides:
//!
//! - **Event queue** ([`scheduler`]): cancellable events with fixed same-instant priority
//! - **Oscillator** ([`oscillator`]): the cells wired together and driven by the queue
//! - **Trace** ([`trace`]): every signal change, with waveform queries
//! - **Checker** ([`checker`]): timing invariants evaluated over a trace
//! - **VCD export** ([`vcd`]): waveform dump for external viewers
//!
//! # Example
//!
//! ```
//! use osc_cells::FixedJitter;
//! use osc_common::{Input, OscParams};
//! use osc_sim::{Oscillator, TraceChecker};
//!
//! let params = OscParams::new(5_000, 20_000, 1_000).unwrap();
//! let mut osc = Oscillator::new(params, FixedJitter(0));
//! osc.schedule_input(0, Input::PowerGood, true).unwrap();
//! osc.schedule_input(0, Input::RawEnable, true).unwrap();
//! osc.run_until(100_000).unwrap();
//!
//! let report = TraceChecker::new(params).check(osc.trace(), osc.now());
//! assert!(report.is_clean());
//! assert_eq!(osc.metrics().rising_edges(), 8);
//! ```

pub mod checker;
pub mod oscillator;
pub mod scheduler;
pub mod trace;
pub mod vcd;

pub use checker::{CheckReport, TraceChecker, Violation};
pub use oscillator::{OscSnapshot, Oscillator};
pub use scheduler::{EventId, EventKind, EventQueue, SimEvent};
pub use trace::{Phase, Trace, Transition};
pub use vcd::{write_vcd, write_vcd_file, VcdWriter};
