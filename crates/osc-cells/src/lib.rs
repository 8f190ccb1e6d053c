//! Behavioral cells of the system clock oscillator.
//!
//! Each cell is a small state machine that owns exactly one signal:
//!
//! - **Enable filter** ([`enable_filter`]): RC turn-on delay on rising enable
//! - **Disable synchronizer** ([`disable_sync`]): falling-edge flip-flop with async reset
//! - **Clock generator** ([`generator`]): jittered half-period toggling
//! - **Output stage** ([`output`]): [`ClockBuffer`] implementations, one with a glitch-free gate
//! - **Edge detection** ([`triggers`]) and **jitter sources** ([`jitter`])
//!
//! Cells never schedule events themselves; they tell their owner what to
//! schedule and react when it fires.
//!
//! # Example
//!
//! ```
//! use osc_cells::{DisableSynchronizer, EnableFilter, TimerCommand};
//!
//! let mut filter = EnableFilter::new(5_000_000);
//! assert_eq!(filter.set_request(true), TimerCommand::Arm { delay: 5_000_000 });
//! assert!(filter.expire());
//!
//! let mut sync = DisableSynchronizer::new();
//! sync.clock(true, filter.output(), true);
//! assert!(sync.clock(false, filter.output(), true));
//! ```

pub mod disable_sync;
pub mod enable_filter;
pub mod generator;
pub mod jitter;
pub mod output;
pub mod triggers;

// Re-export main types for convenience
pub use disable_sync::{DisableSynchronizer, SyncState};
pub use enable_filter::{EnableFilter, TimerCommand};
pub use generator::JitteredClockGenerator;
pub use jitter::{FixedJitter, JitterSource, SequenceJitter, UniformJitter};
pub use output::{ClockBuffer, IdealBuffer, OutputStage};
pub use triggers::{Edge, EdgeDetector};
