//! Named signals of the oscillator cell.
//!
//! Every signal has exactly one writer. Inputs are written by the surrounding
//! harness; the rest are owned by the cell that drives them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally driven input pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    /// Core supply within operating range.
    PowerGood,
    /// Oscillator enable request.
    RawEnable,
    /// Jitter request.
    JitterEnable,
}

impl Input {
    /// The traced signal this input drives.
    #[must_use]
    pub fn signal(self) -> Signal {
        match self {
            Self::PowerGood => Signal::PowerGood,
            Self::RawEnable => Signal::RawEnable,
            Self::JitterEnable => Signal::JitterEnable,
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.signal().fmt(f)
    }
}

/// Every observable signal of the cell, in waveform display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Core power good (input).
    PowerGood,
    /// Raw enable (input).
    RawEnable,
    /// Jitter enable (input).
    JitterEnable,
    /// Delayed rising enable, owned by the enable filter.
    FilteredEnable,
    /// Falling-edge sampled enable, owned by the disable synchronizer.
    TrailingEnable,
    /// `FilteredEnable | TrailingEnable`.
    EffectiveEnable,
    /// Internal oscillator clock.
    Clock,
    /// Buffered clock on the output pin.
    OutputClock,
}

impl Signal {
    /// Number of signals.
    pub const COUNT: usize = 8;

    /// All signals in display order.
    pub const ALL: [Signal; Self::COUNT] = [
        Signal::PowerGood,
        Signal::RawEnable,
        Signal::JitterEnable,
        Signal::FilteredEnable,
        Signal::TrailingEnable,
        Signal::EffectiveEnable,
        Signal::Clock,
        Signal::OutputClock,
    ];

    /// Position in [`Signal::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Net name used in waveform dumps.
    #[must_use]
    pub fn net_name(self) -> &'static str {
        match self {
            Self::PowerGood => "vcore_pok",
            Self::RawEnable => "sys_en",
            Self::JitterEnable => "sys_jen",
            Self::FilteredEnable => "en_osc_re",
            Self::TrailingEnable => "en_osc_fe",
            Self::EffectiveEnable => "en_osc",
            Self::Clock => "clk",
            Self::OutputClock => "sys_clk_o",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PowerGood => "POWER_GOOD",
            Self::RawEnable => "RAW_ENABLE",
            Self::JitterEnable => "JITTER_ENABLE",
            Self::FilteredEnable => "FILTERED_ENABLE",
            Self::TrailingEnable => "TRAILING_ENABLE",
            Self::EffectiveEnable => "EFFECTIVE_ENABLE",
            Self::Clock => "CLOCK",
            Self::OutputClock => "OUTPUT_CLOCK",
        };
        f.write_str(name)
    }
}
