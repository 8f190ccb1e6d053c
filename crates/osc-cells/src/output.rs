//! Output stage: idealized buffer with a latch-based clock gate.
//!
//! The gate enable is captured by a latch that is transparent while the
//! clock is low, so opening or closing the gate never shortens a pulse on the
//! output pin. With the gate open the stage is a plain pass-through.

use serde::{Deserialize, Serialize};

/// Buffer between the internal clock and the output pin.
pub trait ClockBuffer {
    /// Drive a new clock level. Returns the output pin level.
    fn drive(&mut self, clk: bool) -> bool;

    /// Change the gate enable while the clock sits at `clk`.
    /// Returns the output pin level.
    ///
    /// Buffers without a gate ignore `enable`.
    fn set_gate(&mut self, enable: bool, clk: bool) -> bool {
        let _ = enable;
        self.drive(clk)
    }

    /// Output pin level.
    fn output(&self) -> bool;
}

/// Ungated pass-through buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealBuffer {
    out: bool,
}

impl ClockBuffer for IdealBuffer {
    fn drive(&mut self, clk: bool) -> bool {
        self.out = clk;
        clk
    }

    fn output(&self) -> bool {
        self.out
    }
}

/// Buffered clock output with a glitch-free gate.
///
/// # Example
///
/// ```
/// use osc_cells::output::{ClockBuffer, OutputStage};
///
/// let mut out = OutputStage::new();
/// assert!(out.drive(true));
///
/// // Closing the gate mid-pulse only takes effect after the clock falls
/// assert!(out.set_gate(false, true));
/// assert!(!out.drive(false));
/// assert!(!out.drive(true));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputStage {
    /// Requested gate enable.
    gate_request: bool,
    /// Gate enable as seen by the AND gate.
    gate_latched: bool,
    /// Last clock level driven into the stage.
    clk: bool,
    /// Output pin level.
    out: bool,
}

impl Default for OutputStage {
    fn default() -> Self {
        Self {
            gate_request: true,
            gate_latched: true,
            clk: false,
            out: false,
        }
    }
}

impl OutputStage {
    /// Create a stage with the gate open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested gate enable.
    #[must_use]
    pub fn gate_enabled(&self) -> bool {
        self.gate_request
    }

    fn evaluate(&mut self) -> bool {
        if !self.clk {
            self.gate_latched = self.gate_request;
        }
        self.out = self.clk && self.gate_latched;
        self.out
    }
}

impl ClockBuffer for OutputStage {
    fn drive(&mut self, clk: bool) -> bool {
        self.clk = clk;
        self.evaluate()
    }

    fn set_gate(&mut self, enable: bool, clk: bool) -> bool {
        self.gate_request = enable;
        self.clk = clk;
        self.evaluate()
    }

    fn output(&self) -> bool {
        self.out
    }
}
