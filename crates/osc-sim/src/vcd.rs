//! Value Change Dump export of a [`Trace`].

use crate::trace::Trace;
use osc_common::error::OscResult;
use osc_common::signal::Signal;
use osc_common::time::SimTime;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Streaming VCD writer for the oscillator's single-bit signals.
pub struct VcdWriter<W: Write> {
    writer: W,
    id_map: HashMap<Signal, String>,
    /// Time of the current `#t` block.
    timestamp: SimTime,
}

impl<W: Write> VcdWriter<W> {
    /// Write the header and initial values, all signals low.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn new(mut writer: W) -> std::io::Result<Self> {
        let mut id_map = HashMap::new();

        writeln!(writer, "$version")?;
        writeln!(writer, "  sysosc {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(writer, "$end")?;
        writeln!(writer, "$timescale 1ps $end")?;
        writeln!(writer, "$scope module sys_osc $end")?;
        for (num, signal) in Signal::ALL.iter().enumerate() {
            let vcd_id = generate_vcd_id(num);
            writeln!(writer, "$var wire 1 {} {} $end", vcd_id, signal.net_name())?;
            id_map.insert(*signal, vcd_id);
        }
        writeln!(writer, "$upscope $end")?;
        writeln!(writer, "$enddefinitions $end")?;

        writeln!(writer, "#0")?;
        writeln!(writer, "$dumpvars")?;
        for signal in Signal::ALL {
            writeln!(writer, "0{}", id_map[&signal])?;
        }
        writeln!(writer, "$end")?;

        Ok(Self {
            writer,
            id_map,
            timestamp: 0,
        })
    }

    /// Emit one value change. Times must be non-decreasing.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn change(&mut self, time: SimTime, signal: Signal, value: bool) -> std::io::Result<()> {
        if time != self.timestamp {
            writeln!(self.writer, "#{time}")?;
            self.timestamp = time;
        }
        writeln!(self.writer, "{}{}", u8::from(value), self.id_map[&signal])
    }

    /// Write a closing timestamp, flush, and return the writer.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    pub fn finish(mut self, end: SimTime) -> std::io::Result<W> {
        if end > self.timestamp {
            writeln!(self.writer, "#{end}")?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Identifier codes drawn from the printable range `!`..`~`.
fn generate_vcd_id(num: usize) -> String {
    let mut id = Vec::new();
    let mut n = num;
    loop {
        // n % 94 < 94, so the sum stays within printable ASCII
        #[allow(clippy::cast_possible_truncation)]
        id.push(char::from((n % 94) as u8 + 33));
        if n < 94 {
            break;
        }
        n = (n / 94) - 1;
    }
    id.iter().rev().collect()
}

/// Write `trace` as VCD, ending at `end`.
///
/// # Errors
///
/// Returns any I/O error from `writer`.
pub fn write_vcd<W: Write>(trace: &Trace, end: SimTime, writer: W) -> std::io::Result<W> {
    let mut vcd = VcdWriter::new(writer)?;
    for t in trace.transitions() {
        vcd.change(t.time, t.signal, t.value)?;
    }
    vcd.finish(end.max(trace.end_time()))
}

/// Write `trace` as a VCD file.
///
/// # Errors
///
/// Returns [`OscError::IoError`](osc_common::error::OscError::IoError) if the
/// file cannot be created or written.
pub fn write_vcd_file(trace: &Trace, end: SimTime, path: &Path) -> OscResult<()> {
    let file = File::create(path)?;
    write_vcd(trace, end, BufWriter::new(file))?;
    info!(path = %path.display(), changes = trace.len(), "VCD written");
    Ok(())
}
