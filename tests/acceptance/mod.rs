//! Integration tests for sysosc acceptance testing.
//!
//! - `scenario_test`: scripted input sequences with exact expected waveforms
//! - `property_test`: seeded random stimulus checked against the timing invariants
//! - `export_test`: VCD output and scenario configuration files

mod common;
mod export_test;
mod property_test;
mod scenario_test;
