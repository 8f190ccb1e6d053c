//! Configuration structures for the oscillator model and its simulation runs.
//!
//! Supports TOML deserialization with defaults matching a 100 MHz cell with a
//! 5 µs RC turn-on delay. Durations use humantime notation (`"5ns"`, `"5us"`).

use crate::error::{OscError, OscResult};
use crate::signal::Input;
use crate::time::{sim_time_from_duration, SimTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Largest allowed jitter as a fraction of the nominal half period (1/5 = 20%).
pub const MAX_JITTER_DIVISOR: u64 = 5;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Oscillator timing parameters.
    pub oscillator: OscConfig,

    /// Jitter source configuration.
    pub jitter: JitterConfig,

    /// Run length and outputs.
    pub run: RunConfig,

    /// Timed input changes applied during the run.
    pub stimulus: Vec<StimulusEvent>,
}

/// Oscillator timing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    /// Nominal half period of the generated clock.
    #[serde(with = "humantime_serde")]
    pub nominal_half_period: Duration,

    /// RC turn-on delay applied to rising enable requests.
    #[serde(with = "humantime_serde")]
    pub enable_turn_on_delay: Duration,

    /// Upper bound of the per-half-period jitter term (at most 20% of the half period).
    #[serde(with = "humantime_serde")]
    pub max_jitter: Duration,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            nominal_half_period: Duration::from_nanos(5),
            enable_turn_on_delay: Duration::from_micros(5),
            max_jitter: Duration::from_nanos(1),
        }
    }
}

impl OscConfig {
    /// Validate the configuration and resolve it into picosecond parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration overflows simulation time, the half
    /// period is zero, or the jitter bound exceeds 20% of the half period.
    pub fn validate(&self) -> OscResult<OscParams> {
        OscParams::new(
            sim_time_from_duration(self.nominal_half_period)?,
            sim_time_from_duration(self.enable_turn_on_delay)?,
            sim_time_from_duration(self.max_jitter)?,
        )
    }
}

/// Validated oscillator parameters in simulation time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OscParams {
    /// Nominal half period in picoseconds.
    pub nominal_half_period: SimTime,
    /// Enable turn-on delay in picoseconds.
    pub enable_turn_on_delay: SimTime,
    /// Maximum jitter in picoseconds.
    pub max_jitter: SimTime,
}

impl OscParams {
    /// Build a parameter set, enforcing the cell's timing constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if `nominal_half_period` is zero, `max_jitter`
    /// exceeds 20% of it, or the longest half period overflows simulation time.
    pub fn new(
        nominal_half_period: SimTime,
        enable_turn_on_delay: SimTime,
        max_jitter: SimTime,
    ) -> OscResult<Self> {
        if nominal_half_period == 0 {
            return Err(OscError::Config(
                "nominal half period must be non-zero".into(),
            ));
        }
        if max_jitter.saturating_mul(MAX_JITTER_DIVISOR) > nominal_half_period {
            return Err(OscError::JitterOutOfRange {
                max_jitter_ps: max_jitter,
                half_period_ps: nominal_half_period,
            });
        }
        if nominal_half_period.checked_add(max_jitter).is_none() {
            return Err(OscError::Config(format!(
                "half period {nominal_half_period} ps plus jitter {max_jitter} ps overflows simulation time"
            )));
        }
        debug!(
            nominal_half_period,
            enable_turn_on_delay, max_jitter, "Oscillator parameters validated"
        );
        Ok(Self {
            nominal_half_period,
            enable_turn_on_delay,
            max_jitter,
        })
    }

    /// Longest half period the generator may produce.
    #[must_use]
    pub fn max_half_period(&self) -> SimTime {
        self.nominal_half_period + self.max_jitter
    }
}

impl Default for OscParams {
    fn default() -> Self {
        Self {
            nominal_half_period: 5_000,
            enable_turn_on_delay: 5_000_000,
            max_jitter: 1_000,
        }
    }
}

/// Jitter source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Initial level of the jitter-enable input.
    pub enabled: bool,

    /// Seed for the jitter generator. Drawn from OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
        }
    }
}

/// Run length and output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulated time to run for.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    /// Optional VCD waveform output path.
    pub vcd: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_micros(30),
            vcd: None,
        }
    }
}

/// A single timed input change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusEvent {
    /// Simulation time at which the input changes.
    #[serde(with = "humantime_serde")]
    pub at: Duration,

    /// Input pin being driven.
    pub input: Input,

    /// New level.
    pub value: bool,
}

impl StimulusEvent {
    /// Create a stimulus event.
    #[must_use]
    pub fn new(at: Duration, input: Input, value: bool) -> Self {
        Self { at, input, value }
    }
}

impl SimConfig {
    /// Built-in scenario: power up, enable, disable while running, then drop power.
    #[must_use]
    pub fn power_cycle_scenario() -> Self {
        Self {
            stimulus: vec![
                StimulusEvent::new(Duration::ZERO, Input::PowerGood, true),
                StimulusEvent::new(Duration::from_micros(1), Input::RawEnable, true),
                StimulusEvent::new(Duration::from_nanos(18_002), Input::RawEnable, false),
                StimulusEvent::new(Duration::from_micros(20), Input::RawEnable, true),
                StimulusEvent::new(Duration::from_nanos(27_503), Input::PowerGood, false),
            ],
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
