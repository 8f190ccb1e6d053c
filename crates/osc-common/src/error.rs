use thiserror::Error;

/// Oscillator model errors covering configuration, stimulus, and state-machine misuse.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OscError {
    /// Configuration or parameter validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Maximum jitter exceeds the fraction of the half period the cell allows.
    #[error("max jitter {max_jitter_ps}ps exceeds 20% of the {half_period_ps}ps half period")]
    JitterOutOfRange {
        /// Configured maximum jitter in picoseconds.
        max_jitter_ps: u64,
        /// Configured nominal half period in picoseconds.
        half_period_ps: u64,
    },

    /// Stimulus event could not be applied.
    #[error("stimulus error: {0}")]
    Stimulus(String),

    /// I/O operation error (trace export, report output).
    #[error("I/O error: {0}")]
    IoError(String),

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Source state.
        from: String,
        /// Attempted target state.
        to: String,
    },
}

impl From<std::io::Error> for OscError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

/// Convenience type alias for oscillator model operations.
pub type OscResult<T> = Result<T, OscError>;
