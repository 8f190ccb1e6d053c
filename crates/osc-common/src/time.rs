//! Simulation time base.
//!
//! All simulated time is kept as an unsigned count of picoseconds. Durations
//! from configuration files are converted once, at the edge of the model.

use crate::error::{OscError, OscResult};
use std::time::Duration;

/// Simulation time in picoseconds.
pub type SimTime = u64;

/// Picoseconds per nanosecond.
pub const PS_PER_NS: SimTime = 1_000;

/// Picoseconds per microsecond.
pub const PS_PER_US: SimTime = 1_000_000;

/// Convert a wall-clock style `Duration` into simulation time.
///
/// # Errors
///
/// Returns [`OscError::Config`] if the duration does not fit into a 64-bit
/// picosecond count.
pub fn sim_time_from_duration(duration: Duration) -> OscResult<SimTime> {
    duration
        .as_nanos()
        .checked_mul(u128::from(PS_PER_NS))
        .and_then(|ps| SimTime::try_from(ps).ok())
        .ok_or_else(|| OscError::Config(format!("duration {duration:?} overflows picosecond time")))
}

/// Render a simulation timestamp with the largest unit that keeps it exact.
#[must_use]
pub fn format_sim_time(time: SimTime) -> String {
    if time == 0 {
        "0ps".to_string()
    } else if time % PS_PER_US == 0 {
        format!("{}us", time / PS_PER_US)
    } else if time % PS_PER_NS == 0 {
        format!("{}ns", time / PS_PER_NS)
    } else {
        format!("{time}ps")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_conversion() {
        assert_eq!(sim_time_from_duration(Duration::from_nanos(5)).unwrap(), 5_000);
        assert_eq!(
            sim_time_from_duration(Duration::from_micros(5)).unwrap(),
            5 * PS_PER_US
        );
    }

    #[test]
    fn test_duration_overflow() {
        assert!(sim_time_from_duration(Duration::from_secs(u64::MAX)).is_err());
    }

    #[test]
    fn test_format_sim_time() {
        assert_eq!(format_sim_time(0), "0ps");
        assert_eq!(format_sim_time(1_500), "1500ps");
        assert_eq!(format_sim_time(5_000), "5ns");
        assert_eq!(format_sim_time(5 * PS_PER_US), "5us");
    }
}
