#![doc = "Common types shared across the sysosc workspace."]

pub mod config;
pub mod error;
pub mod metrics;
pub mod signal;
pub mod state;
pub mod time;

pub use config::*;
pub use error::*;
pub use metrics::*;
pub use signal::*;
pub use state::*;
pub use time::*;
