//! Sources of per-half-period jitter.
//!
//! The generator asks its source for one sample per scheduled half period.
//! Production runs use [`UniformJitter`]; tests substitute [`FixedJitter`] or
//! [`SequenceJitter`] to get reproducible golden traces.

use osc_common::time::SimTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of jitter samples.
pub trait JitterSource {
    /// Draw one sample in `[0, max]` picoseconds.
    fn sample(&mut self, max: SimTime) -> SimTime;
}

impl<J: JitterSource + ?Sized> JitterSource for Box<J> {
    fn sample(&mut self, max: SimTime) -> SimTime {
        (**self).sample(max)
    }
}

impl<J: JitterSource + ?Sized> JitterSource for &mut J {
    fn sample(&mut self, max: SimTime) -> SimTime {
        (**self).sample(max)
    }
}

/// Uniformly distributed jitter from a seedable PRNG.
#[derive(Debug, Clone)]
pub struct UniformJitter {
    rng: StdRng,
}

impl UniformJitter {
    /// Reproducible source.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl JitterSource for UniformJitter {
    fn sample(&mut self, max: SimTime) -> SimTime {
        if max == 0 {
            0
        } else {
            self.rng.gen_range(0..=max)
        }
    }
}

/// Constant jitter, clamped to the requested maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub SimTime);

impl JitterSource for FixedJitter {
    fn sample(&mut self, max: SimTime) -> SimTime {
        self.0.min(max)
    }
}

/// Replays a fixed list of samples cyclically, each clamped to the maximum.
///
/// An empty sequence yields zero.
#[derive(Debug, Clone, Default)]
pub struct SequenceJitter {
    values: Vec<SimTime>,
    pos: usize,
}

impl SequenceJitter {
    /// Create a source replaying `values`.
    #[must_use]
    pub fn new(values: Vec<SimTime>) -> Self {
        Self { values, pos: 0 }
    }

    /// Number of samples drawn so far.
    #[must_use]
    pub fn drawn(&self) -> usize {
        self.pos
    }
}

impl JitterSource for SequenceJitter {
    fn sample(&mut self, max: SimTime) -> SimTime {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value.min(max)
    }
}
