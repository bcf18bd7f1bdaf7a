//! # Point sources: the opaque work-unit generators.
//!
//! A [`PointSource`] produces a lazy, finite, non-restartable sequence of
//! draws: each call yields either the next data point or a failure signal
//! that abandons the unit. The pool only depends on this seam — what the
//! points mean is the collaborator's business.
//!
//! Two implementations:
//! - [`RandomSource`]: fails each draw with probability `p_fail`, points
//!   uniform in `1..=101`. Seedable for deterministic runs.
//! - [`ScriptedSource`]: replays a fixed sequence of draws (tests).

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One step of a work unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    /// The next data point.
    Point(u32),
    /// Failure signal: the unit is abandoned, no further draws are made.
    Fault,
}

/// A lazy sequence of point draws, consumed one at a time by a worker.
///
/// Implementations are stateful and non-restartable: after returning
/// [`Draw::Fault`] the source is never consulted again for that unit.
pub trait PointSource: Send + 'static {
    /// Draws the next step of the unit.
    fn next_point(&mut self) -> Draw;
}

/// Randomized source backed by [`StdRng`].
///
/// Before each point a failure event is drawn with probability `p_fail`;
/// otherwise a point uniform in `1..=101` is produced.
pub struct RandomSource {
    rng: StdRng,
    p_fail: f64,
}

impl RandomSource {
    /// Creates a source seeded from the operating system.
    pub fn new(p_fail: f64) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            p_fail,
        }
    }

    /// Creates a deterministic source from a fixed seed.
    pub fn seeded(p_fail: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            p_fail,
        }
    }
}

impl PointSource for RandomSource {
    fn next_point(&mut self) -> Draw {
        if self.rng.random::<f64>() < self.p_fail {
            Draw::Fault
        } else {
            Draw::Point(self.rng.random_range(1..=101))
        }
    }
}

/// Replays a fixed script of draws; faults once the script runs out.
///
/// Intended for tests that need an exact failure position.
pub struct ScriptedSource {
    script: VecDeque<Draw>,
}

impl ScriptedSource {
    /// Creates a source that yields the given draws in order.
    pub fn new(script: impl IntoIterator<Item = Draw>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Convenience: a script of `n` sequential points `1..=n`, no fault.
    pub fn counting(n: u32) -> Self {
        Self::new((1..=n).map(Draw::Point))
    }
}

impl PointSource for ScriptedSource {
    fn next_point(&mut self) -> Draw {
        self.script.pop_front().unwrap_or(Draw::Fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_probability_never_faults() {
        let mut src = RandomSource::seeded(0.0, 42);
        for _ in 0..1000 {
            match src.next_point() {
                Draw::Point(v) => assert!((1..=101).contains(&v)),
                Draw::Fault => panic!("fault drawn with p_fail = 0"),
            }
        }
    }

    #[test]
    fn test_seeded_source_is_deterministic() {
        let mut a = RandomSource::seeded(0.3, 7);
        let mut b = RandomSource::seeded(0.3, 7);
        for _ in 0..100 {
            assert_eq!(a.next_point(), b.next_point());
        }
    }

    #[test]
    fn test_high_probability_faults_quickly() {
        let mut src = RandomSource::seeded(0.99, 1);
        let faulted = (0..100).any(|_| src.next_point() == Draw::Fault);
        assert!(faulted);
    }

    #[test]
    fn test_scripted_replays_then_faults() {
        let mut src = ScriptedSource::new([Draw::Point(5), Draw::Point(6)]);
        assert_eq!(src.next_point(), Draw::Point(5));
        assert_eq!(src.next_point(), Draw::Point(6));
        assert_eq!(src.next_point(), Draw::Fault);
    }
}
