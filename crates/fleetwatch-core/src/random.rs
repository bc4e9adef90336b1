//! Seedable random source shared by the simulator and the fleet store.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounded-perturbation generator.
///
/// Wraps a `StdRng` so that a fixed seed reproduces a run exactly. Without a
/// seed the generator is drawn from the operating system.
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is present, OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os(),
        }
    }

    /// Uniform draw in `[low, high)`. Returns `low` for an empty range.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.rng.random_range(low..high)
        } else {
            low
        }
    }

    /// Symmetric jitter in `[-amplitude, amplitude)`.
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        self.uniform(-amplitude, amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_bounds() {
        let mut rng = RandomSource::seeded(7);
        for _ in 0..1_000 {
            let v = rng.uniform(0.05, 0.30);
            assert!((0.05..0.30).contains(&v), "draw out of range: {}", v);
        }
    }

    #[test]
    fn test_empty_range_returns_low() {
        let mut rng = RandomSource::seeded(7);
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
        assert_eq!(rng.uniform(5.0, 1.0), 5.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomSource::seeded(99);
        let mut b = RandomSource::seeded(99);
        for _ in 0..50 {
            assert_eq!(a.jitter(0.5), b.jitter(0.5));
        }
    }
}
