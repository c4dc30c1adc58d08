//! Seeded index selection for the active set.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic generator choosing which active sample to dispense next.
///
/// Draws are uniform over the inclusive range `[0, nominal]`, where `nominal`
/// is the configured fill count, and are then reduced modulo the live size of
/// the active set. The draw range stays fixed at `nominal` for the life of
/// the engine; seeded runs depend on it.
///
/// The sequence is stable for a given `rand` major version, since `StdRng`
/// may change algorithm between them.
#[derive(Debug, Clone)]
pub(crate) struct ShuffleEngine {
    rng: StdRng,
    nominal: usize,
}

impl ShuffleEngine {
    pub(crate) fn new(seed: u64, nominal: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            nominal,
        }
    }

    /// Picks an index in `0..live`. `live` must be non-zero.
    pub(crate) fn pick(&mut self, live: usize) -> usize {
        debug_assert!(live > 0, "cannot pick from an empty active set");
        self.rng.random_range(0..=self.nominal) % live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ShuffleEngine::new(42, 16);
        let mut b = ShuffleEngine::new(42, 16);
        let seq_a: Vec<_> = (0..64).map(|_| a.pick(16)).collect();
        let seq_b: Vec<_> = (0..64).map(|_| b.pick(16)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = ShuffleEngine::new(1, 100);
        let mut b = ShuffleEngine::new(2, 100);
        let seq_a: Vec<_> = (0..64).map(|_| a.pick(100)).collect();
        let seq_b: Vec<_> = (0..64).map(|_| b.pick(100)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn picks_stay_in_bounds_for_any_live_size() {
        let mut engine = ShuffleEngine::new(7, 10);
        for live in 1..=12 {
            for _ in 0..200 {
                assert!(engine.pick(live) < live);
            }
        }
    }

    #[test]
    fn reduces_inclusive_draw_modulo_live_size() {
        let seed = 99;
        let mut engine = ShuffleEngine::new(seed, 5);
        let mut reference = StdRng::seed_from_u64(seed);
        for _ in 0..100 {
            let expected = reference.random_range(0..=5usize) % 5;
            assert_eq!(engine.pick(5), expected);
        }
    }
}
