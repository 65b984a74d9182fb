//! Deterministic random number generation for effect execution.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed and same call sequence produce identical results
//! - **Game-shaped helpers**: coin flips, shuffles, random picks
//! - **Serializable**: O(1) state capture and restore for replays
//!
//! ## Usage
//!
//! ```
//! use rust_tcg_effects::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let heads = rng.flip_coins(3);
//! assert!(heads <= 3);
//!
//! // Same seed replays the same flips
//! let mut replay = GameRng::new(42);
//! assert_eq!(replay.flip_coins(3), heads);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG used by the execution context.
///
/// Uses ChaCha8 for speed while keeping every coin flip, random pick and
/// shuffle reproducible from `(seed, sequence of calls)`.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Flip one coin. `true` is heads.
    pub fn flip_coin(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    /// Flip `count` coins and return the number of heads.
    pub fn flip_coins(&mut self, count: u32) -> u32 {
        (0..count).filter(|_| self.flip_coin()).count() as u32
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Shuffle an `im::Vector` and return the reordered copy.
    #[must_use]
    pub fn shuffled<T: Clone>(&mut self, items: &im::Vector<T>) -> im::Vector<T> {
        let mut buffer: Vec<T> = items.iter().cloned().collect();
        self.shuffle(&mut buffer);
        buffer.into_iter().collect()
    }

    /// Pick one random element from a slice.
    #[must_use]
    pub fn pick_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Pick `amount` distinct indices out of `len`, in the order drawn.
    ///
    /// Returns every index when `amount >= len`.
    pub fn pick_random_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(len);
        rand::seq::index::sample(&mut self.inner, len, amount).into_vec()
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for checkpointing.
///
/// Uses ChaCha8 word position for O(1) serialization regardless of
/// how many random numbers have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range_usize(0..1000), rng2.gen_range_usize(0..1000));
            assert_eq!(rng1.flip_coin(), rng2.flip_coin());
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_range_usize(0..1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_range_usize(0..1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_flip_coins_bounds() {
        let mut rng = GameRng::new(7);
        for count in 0..10 {
            assert!(rng.flip_coins(count) <= count);
        }
        assert_eq!(rng.flip_coins(0), 0);
    }

    #[test]
    fn test_random_in_unit_interval() {
        let mut rng = GameRng::new(3);
        for _ in 0..100 {
            let x = rng.random();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_shuffle() {
        let mut rng = GameRng::new(42);
        let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let original = data.clone();

        rng.shuffle(&mut data);

        assert_eq!(data.len(), original.len());
        assert_ne!(data, original);

        data.sort();
        assert_eq!(data, original);
    }

    #[test]
    fn test_shuffled_vector_keeps_elements() {
        let mut rng = GameRng::new(9);
        let items: im::Vector<u32> = (0..20).collect();
        let mut shuffled: Vec<u32> = rng.shuffled(&items).into_iter().collect();
        shuffled.sort_unstable();
        assert_eq!(shuffled, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_pick_random() {
        let mut rng = GameRng::new(42);
        let items = vec![1, 2, 3, 4, 5];

        let chosen = rng.pick_random(&items);
        assert!(chosen.is_some());
        assert!(items.contains(chosen.unwrap()));

        let empty: Vec<i32> = vec![];
        assert!(rng.pick_random(&empty).is_none());
    }

    #[test]
    fn test_pick_random_indices_distinct() {
        let mut rng = GameRng::new(11);
        let mut picked = rng.pick_random_indices(10, 4);
        assert_eq!(picked.len(), 4);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|&i| i < 10));

        assert_eq!(rng.pick_random_indices(3, 8).len(), 3);
    }

    #[test]
    fn test_state_serialization() {
        let mut rng = GameRng::new(42);

        for _ in 0..100 {
            rng.gen_range_usize(0..1000);
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.flip_coin()).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.flip_coin()).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let state = GameRngState {
            seed: 42,
            word_pos: 12345,
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: GameRngState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }
}
