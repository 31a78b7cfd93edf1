//! Deterministic Xorshift64 random source for noise fields.
//!
//! Noise generation never touches process-global randomness: callers pass an
//! `Xorshift64` explicitly (or a seed the generator turns into one), so the
//! same seed always produces the same mask on every platform.

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). Seed 0 is replaced with a
/// non-zero fallback to avoid the all-zeros fixed point.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    ///
    /// Uses the upper 53 bits of `next_u64()` for full mantissa precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Draws `len` independent samples in [0, 1).
    pub fn unit_samples(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.next_f64()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // If this breaks, every seeded noise mask changes.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn same_seed_same_samples() {
        let a = Xorshift64::new(7).unit_samples(256);
        let b = Xorshift64::new(7).unit_samples(256);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = Xorshift64::new(1).unit_samples(16);
        let b = Xorshift64::new(2).unit_samples(16);
        assert_ne!(a, b);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn samples_in_unit_interval_for_any_seed(seed: u64) {
                let samples = Xorshift64::new(seed).unit_samples(100);
                prop_assert!(samples.iter().all(|v| (0.0..1.0).contains(v)));
            }

            #[test]
            fn samples_roughly_uniform(seed: u64) {
                let mut buckets = [0u32; 10];
                for v in Xorshift64::new(seed).unit_samples(10_000) {
                    buckets[(v * 10.0).min(9.0) as usize] += 1;
                }
                // Loose bound; expected ~1000 per bucket.
                prop_assert!(buckets.iter().all(|&c| c >= 500), "{buckets:?}");
            }
        }
    }
}
