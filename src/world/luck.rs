//! Deterministic spawn generator
//!
//! Maps an arbitrary string key to a reproducible value in [0, 1). Pure:
//! no runtime entropy, no state across calls, stable across process
//! restarts. The key is hashed with xxh3 and the digest seeds a PCG
//! stream from which a single uniform draw is taken; the PCG step keeps
//! the low bits well mixed for threshold comparisons.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use xxhash_rust::xxh3::xxh3_64;

/// Deterministic pseudo-random value in [0, 1) for `key`
pub fn luck(key: &str) -> f64 {
    let mut rng = Pcg32::seed_from_u64(xxh3_64(key.as_bytes()));
    rng.random::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let a = luck("5,5");
        let b = luck("5,5");
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_range() {
        for n in 0..1000 {
            let v = luck(&format!("{},{}", n, -n));
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_distinct_keys_decorrelate() {
        // Neighboring cell keys should not collide
        let mut values: Vec<u64> = (0..100)
            .map(|n| luck(&format!("{n},0")).to_bits())
            .collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 100);
    }

    #[test]
    fn test_roughly_uniform() {
        // Statistical check over many samples: mean near 0.5 and mass below
        // a 10% threshold near 10%. Tolerances are several sigma wide.
        let n = 10_000;
        let mut sum = 0.0;
        let mut below = 0usize;
        for k in 0..n {
            let v = luck(&format!("{},{}", k / 100, k % 100));
            sum += v;
            if v < 0.1 {
                below += 1;
            }
        }
        let mean = sum / n as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean drifted: {mean}");
        let frac = below as f64 / n as f64;
        assert!((frac - 0.1).abs() < 0.02, "threshold mass drifted: {frac}");
    }
}
