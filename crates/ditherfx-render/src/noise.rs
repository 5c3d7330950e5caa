#![forbid(unsafe_code)]

//! Uniform noise sources for the dithering and grain stages.
//!
//! The kernel only needs "one uniform sample in `[0, 1)` per pixel"; the
//! statistical quality bar is low, so a xorshift64* generator is plenty.
//! Tests swap in [`FixedNoise`] to make frames fully deterministic.

use web_time::{SystemTime, UNIX_EPOCH};

/// Source of uniform samples in `[0, 1)`.
pub trait NoiseSource {
    fn next_unit(&mut self) -> f64;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// xorshift64* generator.
#[derive(Debug, Clone)]
pub struct XorShiftNoise {
    state: u64,
}

// Any non-zero constant works; zero is a fixed point of xorshift.
const FALLBACK_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
const MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

impl XorShiftNoise {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    /// Seed from the wall clock.
    #[must_use]
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(FALLBACK_SEED);
        Self::new(nanos ^ FALLBACK_SEED)
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(MULTIPLIER)
    }
}

impl Default for XorShiftNoise {
    fn default() -> Self {
        Self::from_clock()
    }
}

impl NoiseSource for XorShiftNoise {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        // Top 53 bits → exactly representable, strictly below 1.
        (self.next_u64() >> 11) as f64 * UNIT_SCALE
    }
}

/// Constant sample; pins the stochastic term for reproducible frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedNoise(pub f64);

impl Default for FixedNoise {
    /// `0.5` zeroes the noise term.
    fn default() -> Self {
        Self(0.5)
    }
}

impl NoiseSource for FixedNoise {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_in_half_open_unit_interval() {
        let mut rng = XorShiftNoise::new(42);
        for _ in 0..10_000 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = XorShiftNoise::new(7);
        let mut b = XorShiftNoise::new(7);
        for _ in 0..64 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn zero_seed_does_not_stall() {
        let mut rng = XorShiftNoise::new(0);
        let first = rng.next_u64();
        assert_ne!(first, 0);
        assert_ne!(first, rng.next_u64());
    }

    #[test]
    fn mean_is_roughly_centered() {
        let mut rng = XorShiftNoise::new(0xDEAD_BEEF);
        let n = 50_000;
        let mean = (0..n).map(|_| rng.next_unit()).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean={mean}");
    }

    #[test]
    fn fixed_noise_and_mut_ref_forwarding() {
        fn draw<N: NoiseSource>(mut noise: N) -> f64 {
            noise.next_unit()
        }
        let mut fixed = FixedNoise(0.25);
        assert_eq!(draw(&mut fixed), 0.25);
        assert_eq!(FixedNoise::default().next_unit(), 0.5);
    }
}
