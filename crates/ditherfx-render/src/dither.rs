#![forbid(unsafe_code)]

//! Ordered dithering stage.
//!
//! Each pixel gets one scalar offset, added identically to R, G and B
//! (luminance-style, not per-channel):
//!
//! ```text
//! threshold = (BAYER4[y % 4][x % 4] / 16 − 0.5) · intensity · 180
//! noise     = (uniform − 0.5)                    · intensity · 60
//! ```
//!
//! The threshold term is fully deterministic and 4-periodic in both axes;
//! the noise term draws one uniform sample per pixel.

use ditherfx_core::RgbF;

/// 4×4 Bayer threshold matrix, indexed `[y % 4][x % 4]`.
pub const BAYER4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Peak-to-peak amplitude of the Bayer term at intensity 1.
pub const THRESHOLD_AMPLITUDE: f64 = 180.0;
/// Peak-to-peak amplitude of the noise term at intensity 1.
pub const NOISE_AMPLITUDE: f64 = 60.0;

/// Bayer matrix entry for a pixel.
#[inline]
#[must_use]
pub const fn bayer_value(x: u32, y: u32) -> u8 {
    BAYER4[(y & 3) as usize][(x & 3) as usize]
}

/// Threshold + noise perturbation, precomputed for one intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherStage {
    intensity: f64,
    noise_scale: f64,
    // Threshold offsets for each matrix cell (intensity already applied).
    thresholds: [[f64; 4]; 4],
}

impl DitherStage {
    #[must_use]
    pub fn new(intensity: f64) -> Self {
        Self::with_amplitudes(intensity, THRESHOLD_AMPLITUDE, NOISE_AMPLITUDE)
    }

    #[must_use]
    pub fn with_amplitudes(intensity: f64, threshold_amplitude: f64, noise_amplitude: f64) -> Self {
        let mut thresholds = [[0.0; 4]; 4];
        for (row, bayer_row) in thresholds.iter_mut().zip(BAYER4.iter()) {
            for (cell, &b) in row.iter_mut().zip(bayer_row.iter()) {
                *cell = (b as f64 / 16.0 - 0.5) * intensity * threshold_amplitude;
            }
        }
        Self {
            intensity,
            noise_scale: intensity * noise_amplitude,
            thresholds,
        }
    }

    #[inline]
    #[must_use]
    pub const fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Intensity 0 forces both terms to zero: the stage is the identity.
    #[inline]
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.intensity == 0.0
    }

    /// Deterministic Bayer offset for a pixel.
    #[inline]
    #[must_use]
    pub fn threshold(&self, x: u32, y: u32) -> f64 {
        self.thresholds[(y & 3) as usize][(x & 3) as usize]
    }

    /// Stochastic offset for a uniform sample in `[0, 1)`.
    #[inline]
    #[must_use]
    pub fn noise_offset(&self, unit: f64) -> f64 {
        (unit - 0.5) * self.noise_scale
    }

    /// Perturb `base` and clamp to bytes.
    #[inline]
    #[must_use]
    pub fn apply(&self, base: RgbF, x: u32, y: u32, unit: f64) -> [u8; 3] {
        base.offset(self.threshold(x, y) + self.noise_offset(unit))
            .to_bytes()
    }
}

impl Default for DitherStage {
    fn default() -> Self {
        Self::new(ditherfx_core::config::DEFAULT_INTENSITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bayer_matrix_is_a_permutation_of_0_to_15() {
        let mut seen = [false; 16];
        for row in BAYER4 {
            for v in row {
                assert!(!seen[v as usize]);
                seen[v as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn bayer_value_wraps_every_four_pixels() {
        for y in 0..12 {
            for x in 0..12 {
                assert_eq!(bayer_value(x, y), bayer_value(x + 4, y));
                assert_eq!(bayer_value(x, y), bayer_value(x, y + 4));
            }
        }
        assert_eq!(bayer_value(1, 0), 8);
        assert_eq!(bayer_value(0, 3), 15);
    }

    #[test]
    fn zero_intensity_is_identity() {
        let stage = DitherStage::new(0.0);
        assert!(stage.is_passthrough());
        let base = RgbF::new(12.4, 128.6, 250.0);
        for (x, y, unit) in [(0, 0, 0.0), (3, 1, 0.99), (17, 42, 0.5)] {
            assert_eq!(stage.apply(base, x, y, unit), base.to_bytes());
        }
    }

    #[test]
    fn threshold_range_at_full_intensity() {
        let stage = DitherStage::new(1.0);
        assert_eq!(stage.threshold(0, 0), -90.0);
        // 15/16 - 0.5 = 0.4375
        assert_eq!(stage.threshold(0, 3), 0.4375 * 180.0);
    }

    #[test]
    fn noise_is_centered_and_scaled() {
        let stage = DitherStage::new(0.5);
        assert_eq!(stage.noise_offset(0.5), 0.0);
        assert_eq!(stage.noise_offset(0.0), -15.0);
        assert!((stage.noise_offset(1.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn offset_is_shared_across_channels() {
        let stage = DitherStage::new(1.0);
        let base = RgbF::new(100.2, 110.2, 120.2);
        let [r, g, b] = stage.apply(base, 2, 1, 0.75);
        // threshold(2,1) = (14/16 - .5) * 180 = 67.5, noise = 15.
        assert_eq!([r, g, b], [183, 193, 203]);
    }

    #[test]
    fn output_is_clamped() {
        let stage = DitherStage::new(1.0);
        assert_eq!(stage.apply(RgbF::new(250.0, 5.0, 128.0), 0, 3, 0.99), [255, 113, 236]);
        assert_eq!(stage.apply(RgbF::new(5.0, 250.0, 128.0), 0, 0, 0.0), [0, 130, 8]);
    }
}
