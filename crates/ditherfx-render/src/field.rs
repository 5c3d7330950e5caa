#![forbid(unsafe_code)]

//! Gradient field: pixel → interpolation parameter.
//!
//! ```text
//! proj = (x / W) · cos(angle) + (y / H) · sin(angle)
//! t    = proj · 0.8 + 0.1 + sin(elapsed · speed · 0.0008) · 0.1
//! ```
//!
//! The projection is compressed into the central band so the oscillation
//! can slide it ±0.1 without saturating both ends at once. `t` is returned
//! un-clamped; the color model clamps before picking a segment.

use ditherfx_core::SurfaceSize;

/// Projection scale into the central band.
pub const BAND_SCALE: f64 = 0.8;
/// Offset of the central band.
pub const BAND_OFFSET: f64 = 0.1;
/// Peak oscillation added to the projection.
pub const OSCILLATION_AMPLITUDE: f64 = 0.1;
/// Phase radians per (nominal millisecond × speed unit).
pub const PHASE_RATE: f64 = 0.0008;

/// Oscillation phase for a given elapsed time (nominal ms) and speed.
#[inline]
#[must_use]
pub fn oscillation_phase(elapsed_ms: f64, speed: f64) -> f64 {
    elapsed_ms * speed * PHASE_RATE
}

/// Rotated gradient axis with per-resize geometry caches.
#[derive(Debug, Clone)]
pub struct GradientField {
    angle_deg: f64,
    cos: f64,
    sin: f64,
    scratch: FieldScratch,
}

#[derive(Debug, Clone, Default)]
struct FieldScratch {
    size: SurfaceSize,
    // Bit pattern of the angle the caches were built for.
    angle_bits: u64,
    valid: bool,
    // Per-column `nx · cos` (computed once per resize/angle change).
    col_terms: Vec<f64>,
    // Per-row `ny · sin` (computed once per resize/angle change).
    row_terms: Vec<f64>,
}

impl GradientField {
    /// Any real angle is accepted; trig periodicity reduces it.
    #[must_use]
    pub fn new(angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Self {
            angle_deg,
            cos,
            sin,
            scratch: FieldScratch::default(),
        }
    }

    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle_deg
    }

    pub fn set_angle(&mut self, angle_deg: f64) {
        if angle_deg.to_bits() == self.angle_deg.to_bits() {
            return;
        }
        *self = Self {
            scratch: std::mem::take(&mut self.scratch),
            ..Self::new(angle_deg)
        };
    }

    /// Signed position of normalized `(nx, ny)` along the axis.
    #[inline]
    #[must_use]
    pub fn projection(&self, nx: f64, ny: f64) -> f64 {
        nx * self.cos + ny * self.sin
    }

    /// Un-clamped interpolation parameter.
    #[inline]
    #[must_use]
    pub fn position(&self, nx: f64, ny: f64, phase: f64) -> f64 {
        compress(self.projection(nx, ny), oscillation(phase))
    }

    /// Interpolation parameter clamped to `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn parameter(&self, nx: f64, ny: f64, phase: f64) -> f64 {
        self.position(nx, ny, phase).clamp(0.0, 1.0)
    }

    /// Build per-column and per-row projection terms for `size`.
    ///
    /// No-op when neither the size nor the angle changed since the last call.
    pub fn ensure_geometry(&mut self, size: SurfaceSize) {
        let scratch = &mut self.scratch;
        let angle_bits = self.angle_deg.to_bits();
        if scratch.valid && scratch.size == size && scratch.angle_bits == angle_bits {
            return;
        }
        scratch.size = size;
        scratch.angle_bits = angle_bits;
        scratch.valid = true;

        let w = size.width as f64;
        let h = size.height as f64;
        scratch.col_terms.clear();
        scratch
            .col_terms
            .extend((0..size.width).map(|x| (x as f64 / w) * self.cos));
        scratch.row_terms.clear();
        scratch
            .row_terms
            .extend((0..size.height).map(|y| (y as f64 / h) * self.sin));
    }

    /// Cached `nx · cos` per column; call [`ensure_geometry`](Self::ensure_geometry) first.
    #[inline]
    #[must_use]
    pub fn column_terms(&self) -> &[f64] {
        &self.scratch.col_terms
    }

    /// Cached `ny · sin` per row; call [`ensure_geometry`](Self::ensure_geometry) first.
    #[inline]
    #[must_use]
    pub fn row_terms(&self) -> &[f64] {
        &self.scratch.row_terms
    }
}

impl Default for GradientField {
    fn default() -> Self {
        Self::new(ditherfx_core::config::DEFAULT_ANGLE)
    }
}

/// Per-frame oscillation offset.
#[inline]
#[must_use]
pub fn oscillation(phase: f64) -> f64 {
    phase.sin() * OSCILLATION_AMPLITUDE
}

/// Compress a projection into the central band and add the oscillation.
#[inline]
#[must_use]
pub fn compress(projection: f64, oscillation: f64) -> f64 {
    projection * BAND_SCALE + BAND_OFFSET + oscillation
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn zero_angle_is_horizontal() {
        let field = GradientField::new(0.0);
        assert!((field.projection(0.25, 0.9) - 0.25).abs() < EPS);
        assert!((field.position(0.0, 0.5, 0.0) - 0.1).abs() < EPS);
        assert!((field.position(1.0, 0.5, 0.0) - 0.9).abs() < EPS);
    }

    #[test]
    fn ninety_degrees_is_vertical() {
        let field = GradientField::new(90.0);
        assert!((field.projection(0.8, 0.3) - 0.3).abs() < EPS);
    }

    #[test]
    fn angles_outside_one_turn_are_periodic() {
        let a = GradientField::new(45.0);
        for angle in [405.0, -315.0, 45.0 + 360.0 * 7.0] {
            let b = GradientField::new(angle);
            assert!((a.projection(0.3, 0.7) - b.projection(0.3, 0.7)).abs() < 1e-9);
        }
    }

    #[test]
    fn half_turn_with_negated_phase_mirrors_the_field() {
        let phase = 1.7;
        for angle in [0.0, 33.0, 45.0, 120.0, 271.5] {
            let a = GradientField::new(angle);
            let b = GradientField::new(angle + 180.0);
            for (nx, ny) in [(0.0, 0.0), (0.2, 0.9), (0.5, 0.5), (1.0, 0.3)] {
                let pa = a.projection(nx, ny);
                let pb = b.projection(nx, ny);
                assert!((pa + pb).abs() < 1e-9, "projection sign flip at {angle}");
                let ta = a.position(nx, ny, phase) - BAND_OFFSET;
                let tb = b.position(nx, ny, -phase) - BAND_OFFSET;
                assert!((ta + tb).abs() < 1e-9, "mirrored position at {angle}");
            }
        }
    }

    #[test]
    fn oscillation_is_bounded_and_zero_at_rest() {
        assert_eq!(oscillation(0.0), 0.0);
        for i in 0..200 {
            let v = oscillation(i as f64 * 0.37);
            assert!(v.abs() <= OSCILLATION_AMPLITUDE + EPS);
        }
    }

    #[test]
    fn phase_scales_with_speed_and_time() {
        assert_eq!(oscillation_phase(0.0, 3.0), 0.0);
        assert!((oscillation_phase(16.0, 3.0) - 0.0384).abs() < EPS);
        assert_eq!(oscillation_phase(1000.0, 0.0), 0.0);
    }

    #[test]
    fn parameter_is_clamped() {
        let field = GradientField::new(0.0);
        let big_phase = std::f64::consts::FRAC_PI_2;
        // 2.0 * 0.8 + 0.1 + 0.1 overshoots the band.
        assert_eq!(field.parameter(2.0, 0.0, big_phase), 1.0);
        assert_eq!(field.parameter(-2.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn cached_terms_match_direct_projection() {
        let mut field = GradientField::new(63.0);
        let size = SurfaceSize::new(17, 9);
        field.ensure_geometry(size);
        assert_eq!(field.column_terms().len(), 17);
        assert_eq!(field.row_terms().len(), 9);
        for y in 0..size.height {
            for x in 0..size.width {
                let cached = field.column_terms()[x as usize] + field.row_terms()[y as usize];
                let direct = field.projection(x as f64 / 17.0, y as f64 / 9.0);
                assert_eq!(cached.to_bits(), direct.to_bits());
            }
        }
    }

    #[test]
    fn set_angle_invalidates_caches() {
        let mut field = GradientField::new(0.0);
        let size = SurfaceSize::new(4, 4);
        field.ensure_geometry(size);
        assert_eq!(field.row_terms(), &[0.0; 4]);
        field.set_angle(90.0);
        field.ensure_geometry(size);
        assert!((field.row_terms()[2] - 0.5).abs() < EPS);
        assert!(field.column_terms()[2].abs() < EPS);
    }
}
