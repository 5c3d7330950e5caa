#![forbid(unsafe_code)]

//! Animated three-stop gradient with ordered dithering.
//!
//! Per frame: one oscillation value, then for every pixel a position along
//! the rotated axis, a two-segment smoothstep color, and a Bayer + noise
//! offset shared by all three channels. Alpha is always opaque.

use ditherfx_core::{DitherConfig, ResolvedDither};

use super::{FxContext, RasterFx, frame_matches};
use crate::dither::DitherStage;
use crate::field::{GradientField, compress, oscillation, oscillation_phase};
use crate::frame::{BYTES_PER_PIXEL, RasterFrame};
use crate::noise::{NoiseSource, XorShiftNoise};

/// Dithered gradient backdrop.
#[derive(Debug, Clone)]
pub struct DitherGradientFx<N: NoiseSource = XorShiftNoise> {
    config: DitherConfig,
    resolved: ResolvedDither,
    field: GradientField,
    stage: DitherStage,
    noise: N,
}

impl DitherGradientFx<XorShiftNoise> {
    /// Clock-seeded noise.
    #[must_use]
    pub fn new(config: DitherConfig) -> Self {
        Self::with_noise(config, XorShiftNoise::from_clock())
    }
}

impl Default for DitherGradientFx<XorShiftNoise> {
    fn default() -> Self {
        Self::new(DitherConfig::default())
    }
}

impl<N: NoiseSource> DitherGradientFx<N> {
    #[must_use]
    pub fn with_noise(config: DitherConfig, noise: N) -> Self {
        let resolved = config.resolved();
        Self {
            field: GradientField::new(resolved.angle),
            stage: DitherStage::new(resolved.intensity),
            resolved,
            config,
            noise,
        }
    }

    /// Swap the configuration. Takes effect on the next rendered frame;
    /// the animation clock is not reset.
    pub fn set_config(&mut self, config: DitherConfig) {
        let resolved = config.resolved();
        self.field.set_angle(resolved.angle);
        self.stage = DitherStage::new(resolved.intensity);
        self.resolved = resolved;
        tracing::debug!(summary = %config.summary_short(), "dither gradient reconfigured");
        self.config = config;
    }

    #[must_use]
    pub fn config(&self) -> &DitherConfig {
        &self.config
    }

    #[must_use]
    pub fn resolved(&self) -> &ResolvedDither {
        &self.resolved
    }

    pub fn noise_mut(&mut self) -> &mut N {
        &mut self.noise
    }
}

impl<N: NoiseSource> RasterFx for DitherGradientFx<N> {
    fn name(&self) -> &'static str {
        "dither-gradient"
    }

    fn render(&mut self, ctx: FxContext, out: &mut RasterFrame) {
        if !frame_matches(&ctx, out) {
            return;
        }

        let osc = oscillation(oscillation_phase(ctx.elapsed_ms, self.resolved.speed));
        self.field.ensure_geometry(ctx.size);

        let stops = self.resolved.stops;
        let stage = self.stage;
        let passthrough = stage.is_passthrough();
        let stride = ctx.size.width as usize * BYTES_PER_PIXEL;
        let col_terms = self.field.column_terms();
        let row_terms = self.field.row_terms();
        let noise = &mut self.noise;

        for (y, (row, &row_term)) in out
            .as_bytes_mut()
            .chunks_exact_mut(stride)
            .zip(row_terms)
            .enumerate()
        {
            for (x, (px, &col_term)) in row
                .chunks_exact_mut(BYTES_PER_PIXEL)
                .zip(col_terms)
                .enumerate()
            {
                let t = compress(col_term + row_term, osc).clamp(0.0, 1.0);
                let base = stops.sample(t);
                let [r, g, b] = if passthrough {
                    base.to_bytes()
                } else {
                    stage.apply(base, x as u32, y as u32, noise.next_unit())
                };
                px.copy_from_slice(&[r, g, b, 255]);
            }
        }
    }
}
