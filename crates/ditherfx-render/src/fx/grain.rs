#![forbid(unsafe_code)]

//! Film-grain overlay.
//!
//! Renders at `ceil(container / grain)` and leaves upscaling to the host,
//! so coarse grain is both cheaper and blockier. Every pixel is an
//! independent gray level; opacity rides in the alpha channel.

use std::time::Duration;

use ditherfx_core::{NoiseConfig, ResolvedNoise, SurfaceSize};

use super::{FxContext, RasterFx, frame_matches};
use crate::frame::{BYTES_PER_PIXEL, RasterFrame};
use crate::noise::{NoiseSource, XorShiftNoise};

#[derive(Debug, Clone)]
pub struct NoiseTextureFx<N: NoiseSource = XorShiftNoise> {
    config: NoiseConfig,
    resolved: ResolvedNoise,
    noise: N,
}

impl NoiseTextureFx<XorShiftNoise> {
    #[must_use]
    pub fn new(config: NoiseConfig) -> Self {
        Self::with_noise(config, XorShiftNoise::from_clock())
    }
}

impl Default for NoiseTextureFx<XorShiftNoise> {
    fn default() -> Self {
        Self::new(NoiseConfig::default())
    }
}

impl<N: NoiseSource> NoiseTextureFx<N> {
    #[must_use]
    pub fn with_noise(config: NoiseConfig, noise: N) -> Self {
        Self {
            resolved: config.resolved(),
            config,
            noise,
        }
    }

    pub fn set_config(&mut self, config: NoiseConfig) {
        self.resolved = config.resolved();
        tracing::debug!(
            alpha = self.resolved.alpha,
            grain_px = self.resolved.grain_px,
            animate = config.animate,
            "noise texture reconfigured"
        );
        self.config = config;
    }

    #[must_use]
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    #[must_use]
    pub fn resolved(&self) -> &ResolvedNoise {
        &self.resolved
    }
}

impl<N: NoiseSource> RasterFx for NoiseTextureFx<N> {
    fn name(&self) -> &'static str {
        "noise-texture"
    }

    fn render(&mut self, ctx: FxContext, out: &mut RasterFrame) {
        if !frame_matches(&ctx, out) {
            return;
        }
        let alpha = self.resolved.alpha;
        for px in out.as_bytes_mut().chunks_exact_mut(BYTES_PER_PIXEL) {
            let v = (self.noise.next_unit() * 255.0).round_ties_even() as u8;
            px.copy_from_slice(&[v, v, v, alpha]);
        }
    }

    fn is_animated(&self) -> bool {
        self.resolved.frame_interval.is_some()
    }

    fn frame_interval(&self) -> Option<Duration> {
        self.resolved.frame_interval
    }

    fn raster_size(&self, container: SurfaceSize) -> SurfaceSize {
        container.div_ceil(self.resolved.grain_px)
    }
}
