#![forbid(unsafe_code)]

//! Full-frame raster effects.
//!
//! An effect owns its configuration and any per-size caches; the caller
//! owns the [`RasterFrame`] and the clock. Every call to
//! [`RasterFx::render`] overwrites the whole frame.

use std::time::Duration;

use ditherfx_core::SurfaceSize;

use crate::frame::RasterFrame;

mod gradient;
mod grain;

pub use gradient::DitherGradientFx;
pub use grain::NoiseTextureFx;

/// Per-frame inputs handed to an effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxContext {
    /// Raster size (after any downscale); matches the target frame.
    pub size: SurfaceSize,
    /// Number of frames presented before this one.
    pub frame: u64,
    /// Nominal animation time in milliseconds.
    pub elapsed_ms: f64,
    /// Host timestamp of the frame callback.
    pub now: Duration,
}

impl FxContext {
    #[must_use]
    pub const fn new(size: SurfaceSize, frame: u64, elapsed_ms: f64, now: Duration) -> Self {
        Self {
            size,
            frame,
            elapsed_ms,
            now,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Expected RGBA byte length of the target frame.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size.rgba_len()
    }
}

/// A full-frame effect driven by the frame scheduler.
pub trait RasterFx {
    /// Stable name for logs and spans.
    fn name(&self) -> &'static str;

    /// Overwrite `out` with one frame. Implementations must leave `out`
    /// untouched when `ctx` is empty or its size does not match `out`.
    fn render(&mut self, ctx: FxContext, out: &mut RasterFrame);

    /// `false` for effects that render once per size and then idle.
    fn is_animated(&self) -> bool {
        true
    }

    /// Minimum time between presented frames; `None` renders on every
    /// host frame.
    fn frame_interval(&self) -> Option<Duration> {
        None
    }

    /// Raster size for a given container size.
    fn raster_size(&self, container: SurfaceSize) -> SurfaceSize {
        container
    }
}

impl<F: RasterFx + ?Sized> RasterFx for Box<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&mut self, ctx: FxContext, out: &mut RasterFrame) {
        (**self).render(ctx, out);
    }

    fn is_animated(&self) -> bool {
        (**self).is_animated()
    }

    fn frame_interval(&self) -> Option<Duration> {
        (**self).frame_interval()
    }

    fn raster_size(&self, container: SurfaceSize) -> SurfaceSize {
        (**self).raster_size(container)
    }
}

/// `true` when the frame can accept a render for `ctx`.
#[inline]
pub(crate) fn frame_matches(ctx: &FxContext, out: &RasterFrame) -> bool {
    !ctx.is_empty() && out.size() == ctx.size && out.len() == ctx.len()
}
