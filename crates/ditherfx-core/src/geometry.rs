#![forbid(unsafe_code)]

//! Surface dimensions in device pixels.

/// Width and height of a raster surface.
///
/// Dimensions are unsigned, so a surface can never be negative; a zero
/// in either axis is an empty surface and every frame step on it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build from a host layout size in CSS/device units.
    ///
    /// Fractional sizes truncate and anything non-finite or negative maps to
    /// zero, the same coercion a canvas applies when its `width` attribute is
    /// assigned a float.
    #[must_use]
    pub fn from_layout(width: f64, height: f64) -> Self {
        Self::new(layout_dim(width), layout_dim(height))
    }

    /// Divide by a grain factor, rounding up so partial blocks still get a
    /// pixel.
    #[must_use]
    pub fn div_ceil(self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self::new(self.width.div_ceil(factor), self.height.div_ceil(factor))
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count.
    #[inline]
    #[must_use]
    pub const fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// RGBA byte length of a full frame.
    #[inline]
    #[must_use]
    pub const fn rgba_len(self) -> usize {
        self.area().saturating_mul(4)
    }
}

fn layout_dim(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    if value >= u32::MAX as f64 {
        return u32::MAX;
    }
    value as u32
}
