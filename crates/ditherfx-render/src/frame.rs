#![forbid(unsafe_code)]

//! RGBA frame buffer.

use ditherfx_core::SurfaceSize;

/// Bytes per pixel (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Full-frame RGBA byte buffer, row-major, no padding.
///
/// The layout matches a canvas `ImageData` payload so the host can present
/// it without conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RasterFrame {
    size: SurfaceSize,
    data: Vec<u8>,
}

impl RasterFrame {
    /// Allocate a zeroed (transparent black) frame.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            data: vec![0; size.rgba_len()],
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> SurfaceSize {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.height
    }

    /// Byte length (`width * height * 4`).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Replace the backing storage with a fresh buffer of `size`.
    ///
    /// Always reallocates: a resized surface never sees bytes from the
    /// previous geometry.
    pub fn reallocate(&mut self, size: SurfaceSize) {
        self.size = size;
        self.data = vec![0; size.rgba_len()];
    }

    /// Reallocate only if the geometry differs. Returns `true` if it did.
    pub fn ensure_size(&mut self, size: SurfaceSize) -> bool {
        if self.size == size && self.data.len() == size.rgba_len() {
            return false;
        }
        self.reallocate(size);
        true
    }

    /// Read one pixel, `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.data.get(idx..idx + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Fill every pixel with one RGBA value.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }
}
