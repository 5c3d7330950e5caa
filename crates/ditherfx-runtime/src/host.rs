#![forbid(unsafe_code)]

//! Host collaborator contract.
//!
//! The scheduler never touches a platform API directly. A host supplies
//! three capabilities:
//!
//! - [`DrawSurface`]: a drawing context plus the container it fills
//! - [`ResizeObserver`]: notification when the container changes size
//! - [`FrameScheduler`]: a per-paint callback primitive with cancellation
//!
//! Hosts call back into the scheduler with
//! [`RasterScheduler::on_frame`](crate::RasterScheduler::on_frame) and
//! [`RasterScheduler::on_resize`](crate::RasterScheduler::on_resize).

use std::fmt;

use ditherfx_core::SurfaceSize;
use ditherfx_render::RasterFrame;

/// Token for one pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Host-side failures. Never surfaced to the embedding page; the scheduler
/// logs them and stops drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No drawing context (unsupported environment or detached surface).
    ContextUnavailable,
    /// The scheduler was already torn down.
    Disposed,
    /// Presenting a frame or scheduling the next one failed.
    Present(String),
    /// Resize observation could not be attached.
    Observer(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextUnavailable => write!(f, "drawing context unavailable"),
            Self::Disposed => write!(f, "scheduler already disposed"),
            Self::Present(msg) => write!(f, "present failed: {msg}"),
            Self::Observer(msg) => write!(f, "resize observer failed: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Mountable drawing surface.
pub trait DrawSurface {
    /// Acquire the drawing context. Called once per mount.
    fn acquire(&mut self) -> Result<(), HostError>;

    /// Current container size in device pixels.
    fn container_size(&self) -> SurfaceSize;

    /// Show `frame`, resizing the backing surface to the frame's size if
    /// needed.
    fn present(&mut self, frame: &RasterFrame) -> Result<(), HostError>;
}

/// Container size notifications.
pub trait ResizeObserver {
    fn observe(&mut self) -> Result<(), HostError>;
    fn unobserve(&mut self);
}

/// Per-paint callback primitive (`requestAnimationFrame` on the web).
pub trait FrameScheduler {
    /// Ask for one callback on the next paint.
    fn request_frame(&mut self) -> Result<FrameHandle, HostError>;

    /// Revoke a pending callback. Unknown or fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Everything the scheduler needs from its environment.
pub trait Host: DrawSurface + ResizeObserver + FrameScheduler {}

impl<T: DrawSurface + ResizeObserver + FrameScheduler> Host for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_display() {
        assert_eq!(
            HostError::Present("quota".into()).to_string(),
            "present failed: quota"
        );
        assert_eq!(
            HostError::ContextUnavailable.to_string(),
            "drawing context unavailable"
        );
    }

    #[test]
    fn handles_order_by_sequence() {
        assert!(FrameHandle(1) < FrameHandle(2));
    }
}
