#![forbid(unsafe_code)]

//! Raster scheduler: mount, resize, per-frame step, teardown.
//!
//! ```text
//! Unmounted ──mount ok──▶ Running ──unmount / host failure──▶ Disposed
//!     │                                                           ▲
//!     └───────────────────────────unmount─────────────────────────┘
//! ```
//!
//! The scheduler is single-threaded and cooperative: the host delivers
//! frame and resize callbacks between frames, never during one. Exactly one
//! frame callback is pending while Running; its handle is the only one
//! [`on_frame`](RasterScheduler::on_frame) accepts, so a callback that
//! slips past cancellation can never write.

use std::time::Duration;

use ditherfx_core::SurfaceSize;
use ditherfx_render::{FxContext, RasterFrame, RasterFx};
use tracing::{debug, info_span, trace, warn};

use crate::host::{FrameHandle, Host, HostError};

/// Nominal animation time added per presented frame (ms).
pub const TIME_STEP_MS: f64 = 16.0;

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Not yet mounted, or the last mount attempt failed.
    #[default]
    Unmounted,
    Running,
    /// Torn down. Terminal.
    Disposed,
}

/// Clock and geometry owned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationState {
    /// Nominal milliseconds; advances by [`TIME_STEP_MS`] per presented frame.
    pub elapsed_ms: f64,
    /// Raster size (after the effect's downscale).
    pub size: SurfaceSize,
    /// Frames presented so far.
    pub frame: u64,
}

/// Observable counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub frames_presented: u64,
    /// Callbacks that ran but presented nothing (zero area or throttled).
    pub frames_skipped: u64,
    pub last_size: SurfaceSize,
}

/// Drives one [`RasterFx`] against one [`Host`].
#[derive(Debug)]
pub struct RasterScheduler<H: Host, F: RasterFx> {
    host: H,
    fx: F,
    state: SchedulerState,
    anim: AnimationState,
    frame: RasterFrame,
    pending: Option<FrameHandle>,
    last_present: Option<Duration>,
    // Set by mount/resize/reconfigure; cleared once a frame is presented.
    dirty: bool,
    stats: FrameStats,
}

impl<H: Host, F: RasterFx> RasterScheduler<H, F> {
    /// Create an unmounted scheduler. Nothing touches the host until
    /// [`mount`](Self::mount).
    pub fn new(host: H, fx: F) -> Self {
        Self {
            host,
            fx,
            state: SchedulerState::Unmounted,
            anim: AnimationState::default(),
            frame: RasterFrame::default(),
            pending: None,
            last_present: None,
            dirty: false,
            stats: FrameStats::default(),
        }
    }

    /// Acquire the drawing context, size the buffer, start observing the
    /// container and request the first frame.
    ///
    /// On failure the scheduler stays [`Unmounted`](SchedulerState::Unmounted)
    /// and nothing is drawn.
    pub fn mount(&mut self) -> Result<(), HostError> {
        match self.state {
            SchedulerState::Running => return Ok(()),
            SchedulerState::Disposed => return Err(HostError::Disposed),
            SchedulerState::Unmounted => {}
        }

        if let Err(err) = self.host.acquire() {
            debug!(fx = self.fx.name(), error = %err, "mount skipped");
            return Err(err);
        }
        if let Err(err) = self.host.observe() {
            debug!(fx = self.fx.name(), error = %err, "mount skipped");
            return Err(err);
        }

        self.state = SchedulerState::Running;
        self.apply_size(self.host.container_size(), true);
        debug!(
            fx = self.fx.name(),
            width = self.anim.size.width,
            height = self.anim.size.height,
            "mounted"
        );
        self.schedule();
        Ok(())
    }

    /// Container resized: recompute the raster size and reallocate the
    /// buffer. The next frame uses the new dimensions.
    pub fn on_resize(&mut self) {
        if self.state != SchedulerState::Running {
            return;
        }
        self.apply_size(self.host.container_size(), true);
        debug!(
            fx = self.fx.name(),
            width = self.anim.size.width,
            height = self.anim.size.height,
            "resized"
        );
        if self.pending.is_none() {
            self.schedule();
        }
    }

    /// Host frame callback. `now` is the host's frame timestamp.
    ///
    /// Ignored unless `handle` is the one pending callback.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) {
        if self.state != SchedulerState::Running || self.pending != Some(handle) {
            trace!(handle = handle.0, "stale frame callback ignored");
            return;
        }
        self.pending = None;
        self.step_frame(now);
    }

    /// Apply a change to the effect. Takes effect on the next frame; the
    /// animation clock keeps running.
    pub fn reconfigure(&mut self, update: impl FnOnce(&mut F)) {
        update(&mut self.fx);
        if self.state != SchedulerState::Running {
            return;
        }
        // A grain change alters the raster size without a container resize.
        self.apply_size(self.host.container_size(), false);
        self.dirty = true;
        if self.pending.is_none() {
            self.schedule();
        }
    }

    /// Cancel the pending frame and detach from the container. Idempotent;
    /// the scheduler cannot be mounted again.
    pub fn unmount(&mut self) {
        match self.state {
            SchedulerState::Disposed => return,
            SchedulerState::Running => {
                if let Some(handle) = self.pending.take() {
                    self.host.cancel_frame(handle);
                }
                self.host.unobserve();
            }
            SchedulerState::Unmounted => {}
        }
        self.state = SchedulerState::Disposed;
        debug!(
            fx = self.fx.name(),
            frames = self.stats.frames_presented,
            "unmounted"
        );
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub const fn animation(&self) -> &AnimationState {
        &self.anim
    }

    #[must_use]
    pub const fn stats(&self) -> &FrameStats {
        &self.stats
    }

    #[must_use]
    pub const fn frame(&self) -> &RasterFrame {
        &self.frame
    }

    #[must_use]
    pub const fn fx(&self) -> &F {
        &self.fx
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Handle of the pending frame callback, if any.
    #[must_use]
    pub const fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    // -- internals ----------------------------------------------------------

    fn apply_size(&mut self, container: SurfaceSize, force_realloc: bool) {
        let size = self.fx.raster_size(container);
        self.anim.size = size;
        if force_realloc {
            self.frame.reallocate(size);
        } else {
            self.frame.ensure_size(size);
        }
        self.dirty = true;
    }

    fn step_frame(&mut self, now: Duration) {
        let animated = self.fx.is_animated();

        if self.anim.size.is_empty() {
            // Zero area: keep polling until a positive resize.
            self.stats.frames_skipped += 1;
            trace!(fx = self.fx.name(), "zero-area frame skipped");
            if animated {
                self.schedule();
            }
            return;
        }

        if !self.dirty
            && let (Some(interval), Some(last)) = (self.fx.frame_interval(), self.last_present)
            && now.saturating_sub(last) < interval
        {
            self.stats.frames_skipped += 1;
            self.schedule();
            return;
        }

        if !animated && !self.dirty {
            return;
        }

        let size = self.anim.size;
        let _span = info_span!(
            "render_frame",
            fx = self.fx.name(),
            width = size.width,
            height = size.height,
            frame = self.anim.frame
        )
        .entered();

        let ctx = FxContext::new(size, self.anim.frame, self.anim.elapsed_ms, now);
        self.fx.render(ctx, &mut self.frame);

        if let Err(err) = self.host.present(&self.frame) {
            warn!(fx = self.fx.name(), error = %err, "present failed; halting");
            self.halt();
            return;
        }

        self.anim.elapsed_ms += TIME_STEP_MS;
        self.anim.frame += 1;
        self.last_present = Some(now);
        self.dirty = false;
        self.stats.frames_presented += 1;
        self.stats.last_size = size;

        if animated {
            self.schedule();
        }
    }

    fn schedule(&mut self) {
        match self.host.request_frame() {
            Ok(handle) => self.pending = Some(handle),
            Err(err) => {
                warn!(fx = self.fx.name(), error = %err, "frame request failed; halting");
                self.halt();
            }
        }
    }

    fn halt(&mut self) {
        self.unmount();
    }
}

impl<H: Host, F: RasterFx> Drop for RasterScheduler<H, F> {
    fn drop(&mut self) {
        self.unmount();
    }
}
