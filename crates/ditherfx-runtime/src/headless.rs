#![forbid(unsafe_code)]

//! In-memory host for deterministic tests and offline rendering.
//!
//! Frame callbacks queue up until the test pumps them, so every frame is
//! driven explicitly:
//!
//! ```text
//! mount() → pump() → frame presented → pump() → ...
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use ditherfx_core::SurfaceSize;
use ditherfx_render::{RasterFrame, RasterFx};

use crate::host::{DrawSurface, FrameHandle, FrameScheduler, HostError, ResizeObserver};
use crate::scheduler::{RasterScheduler, TIME_STEP_MS};

/// Headless [`Host`](crate::Host) with a manual frame queue.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    container: SurfaceSize,
    acquired: bool,
    observing: bool,
    fail_acquire: bool,
    fail_present: bool,
    // Deliver cancelled callbacks anyway (late rAF after cancel).
    leak_cancelled: bool,
    next_handle: u64,
    queue: VecDeque<FrameHandle>,
    clock: Duration,
    presents: u64,
    last_frame: Option<RasterFrame>,
}

impl HeadlessHost {
    #[must_use]
    pub fn new(container: SurfaceSize) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    /// Host without a drawing context.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            fail_acquire: true,
            ..Self::default()
        }
    }

    /// Make every subsequent `present` fail.
    pub fn set_fail_present(&mut self, fail: bool) {
        self.fail_present = fail;
    }

    /// Keep cancelled callbacks in the queue so they still fire.
    pub fn set_leak_cancelled(&mut self, leak: bool) {
        self.leak_cancelled = leak;
    }

    /// Change the container size without notifying anyone.
    pub fn set_container_size(&mut self, size: SurfaceSize) {
        self.container = size;
    }

    #[must_use]
    pub const fn is_observing(&self) -> bool {
        self.observing
    }

    #[must_use]
    pub const fn is_acquired(&self) -> bool {
        self.acquired
    }

    /// Number of successful presents.
    #[must_use]
    pub const fn presents(&self) -> u64 {
        self.presents
    }

    /// Copy of the most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&RasterFrame> {
        self.last_frame.as_ref()
    }

    /// Callbacks waiting to fire.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    /// Remove and return every queued callback.
    pub fn drain_queue(&mut self) -> Vec<FrameHandle> {
        self.queue.drain(..).collect()
    }
}

impl DrawSurface for HeadlessHost {
    fn acquire(&mut self) -> Result<(), HostError> {
        if self.fail_acquire {
            return Err(HostError::ContextUnavailable);
        }
        self.acquired = true;
        Ok(())
    }

    fn container_size(&self) -> SurfaceSize {
        self.container
    }

    fn present(&mut self, frame: &RasterFrame) -> Result<(), HostError> {
        if !self.acquired {
            return Err(HostError::ContextUnavailable);
        }
        if self.fail_present {
            return Err(HostError::Present("headless present disabled".into()));
        }
        self.presents += 1;
        match &mut self.last_frame {
            Some(last) => last.clone_from(frame),
            None => self.last_frame = Some(frame.clone()),
        }
        Ok(())
    }
}

impl ResizeObserver for HeadlessHost {
    fn observe(&mut self) -> Result<(), HostError> {
        self.observing = true;
        Ok(())
    }

    fn unobserve(&mut self) {
        self.observing = false;
    }
}

impl FrameScheduler for HeadlessHost {
    fn request_frame(&mut self) -> Result<FrameHandle, HostError> {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.queue.push_back(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if !self.leak_cancelled {
            self.queue.retain(|&h| h != handle);
        }
    }
}

impl<F: RasterFx> RasterScheduler<HeadlessHost, F> {
    /// Fire every queued callback at the current headless clock, then
    /// advance the clock by one nominal frame. Returns the number of
    /// callbacks delivered.
    pub fn pump(&mut self) -> usize {
        let now = self.host().clock;
        let due = self.host_mut().drain_queue();
        for &handle in &due {
            self.on_frame(handle, now);
        }
        self.host_mut().clock += Duration::from_secs_f64(TIME_STEP_MS / 1000.0);
        due.len()
    }

    /// Pump `n` times.
    pub fn pump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.pump();
        }
    }

    /// Advance the headless clock without delivering callbacks.
    pub fn advance_clock(&mut self, by: Duration) {
        self.host_mut().clock += by;
    }

    /// Resize the container and, if observed, notify the scheduler.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.host_mut().set_container_size(size);
        if self.host().is_observing() {
            self.on_resize();
        }
    }
}
