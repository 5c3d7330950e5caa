#![forbid(unsafe_code)]

//! Host-driven frame scheduling for ditherfx effects.
//!
//! # Role in ditherfx
//! `ditherfx-runtime` owns everything between "the host has a canvas" and
//! "an effect fills a frame": mount and teardown, resize handling, the
//! nominal animation clock, throttling, and the one-pending-callback
//! discipline that keeps late callbacks from drawing after unmount.
//!
//! # Primary responsibilities
//! - **Host traits**: [`DrawSurface`], [`ResizeObserver`], [`FrameScheduler`].
//! - **RasterScheduler**: the Unmounted → Running → Disposed state machine.
//! - **HeadlessHost**: an in-memory host with a manually pumped frame queue.
//!
//! # How it fits in the system
//! `ditherfx-web` implements [`Host`] on top of the browser and forwards
//! `requestAnimationFrame` and `resize` callbacks into a scheduler. Tests use
//! [`HeadlessHost`] instead.

pub mod headless;
pub mod host;
pub mod scheduler;

pub use headless::HeadlessHost;
pub use host::{DrawSurface, FrameHandle, FrameScheduler, Host, HostError, ResizeObserver};
pub use scheduler::{AnimationState, FrameStats, RasterScheduler, SchedulerState, TIME_STEP_MS};
