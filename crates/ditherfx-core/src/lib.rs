#![forbid(unsafe_code)]

//! Core: color model, surface geometry, and effect configuration.
//!
//! # Role in ditherfx
//! `ditherfx-core` is the leaf layer. It owns the gradient color model
//! (hex stops, smoothstep easing, three-stop interpolation), the surface size
//! type shared by the renderer and the scheduler, and the configuration
//! surface the host supplies (JSON, environment overrides, presets).
//!
//! # How it fits in the system
//! The render crate (`ditherfx-render`) turns resolved configuration into
//! pixels; the runtime (`ditherfx-runtime`) drives the render crate frame by
//! frame against a host surface. Nothing in this crate touches a surface.

pub mod color;
pub mod config;
pub mod geometry;
pub mod logging;

pub use color::{ColorParseError, GradientStops, Rgb, RgbF, smoothstep};
pub use config::{
    ConfigError, DitherConfig, DitherConfigParse, GradientPreset, Grain, NoiseConfig,
    ResolvedDither, ResolvedNoise,
};
pub use geometry::SurfaceSize;
