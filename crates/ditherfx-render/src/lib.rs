#![forbid(unsafe_code)]

//! Raster kernel: frame buffer, gradient field, ordered dithering, effects.
//!
//! # Role in ditherfx
//! `ditherfx-render` is the deterministic (modulo noise) pixel engine. Each
//! call to [`RasterFx::render`] recomputes a whole [`RasterFrame`]; there is
//! no incremental or dirty-region update.
//!
//! # Primary responsibilities
//! - **RasterFrame**: RGBA byte buffer sized to the surface.
//! - **GradientField**: pixel → position along a rotated, oscillating axis.
//! - **DitherStage**: 4×4 Bayer threshold plus uniform noise, then clamp.
//! - **Effects**: [`DitherGradientFx`] and the [`NoiseTextureFx`] grain.
//!
//! # How it fits in the system
//! `ditherfx-runtime` owns the frame buffer and the animation clock and calls
//! into an effect once per scheduled frame.

pub mod dither;
pub mod field;
pub mod frame;
pub mod fx;
pub mod noise;

pub use dither::{BAYER4, DitherStage, bayer_value};
pub use field::{GradientField, oscillation_phase};
pub use frame::RasterFrame;
pub use fx::{DitherGradientFx, FxContext, NoiseTextureFx, RasterFx};
pub use noise::{FixedNoise, NoiseSource, XorShiftNoise};
