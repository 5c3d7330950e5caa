#![forbid(unsafe_code)]

//! Canvas bindings for ditherfx effects.
//!
//! On `wasm32` this crate exports [`DitherGradientCanvas`] and
//! [`NoiseTextureCanvas`], which mount an effect on an `HtmlCanvasElement`
//! and animate it with `requestAnimationFrame` until destroyed.
//!
//! The browser glue is thin: all behavior lives in [`runner_core`], which is
//! generic over the host and tested natively against the headless host.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{DitherGradientCanvas, NoiseTextureCanvas, WebHost};

pub mod runner_core;

pub use runner_core::{JsonConfigured, RunnerCore, duration_from_ms};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ditherfx_core::SurfaceSize;
    use ditherfx_render::{DitherGradientFx, FixedNoise, NoiseTextureFx, RasterFx};
    use ditherfx_runtime::HeadlessHost;
    use pretty_assertions::assert_eq;

    use crate::runner_core::{RunnerCore, duration_from_ms};

    type Gradient = RunnerCore<HeadlessHost, DitherGradientFx<FixedNoise>>;
    type Grain = RunnerCore<HeadlessHost, NoiseTextureFx<FixedNoise>>;

    fn host(w: u32, h: u32) -> HeadlessHost {
        HeadlessHost::new(SurfaceSize::new(w, h))
    }

    #[test]
    fn runner_core_mounts_with_default_config() {
        let mut core = Gradient::new(host(8, 8), None);
        assert!(core.mount());
        assert!(core.is_running());
        core.scheduler_mut().pump();
        assert_eq!(core.stats().frames_presented, 1);
        assert_eq!(core.scheduler().fx().config().angle, 45.0);
    }

    #[test]
    fn runner_core_reads_initial_json() {
        let core = Gradient::new(host(8, 8), Some(r##"{"angle":120,"colorFrom":"#06b6d4"}"##));
        let config = core.scheduler().fx().config();
        assert_eq!(config.angle, 120.0);
        assert_eq!(config.color_from, "#06b6d4");
        assert_eq!(config.intensity, 0.15);
    }

    #[test]
    fn runner_core_malformed_initial_json_uses_defaults() {
        let core = Gradient::new(host(8, 8), Some("not json"));
        assert_eq!(core.scheduler().fx().config().speed, 3.0);
    }

    #[test]
    fn runner_core_set_config() {
        let mut core = Gradient::new(host(4, 4), None);
        assert!(core.mount());
        assert!(core.set_config(
            r##"{"colorFrom":"#00ff00","colorMid":"#00ff00","colorTo":"#00ff00","intensity":0}"##
        ));
        core.scheduler_mut().pump();
        let frame = core.scheduler().host().last_frame().expect("presented");
        assert_eq!(frame.pixel(3, 3), Some([0, 255, 0, 255]));
    }

    #[test]
    fn runner_core_rejects_malformed_update() {
        let mut core = Gradient::new(host(4, 4), Some(r#"{"speed":7}"#));
        assert!(core.mount());
        assert!(!core.set_config("{"));
        assert_eq!(core.scheduler().fx().config().speed, 7.0);
    }

    #[test]
    fn runner_core_unsupported_environment_is_silent() {
        let mut core = Gradient::new(HeadlessHost::unsupported(), None);
        assert!(!core.mount());
        assert!(!core.is_running());
        assert_eq!(core.scheduler_mut().pump(), 0);
    }

    #[test]
    fn runner_core_destroy_is_idempotent() {
        let mut core = Gradient::new(host(4, 4), None);
        assert!(core.mount());
        core.destroy();
        core.destroy();
        assert!(!core.is_running());
        assert_eq!(core.scheduler().host().queued(), 0);
    }

    #[test]
    fn runner_core_frame_callback_uses_handle() {
        let mut core = Gradient::new(host(4, 4), None);
        assert!(core.mount());
        let handle = core.scheduler().pending_frame().expect("pending");
        core.host_mut().drain_queue();
        core.on_frame(handle, 16.7);
        assert_eq!(core.stats().frames_presented, 1);
        // Same handle again is stale.
        core.on_frame(handle, 33.4);
        assert_eq!(core.stats().frames_presented, 1);
    }

    #[test]
    fn runner_core_resize_callback() {
        let mut core = Gradient::new(host(4, 4), None);
        assert!(core.mount());
        core.host_mut().set_container_size(SurfaceSize::new(9, 3));
        core.on_resize();
        core.scheduler_mut().pump();
        assert_eq!(core.stats().last_size, SurfaceSize::new(9, 3));
    }

    #[test]
    fn runner_core_grain_config() {
        let mut core = Grain::new(host(40, 40), Some(r#"{"grain":"coarse","animate":false}"#));
        assert!(core.mount());
        assert!(!core.scheduler().fx().is_animated());
        core.scheduler_mut().pump();
        assert_eq!(core.stats().last_size, SurfaceSize::new(10, 10));
        assert_eq!(core.scheduler().host().queued(), 0);
    }

    #[test]
    fn runner_core_grain_survives_vanishing_speed() {
        let mut core = Grain::new(host(20, 20), None);
        assert!(core.mount());
        core.scheduler_mut().pump();
        assert!(core.set_config(r#"{"speed":1e-300,"grain":"huge"}"#));
        core.scheduler_mut().pump_n(3);
        assert!(core.is_running());
        assert_eq!(core.stats().frames_presented, 2);
        assert_eq!(core.stats().last_size, SurfaceSize::new(10, 10));
    }

    #[test]
    fn timestamps_convert_safely() {
        assert_eq!(duration_from_ms(16.0), Duration::from_millis(16));
        assert_eq!(duration_from_ms(-5.0), Duration::ZERO);
        assert_eq!(duration_from_ms(f64::NAN), Duration::ZERO);
        assert_eq!(duration_from_ms(f64::INFINITY), Duration::ZERO);
    }
}
