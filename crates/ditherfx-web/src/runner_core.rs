#![forbid(unsafe_code)]

//! Platform-independent runner core shared by the wasm exports and native
//! tests. No JS/WASM types here.
//!
//! Configuration arrives as JSON text from the page. Malformed payloads are
//! logged and ignored; out-of-domain values are logged and coerced. Nothing
//! here ever reports an error back to the page.

use std::time::Duration;

use ditherfx_core::{ConfigError, DitherConfig, NoiseConfig};
use ditherfx_render::{DitherGradientFx, NoiseSource, NoiseTextureFx, RasterFx};
use ditherfx_runtime::{FrameHandle, FrameStats, Host, RasterScheduler, SchedulerState};
use tracing::warn;

/// An effect that can be built and reconfigured from host JSON.
pub trait JsonConfigured: RasterFx + Sized {
    type Config: Default;

    fn parse_config(json: &str) -> Result<Self::Config, ConfigError>;
    fn with_config(config: Self::Config) -> Self;
    fn apply_config(&mut self, config: Self::Config);
}

impl<N: NoiseSource + Default> JsonConfigured for DitherGradientFx<N> {
    type Config = DitherConfig;

    fn parse_config(json: &str) -> Result<DitherConfig, ConfigError> {
        let config = DitherConfig::from_json(json)?;
        report_out_of_domain("dither-gradient", config.validate());
        Ok(config)
    }

    fn with_config(config: DitherConfig) -> Self {
        Self::with_noise(config, N::default())
    }

    fn apply_config(&mut self, config: DitherConfig) {
        self.set_config(config);
    }
}

impl<N: NoiseSource + Default> JsonConfigured for NoiseTextureFx<N> {
    type Config = NoiseConfig;

    fn parse_config(json: &str) -> Result<NoiseConfig, ConfigError> {
        let config = NoiseConfig::from_json(json)?;
        report_out_of_domain("noise-texture", config.validate());
        Ok(config)
    }

    fn with_config(config: NoiseConfig) -> Self {
        Self::with_noise(config, N::default())
    }

    fn apply_config(&mut self, config: NoiseConfig) {
        self.set_config(config);
    }
}

fn report_out_of_domain(fx: &'static str, result: Result<(), Vec<ConfigError>>) {
    if let Err(errors) = result {
        for err in errors {
            warn!(fx, error = %err, "config value out of domain; coercing");
        }
    }
}

/// Convert a host frame timestamp (`DOMHighResTimeStamp`, ms) into a
/// duration. Negative, NaN or overflowing stamps read as zero.
#[must_use]
pub fn duration_from_ms(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::ZERO)
}

/// One effect bound to one host.
pub struct RunnerCore<H: Host, F: RasterFx> {
    scheduler: RasterScheduler<H, F>,
}

impl<H: Host, F: JsonConfigured> RunnerCore<H, F> {
    /// Build the effect from optional JSON. Does not mount.
    pub fn new(host: H, config_json: Option<&str>) -> Self {
        let config = match config_json.map(F::parse_config) {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                warn!(error = %err, "initial config rejected; using defaults");
                F::Config::default()
            }
            None => F::Config::default(),
        };
        Self {
            scheduler: RasterScheduler::new(host, F::with_config(config)),
        }
    }

    /// Returns `false` when the environment cannot draw.
    pub fn mount(&mut self) -> bool {
        self.scheduler.mount().is_ok()
    }

    /// Replace the configuration. Returns `false` (keeping the previous
    /// configuration) for malformed JSON.
    pub fn set_config(&mut self, json: &str) -> bool {
        match F::parse_config(json) {
            Ok(config) => {
                self.scheduler.reconfigure(|fx| fx.apply_config(config));
                true
            }
            Err(err) => {
                warn!(fx = self.scheduler.fx().name(), error = %err, "config update rejected");
                false
            }
        }
    }

    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) {
        self.scheduler.on_frame(handle, duration_from_ms(timestamp_ms));
    }

    pub fn on_resize(&mut self) {
        self.scheduler.on_resize();
    }

    pub fn destroy(&mut self) {
        self.scheduler.unmount();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.state() == SchedulerState::Running
    }

    #[must_use]
    pub fn stats(&self) -> FrameStats {
        *self.scheduler.stats()
    }

    #[must_use]
    pub fn scheduler(&self) -> &RasterScheduler<H, F> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut RasterScheduler<H, F> {
        &mut self.scheduler
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.scheduler.host_mut()
    }
}
