#![forbid(unsafe_code)]

//! Effect configuration.
//!
//! The host hands configuration over as a JSON object whose fields are all
//! optional (missing fields take their defaults). Values are never rejected:
//! [`DitherConfig::validate`] reports what is out of domain, and
//! [`DitherConfig::resolved`] coerces everything into something renderable.
//!
//! # Environment Variables
//! - `DITHERFX_PRESET` = default|ocean-forest|sunset-fire (applied first)
//! - `DITHERFX_COLOR_FROM` / `DITHERFX_COLOR_MID` / `DITHERFX_COLOR_TO` (hex)
//! - `DITHERFX_INTENSITY` (f64, 0..=1)
//! - `DITHERFX_SPEED` (f64)
//! - `DITHERFX_ANGLE` (f64, degrees)

use std::env;
use std::fmt;
use std::time::Duration;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::color::{GradientStops, Rgb};

pub const DEFAULT_COLOR_FROM: &str = "#4f46e5";
pub const DEFAULT_COLOR_MID: &str = "#a855f7";
pub const DEFAULT_COLOR_TO: &str = "#ec4899";
pub const DEFAULT_INTENSITY: f64 = 0.15;
pub const DEFAULT_SPEED: f64 = 3.0;
pub const DEFAULT_ANGLE: f64 = 45.0;

pub const DEFAULT_NOISE_OPACITY: f64 = 0.15;
pub const DEFAULT_NOISE_SPEED: f64 = 10.0;

const ENV_PRESET: &str = "DITHERFX_PRESET";
const ENV_COLOR_FROM: &str = "DITHERFX_COLOR_FROM";
const ENV_COLOR_MID: &str = "DITHERFX_COLOR_MID";
const ENV_COLOR_TO: &str = "DITHERFX_COLOR_TO";
const ENV_INTENSITY: &str = "DITHERFX_INTENSITY";
const ENV_SPEED: &str = "DITHERFX_SPEED";
const ENV_ANGLE: &str = "DITHERFX_ANGLE";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Malformed JSON payload.
    Json(String),
    /// A field with an out-of-domain or unparsable value.
    Field {
        field: &'static str,
        value: String,
        message: String,
    },
}

impl ConfigError {
    fn field(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::Field {
                field,
                value,
                message,
            } => write!(f, "{field}={value} ({message})"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Dither gradient
// ---------------------------------------------------------------------------

/// Dither gradient configuration, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DitherConfig {
    pub color_from: String,
    pub color_mid: String,
    pub color_to: String,
    pub intensity: f64,
    pub speed: f64,
    pub angle: f64,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            color_from: DEFAULT_COLOR_FROM.to_owned(),
            color_mid: DEFAULT_COLOR_MID.to_owned(),
            color_to: DEFAULT_COLOR_TO.to_owned(),
            intensity: DEFAULT_INTENSITY,
            speed: DEFAULT_SPEED,
            angle: DEFAULT_ANGLE,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct DitherConfigParse {
    pub config: DitherConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration coerced into renderable values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDither {
    pub from: Rgb,
    pub mid: Rgb,
    pub to: Rgb,
    pub stops: GradientStops,
    /// Clamped to `[0, 1]`.
    pub intensity: f64,
    pub speed: f64,
    /// Degrees, unreduced.
    pub angle: f64,
}

impl DitherConfig {
    /// Parse the host's JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> DitherConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config through a custom lookup (tests inject a map here).
    pub fn from_env_with<F>(mut get: F) -> DitherConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = get(ENV_PRESET) {
            match GradientPreset::parse(&value) {
                Some(preset) => config = preset.config(),
                None => errors.push(ConfigError::field(
                    "preset",
                    value,
                    "expected default|ocean-forest|sunset-fire",
                )),
            }
        }

        for (key, field, slot) in [
            (ENV_COLOR_FROM, "color_from", &mut config.color_from),
            (ENV_COLOR_MID, "color_mid", &mut config.color_mid),
            (ENV_COLOR_TO, "color_to", &mut config.color_to),
        ] {
            if let Some(value) = get(key) {
                match Rgb::from_hex(&value) {
                    Ok(_) => *slot = value,
                    Err(err) => errors.push(ConfigError::field(field, value, err.to_string())),
                }
            }
        }

        for (key, field, slot) in [
            (ENV_INTENSITY, "intensity", &mut config.intensity),
            (ENV_SPEED, "speed", &mut config.speed),
            (ENV_ANGLE, "angle", &mut config.angle),
        ] {
            if let Some(value) = get(key) {
                match parse_f64(&value) {
                    Some(parsed) => *slot = parsed,
                    None => errors.push(ConfigError::field(field, value, "expected finite number")),
                }
            }
        }

        if let Err(mut invalid) = config.validate() {
            errors.append(&mut invalid);
        }

        DitherConfigParse { config, errors }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_color("color_from", &self.color_from, &mut errors);
        validate_color("color_mid", &self.color_mid, &mut errors);
        validate_color("color_to", &self.color_to, &mut errors);
        validate_unit("intensity", self.intensity, &mut errors);
        validate_finite("speed", self.speed, &mut errors);
        validate_finite("angle", self.angle, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Coerce into renderable values: malformed stops become black,
    /// intensity is clamped to `[0, 1]`, non-finite numbers take defaults.
    #[must_use]
    pub fn resolved(&self) -> ResolvedDither {
        let from = Rgb::from_hex_or_black(&self.color_from);
        let mid = Rgb::from_hex_or_black(&self.color_mid);
        let to = Rgb::from_hex_or_black(&self.color_to);
        ResolvedDither {
            from,
            mid,
            to,
            stops: GradientStops::new(from, mid, to),
            intensity: finite_or(self.intensity, DEFAULT_INTENSITY).clamp(0.0, 1.0),
            speed: finite_or(self.speed, DEFAULT_SPEED),
            angle: finite_or(self.angle, DEFAULT_ANGLE),
        }
    }

    /// Short human-readable summary for debug overlays and logs.
    #[must_use]
    pub fn summary_short(&self) -> String {
        format!(
            "dither: {} → {} → {} · i={} · v={} · {}°",
            self.color_from, self.color_mid, self.color_to, self.intensity, self.speed, self.angle
        )
    }
}

/// Named gradient presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GradientPreset {
    /// Indigo → violet → pink.
    #[default]
    Default,
    /// Cyan → emerald → lime.
    OceanForest,
    /// Orange → red → rose, hotter and faster.
    SunsetFire,
}

impl GradientPreset {
    pub const ALL: [Self; 3] = [Self::Default, Self::OceanForest, Self::SunsetFire];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "ocean-forest" | "ocean_forest" | "oceanforest" => Some(Self::OceanForest),
            "sunset-fire" | "sunset_fire" | "sunsetfire" => Some(Self::SunsetFire),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::OceanForest => "ocean-forest",
            Self::SunsetFire => "sunset-fire",
        }
    }

    #[must_use]
    pub fn config(self) -> DitherConfig {
        match self {
            Self::Default => DitherConfig::default(),
            Self::OceanForest => DitherConfig {
                color_from: "#06b6d4".to_owned(),
                color_mid: "#10b981".to_owned(),
                color_to: "#84cc16".to_owned(),
                ..DitherConfig::default()
            },
            Self::SunsetFire => DitherConfig {
                color_from: "#f97316".to_owned(),
                color_mid: "#ef4444".to_owned(),
                color_to: "#be185d".to_owned(),
                intensity: 0.2,
                speed: 4.0,
                angle: 120.0,
            },
        }
    }
}

impl fmt::Display for GradientPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Noise texture
// ---------------------------------------------------------------------------

/// Grain size of the noise texture, in device pixels per noise sample.
///
/// Deserializes leniently: unknown names (or non-string values) read as
/// [`Grain::Medium`] so the rest of the payload still applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grain {
    Fine,
    #[default]
    Medium,
    Coarse,
}

impl Grain {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fine" => Some(Self::Fine),
            "medium" => Some(Self::Medium),
            "coarse" => Some(Self::Coarse),
            _ => None,
        }
    }

    #[must_use]
    pub fn parse_or_medium(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            warn!(value, "unknown grain; using medium");
            Self::Medium
        })
    }

    #[must_use]
    pub const fn pixel_size(self) -> u32 {
        match self {
            Self::Fine => 1,
            Self::Medium => 2,
            Self::Coarse => 4,
        }
    }
}

impl<'de> Deserialize<'de> for Grain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Other(IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Name(name) => Self::parse_or_medium(&name),
            Raw::Other(_) => {
                warn!("non-string grain; using medium");
                Self::Medium
            }
        })
    }
}

/// Animated film-grain texture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoiseConfig {
    /// Output alpha in `[0, 1]`.
    pub opacity: f64,
    /// Frames per second while animating.
    pub speed: f64,
    pub grain: Grain,
    pub animate: bool,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_NOISE_OPACITY,
            speed: DEFAULT_NOISE_SPEED,
            grain: Grain::Medium,
            animate: true,
        }
    }
}

/// Noise configuration coerced into renderable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedNoise {
    pub alpha: u8,
    pub grain_px: u32,
    /// `None` when the texture is static.
    pub frame_interval: Option<Duration>,
}

impl NoiseConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_unit("opacity", self.opacity, &mut errors);
        if !(self.speed.is_finite() && self.speed > 0.0) {
            errors.push(ConfigError::field(
                "speed",
                self.speed.to_string(),
                "expected positive frames per second",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    #[must_use]
    pub fn resolved(&self) -> ResolvedNoise {
        let opacity = finite_or(self.opacity, DEFAULT_NOISE_OPACITY).clamp(0.0, 1.0);
        let speed = if self.speed.is_finite() && self.speed > 0.0 {
            self.speed
        } else {
            DEFAULT_NOISE_SPEED
        };
        ResolvedNoise {
            alpha: (opacity * 255.0).round() as u8,
            grain_px: self.grain.pixel_size(),
            // Vanishing rates overflow `Duration`; saturate to "never again".
            frame_interval: self.animate.then(|| {
                Duration::try_from_secs_f64(1.0 / speed).unwrap_or(Duration::MAX)
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn validate_color(field: &'static str, value: &str, errors: &mut Vec<ConfigError>) {
    if let Err(err) = Rgb::from_hex(value) {
        errors.push(ConfigError::field(field, value, err.to_string()));
    }
}

fn validate_unit(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::field(
            field,
            value.to_string(),
            "expected value in [0, 1]",
        ));
    }
}

fn validate_finite(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !value.is_finite() {
        errors.push(ConfigError::field(
            field,
            value.to_string(),
            "expected finite number",
        ));
    }
}
