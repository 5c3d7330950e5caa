#![forbid(unsafe_code)]

//! Gradient color model.
//!
//! Stops arrive as hex strings, are parsed once into [`Rgb`], and are blended
//! in `f64` space ([`RgbF`]) so the dithering stage can perturb the
//! un-quantized value before it is rounded to bytes.

use std::fmt;
use std::str::FromStr;

/// Number of hex digits in an `rrggbb` triplet.
const HEX_TRIPLET_DIGITS: usize = 6;

/// Errors from parsing a hex color stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Nothing after the optional `#`.
    Empty,
    /// Wrong number of hex digits (only `rrggbb` is accepted).
    BadLength(usize),
    /// A character that is not a hex digit.
    BadDigit(char),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty color"),
            Self::BadLength(len) => write!(f, "expected 6 hex digits, found {len}"),
            Self::BadDigit(ch) => write!(f, "invalid hex digit {ch:?}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

/// RGB color (opaque, 8 bits per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Fallback for stops that fail to parse.
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb` (case-insensitive).
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        if digits.is_empty() {
            return Err(ColorParseError::Empty);
        }

        let mut nibbles = [0u8; HEX_TRIPLET_DIGITS];
        let mut count = 0usize;
        for ch in digits.chars() {
            let Some(value) = ch.to_digit(16) else {
                return Err(ColorParseError::BadDigit(ch));
            };
            if count < HEX_TRIPLET_DIGITS {
                nibbles[count] = value as u8;
            }
            count += 1;
        }
        if count != HEX_TRIPLET_DIGITS {
            return Err(ColorParseError::BadLength(count));
        }

        Ok(Self::new(
            (nibbles[0] << 4) | nibbles[1],
            (nibbles[2] << 4) | nibbles[3],
            (nibbles[4] << 4) | nibbles[5],
        ))
    }

    /// Parse a stop, substituting black when the input is malformed.
    ///
    /// Rendering never aborts on a bad stop; the failure is logged once per
    /// resolution and only that stop is affected.
    #[must_use]
    pub fn from_hex_or_black(input: &str) -> Self {
        match Self::from_hex(input) {
            Ok(color) => color,
            Err(err) => {
                tracing::warn!(input, error = %err, "malformed color stop, using black");
                Self::BLACK
            }
        }
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Un-quantized RGB in channel units (`0.0..=255.0` for in-gamut values).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RgbF {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbF {
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Linear blend `a + (b - a) * t`.
    #[inline]
    #[must_use]
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
        }
    }

    /// Add the same offset to every channel (luminance-style perturbation).
    #[inline]
    #[must_use]
    pub fn offset(self, delta: f64) -> Self {
        Self {
            r: self.r + delta,
            g: self.g + delta,
            b: self.b + delta,
        }
    }

    /// Clamp to `[0, 255]` and round to bytes.
    ///
    /// Ties round to even, matching the conversion a canvas `ImageData`
    /// buffer applies to fractional channel writes.
    #[inline]
    #[must_use]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            quantize_channel(self.r),
            quantize_channel(self.g),
            quantize_channel(self.b),
        ]
    }

    /// Largest per-channel absolute difference.
    #[must_use]
    pub fn max_channel_delta(self, other: Self) -> f64 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }
}

impl From<Rgb> for RgbF {
    fn from(color: Rgb) -> Self {
        Self::new(color.r as f64, color.g as f64, color.b as f64)
    }
}

#[inline]
fn quantize_channel(value: f64) -> u8 {
    // NaN fails both comparisons inside clamp's contract, so map it first.
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Cubic ease `x² (3 − 2x)`; callers pre-clamp `x` to `[0, 1]`.
#[inline]
#[must_use]
pub fn smoothstep(x: f64) -> f64 {
    x * x * (3.0 - 2.0 * x)
}

/// The three gradient stops, pre-converted for blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStops {
    from: RgbF,
    mid: RgbF,
    to: RgbF,
}

impl GradientStops {
    #[must_use]
    pub fn new(from: Rgb, mid: Rgb, to: Rgb) -> Self {
        Self {
            from: from.into(),
            mid: mid.into(),
            to: to.into(),
        }
    }

    /// Two-segment smoothstep interpolation: `from → mid` below 0.5,
    /// `mid → to` from 0.5 up.
    ///
    /// `t` is clamped to `[0, 1]`; both segments evaluate to `mid` at the
    /// midpoint so there is no seam.
    #[inline]
    #[must_use]
    pub fn sample(&self, t: f64) -> RgbF {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t < 0.5 {
            RgbF::lerp(self.from, self.mid, smoothstep(t * 2.0))
        } else {
            RgbF::lerp(self.mid, self.to, smoothstep((t - 0.5) * 2.0))
        }
    }

    #[must_use]
    pub const fn from(&self) -> RgbF {
        self.from
    }

    #[must_use]
    pub const fn mid(&self) -> RgbF {
        self.mid
    }

    #[must_use]
    pub const fn to(&self) -> RgbF {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops() -> GradientStops {
        GradientStops::new(
            Rgb::new(79, 70, 229),
            Rgb::new(168, 85, 247),
            Rgb::new(236, 72, 153),
        )
    }

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(Rgb::from_hex("#4f46e5"), Ok(Rgb::new(0x4f, 0x46, 0xe5)));
        assert_eq!(Rgb::from_hex("4F46E5"), Ok(Rgb::new(0x4f, 0x46, 0xe5)));
    }

    #[test]
    fn rejects_shorthand_and_garbage() {
        assert_eq!(Rgb::from_hex("#abc"), Err(ColorParseError::BadLength(3)));
        assert_eq!(Rgb::from_hex("#"), Err(ColorParseError::Empty));
        assert_eq!(Rgb::from_hex(""), Err(ColorParseError::Empty));
        assert_eq!(
            Rgb::from_hex("#12345g"),
            Err(ColorParseError::BadDigit('g'))
        );
        assert_eq!(
            Rgb::from_hex("#1234567"),
            Err(ColorParseError::BadLength(7))
        );
        assert_eq!(
            Rgb::from_hex("##123456"),
            Err(ColorParseError::BadDigit('#'))
        );
    }

    #[test]
    fn malformed_stop_falls_back_to_black() {
        assert_eq!(Rgb::from_hex_or_black("not-a-color"), Rgb::BLACK);
        assert_eq!(Rgb::from_hex_or_black("#ffffff"), Rgb::WHITE);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let color = Rgb::new(6, 182, 212);
        assert_eq!(color.to_string(), "#06b6d4");
        assert_eq!(color.to_hex().parse::<Rgb>(), Ok(color));
    }

    #[test]
    fn smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert!(smoothstep(0.25) < 0.25);
        assert!(smoothstep(0.75) > 0.75);
    }

    #[test]
    fn sample_hits_stops_exactly() {
        let s = stops();
        assert_eq!(s.sample(0.0), s.from());
        assert_eq!(s.sample(0.5), s.mid());
        assert_eq!(s.sample(1.0), s.to());
    }

    #[test]
    fn sample_is_continuous_at_midpoint() {
        let s = stops();
        let eps = 1e-6;
        let below = s.sample(0.5 - eps);
        let above = s.sample(0.5 + eps);
        assert!(below.max_channel_delta(above) < 1e-6);
    }

    #[test]
    fn sample_clamps_out_of_range_parameter() {
        let s = stops();
        assert_eq!(s.sample(-3.0), s.from());
        assert_eq!(s.sample(7.5), s.to());
        assert_eq!(s.sample(f64::NAN), s.from());
    }

    #[test]
    fn to_bytes_clamps_and_rounds() {
        assert_eq!(RgbF::new(-40.0, 300.0, 12.5).to_bytes(), [0, 255, 12]);
        assert_eq!(RgbF::new(13.5, 0.49, 254.6).to_bytes(), [14, 0, 255]);
        assert_eq!(RgbF::new(f64::NAN, 1.0, 2.0).to_bytes(), [0, 1, 2]);
    }
}
