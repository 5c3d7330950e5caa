//! Property-based invariant tests for the gradient color model.
//!
//! 1. Endpoints — `t = 0, 0.5, 1` return the stops exactly
//! 2. Midpoint continuity — no seam between the two segments
//! 3. Range — every sample stays inside the stops' channel bounds
//! 4. Hex round trip — any color survives `to_hex` → `from_hex`

use ditherfx_core::{GradientStops, Rgb, RgbF};
use proptest::prelude::*;

fn rgb() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

proptest! {
    #[test]
    fn endpoints_are_exact(from in rgb(), mid in rgb(), to in rgb()) {
        let stops = GradientStops::new(from, mid, to);
        prop_assert_eq!(stops.sample(0.0), RgbF::from(from));
        prop_assert_eq!(stops.sample(0.5), RgbF::from(mid));
        prop_assert_eq!(stops.sample(1.0), RgbF::from(to));
    }

    #[test]
    fn midpoint_has_no_seam(from in rgb(), mid in rgb(), to in rgb(), eps in 1e-9f64..1e-4) {
        let stops = GradientStops::new(from, mid, to);
        let below = stops.sample(0.5 - eps);
        let above = stops.sample(0.5 + eps);
        // smoothstep has zero slope at both segment ends, so the jump is
        // bounded by 255 * 3 * (2 eps)^2 on each side.
        prop_assert!(below.max_channel_delta(above) <= 255.0 * 24.0 * eps * eps + 1e-9);
    }

    #[test]
    fn samples_stay_within_stop_bounds(
        from in rgb(),
        mid in rgb(),
        to in rgb(),
        t in -2.0f64..3.0,
    ) {
        let stops = GradientStops::new(from, mid, to);
        let c = stops.sample(t);
        let lo = |a: u8, b: u8, c: u8| a.min(b).min(c) as f64 - 1e-9;
        let hi = |a: u8, b: u8, c: u8| a.max(b).max(c) as f64 + 1e-9;
        prop_assert!(c.r >= lo(from.r, mid.r, to.r) && c.r <= hi(from.r, mid.r, to.r));
        prop_assert!(c.g >= lo(from.g, mid.g, to.g) && c.g <= hi(from.g, mid.g, to.g));
        prop_assert!(c.b >= lo(from.b, mid.b, to.b) && c.b <= hi(from.b, mid.b, to.b));
    }

    #[test]
    fn hex_round_trip(color in rgb()) {
        prop_assert_eq!(Rgb::from_hex(&color.to_hex()), Ok(color));
        prop_assert_eq!(Rgb::from_hex(&color.to_hex().to_uppercase()), Ok(color));
    }
}
