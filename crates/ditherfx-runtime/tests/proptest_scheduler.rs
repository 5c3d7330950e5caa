//! Property tests: arbitrary host event sequences against the scheduler.
//!
//! 1. Buffer size — the working frame always matches the last container size
//! 2. Single pending — at most one callback is queued while Running
//! 3. Teardown — nothing is presented after unmount

use ditherfx_core::{DitherConfig, SurfaceSize};
use ditherfx_render::{DitherGradientFx, XorShiftNoise};
use ditherfx_runtime::{HeadlessHost, RasterScheduler, SchedulerState};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Pump,
    Resize(u32, u32),
    Reconfigure(f64),
    Unmount,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Pump),
        2 => (0u32..40, 0u32..40).prop_map(|(w, h)| Op::Resize(w, h)),
        1 => (0.0f64..=1.0).prop_map(Op::Reconfigure),
        1 => Just(Op::Unmount),
    ]
}

proptest! {
    #[test]
    fn event_sequences_respect_lifecycle(
        w in 0u32..40,
        h in 0u32..40,
        ops in proptest::collection::vec(op(), 1..40),
    ) {
        let mut sched = RasterScheduler::new(
            HeadlessHost::new(SurfaceSize::new(w, h)),
            DitherGradientFx::with_noise(DitherConfig::default(), XorShiftNoise::new(5)),
        );
        prop_assert!(sched.mount().is_ok());
        let mut container = SurfaceSize::new(w, h);
        let mut presents_at_unmount = None;

        for op in ops {
            match op {
                Op::Pump => {
                    sched.pump();
                }
                Op::Resize(w, h) => {
                    sched.resize(SurfaceSize::new(w, h));
                    if sched.state() == SchedulerState::Running {
                        container = SurfaceSize::new(w, h);
                    }
                }
                Op::Reconfigure(intensity) => sched.reconfigure(|fx| {
                    fx.set_config(DitherConfig { intensity, ..DitherConfig::default() })
                }),
                Op::Unmount => {
                    sched.unmount();
                    if presents_at_unmount.is_none() {
                        presents_at_unmount = Some(sched.host().presents());
                    }
                }
            }

            match sched.state() {
                SchedulerState::Running => {
                    prop_assert_eq!(sched.frame().size(), container);
                    prop_assert_eq!(sched.frame().len(), container.rgba_len());
                    prop_assert_eq!(sched.host().queued(), 1);
                }
                _ => {
                    prop_assert_eq!(sched.host().queued(), 0);
                }
            }
            if let Some(n) = presents_at_unmount {
                prop_assert_eq!(sched.host().presents(), n);
            }
        }
    }
}
