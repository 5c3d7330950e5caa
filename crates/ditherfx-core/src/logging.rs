#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Every ditherfx crate logs through the `tracing` facade. Libraries never
//! install a subscriber; hosts that want output either bring their own or
//! enable the `tracing-json` feature and call [`init_json_subscriber`].

pub use tracing::{debug, debug_span, error, info, info_span, trace, warn};

/// Environment variable holding the `EnvFilter` directive.
pub const ENV_LOG_FILTER: &str = "DITHERFX_LOG";

/// Install a global JSON subscriber filtered by `DITHERFX_LOG`
/// (default `info`).
///
/// Returns `false` when a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
