#![forbid(unsafe_code)]

//! Logging helpers.
//!
//! Everything in slotkit logs through `tracing`. Hosts that already install a
//! subscriber need nothing from here; standalone tools can enable the
//! `tracing-json` feature and call [`init_json_subscriber`].

pub use tracing::{debug, debug_span, error, info, trace, warn};

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "slotkit=info,slotkit_core=info,slotkit_widgets=info";

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already set.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .is_ok()
}
