#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported at
//! the crate root, so widget code writes `carousel_core::warn!(..)` and never
//! needs its own `cfg`. Without the feature the same names expand to nothing.
//!
//! `tracing-json` additionally provides [`init_json_subscriber`] for hosts
//! that want machine-readable logs of tiling and scroll correction.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

// Layout spans are opened with `tracing::debug_span!` behind the widgets'
// own `tracing` feature, so only event macros need a disabled form.
#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards a debug event.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discards a trace event.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discards a warning.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` for the carousel crates when `RUST_LOG` is unset. Returns `false`
/// if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("carousel_core=info,carousel_widgets=info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .is_ok()
}
