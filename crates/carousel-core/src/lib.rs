#![forbid(unsafe_code)]

//! Core: geometry, animation, headless scroll surfaces, and logging.

pub mod animation;
pub mod geometry;
pub mod logging;
pub mod scroll;

// Event macros at the crate root; no-op forms are exported there by
// `#[macro_export]` when tracing is off.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
