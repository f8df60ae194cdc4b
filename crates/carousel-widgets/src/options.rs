#![forbid(unsafe_code)]

//! Paging options as plain data.
//!
//! [`PagingOptions`] groups the header geometry, wrap/paging flags and
//! animation durations of a [`crate::paging_view::PagingView`]. With the
//! `options-config` feature it can be loaded from TOML:
//!
//! ```toml
//! header_height = 120.0
//! sticky_height = 44.0
//! is_infinite = true
//! transition_duration_ms = 350
//!
//! [content_inset]
//! top = 20.0
//! ```
//!
//! Missing keys keep their defaults. Loaded options are validated before
//! they are returned.

#[cfg(feature = "options-config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "options-config")]
use serde::{Deserialize, Serialize};

use carousel_core::geometry::Insets;

use crate::queuing::{DEFAULT_SETTLE, DEFAULT_TRANSITION};

/// Configuration for a paging view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "options-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "options-config", serde(default))]
pub struct PagingOptions {
    /// Height of the header above the pages.
    pub header_height: f64,
    /// Height the header collapses to on sticky pages.
    pub sticky_height: f64,
    /// Inset of the page area inside the viewport.
    pub content_inset: Insets,
    /// Wrap around past the first and last page.
    pub is_infinite: bool,
    /// Allow horizontal drags.
    pub is_paging_enabled: bool,
    /// Duration of an animated `scroll_to`, in milliseconds.
    pub transition_duration_ms: u64,
    /// Duration of the settle after a drag, in milliseconds.
    pub settle_duration_ms: u64,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            header_height: 0.0,
            sticky_height: 0.0,
            content_inset: Insets::ZERO,
            is_infinite: false,
            is_paging_enabled: true,
            transition_duration_ms: DEFAULT_TRANSITION.as_millis() as u64,
            settle_duration_ms: DEFAULT_SETTLE.as_millis() as u64,
        }
    }
}

impl PagingOptions {
    #[must_use]
    pub fn header_height(mut self, height: f64) -> Self {
        self.header_height = height;
        self
    }

    #[must_use]
    pub fn sticky_height(mut self, height: f64) -> Self {
        self.sticky_height = height;
        self
    }

    #[must_use]
    pub fn content_inset(mut self, inset: Insets) -> Self {
        self.content_inset = inset;
        self
    }

    #[must_use]
    pub fn infinite(mut self, infinite: bool) -> Self {
        self.is_infinite = infinite;
        self
    }

    #[must_use]
    pub fn paging_enabled(mut self, enabled: bool) -> Self {
        self.is_paging_enabled = enabled;
        self
    }

    #[must_use]
    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration_ms = duration.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn settle_duration(mut self, duration: Duration) -> Self {
        self.settle_duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_duration_ms)
    }

    /// Check geometry is finite and non-negative and durations are nonzero.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let geometry = [
            ("header_height", self.header_height),
            ("sticky_height", self.sticky_height),
        ]
        .into_iter()
        .chain(
            self.content_inset
                .sides()
                .into_iter()
                .map(|(side, v)| (inset_field(side), v)),
        );
        for (field, value) in geometry {
            if !value.is_finite() || value < 0.0 {
                return Err(OptionsError::InvalidLength { field, value });
            }
        }
        if self.transition_duration_ms == 0 {
            return Err(OptionsError::ZeroDuration {
                field: "transition_duration_ms",
            });
        }
        if self.settle_duration_ms == 0 {
            return Err(OptionsError::ZeroDuration {
                field: "settle_duration_ms",
            });
        }
        Ok(())
    }

    /// Parse and validate options from a TOML string.
    #[cfg(feature = "options-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, OptionsError> {
        let options: Self = toml::from_str(s).map_err(OptionsError::Toml)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse and validate options from a TOML file.
    #[cfg(feature = "options-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(OptionsError::Io)?;
        Self::from_toml_str(&content)
    }
}

fn inset_field(side: &'static str) -> &'static str {
    match side {
        "top" => "content_inset.top",
        "left" => "content_inset.left",
        "bottom" => "content_inset.bottom",
        "right" => "content_inset.right",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from validating or loading [`PagingOptions`].
#[derive(Debug)]
pub enum OptionsError {
    /// A length is negative, NaN or infinite.
    InvalidLength { field: &'static str, value: f64 },
    /// A duration is zero.
    ZeroDuration { field: &'static str },
    /// I/O error reading a file.
    #[cfg(feature = "options-config")]
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "options-config")]
    Toml(toml::de::Error),
}

impl std::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength { field, value } => {
                write!(f, "{field} must be finite and non-negative, got {value}")
            }
            Self::ZeroDuration { field } => write!(f, "{field} must be greater than zero"),
            #[cfg(feature = "options-config")]
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "options-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "options-config")]
            Self::Io(e) => Some(e),
            #[cfg(feature = "options-config")]
            Self::Toml(e) => Some(e),
            _ => None,
        }
    }
}
