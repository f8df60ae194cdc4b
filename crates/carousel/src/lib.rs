#![forbid(unsafe_code)]

//! Carousel public facade crate.
//!
//! Re-exports the geometry, scroll and widget types most hosts need and
//! offers a prelude for day-to-day usage.

// --- Core re-exports -------------------------------------------------------

pub use carousel_core::animation::{Animation, Tween};
pub use carousel_core::geometry::{Insets, Point, Rect, Size};
pub use carousel_core::scroll::{
    GestureId, HorizontalDirection, ScrollView, SharedScrollView, VerticalDirection,
};

#[cfg(feature = "tracing-json")]
pub use carousel_core::logging::init_json_subscriber;

// --- Widget re-exports -----------------------------------------------------

pub use carousel_widgets::{
    AppearanceEvent, AppearanceState, ContainerScrollHook, DelegateId, GestureArbiter,
    NavigationDirection, OptionsError, PageDataSource, PageScrollable, PageSequencer, PaneArena,
    PaneKey, PaneObserver, PaneSource, PagingConfig, PagingDelegate, PagingOptions, PagingView,
    QueuingHost, StickyHeaderCoordinator,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Insets, NavigationDirection, PageDataSource, PageScrollable, PagingConfig,
        PagingDelegate, PagingOptions, PagingView, Point, Rect, ScrollView, SharedScrollView, Size,
    };

    pub use crate::{core, widgets};
}

pub use carousel_core as core;
pub use carousel_widgets as widgets;
