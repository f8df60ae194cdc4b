#![forbid(unsafe_code)]

//! Windowed carousel widgets: queuing host, pager, sticky header and paging view.

pub mod appearance;
pub mod arena;
pub mod gesture;
pub mod options;
pub mod pager;
pub mod paging_view;
pub mod queuing;
pub mod sticky;

pub use appearance::{AppearanceEvent, AppearanceState};
pub use arena::{PaneArena, PaneKey};
pub use gesture::{BACK_SWIPE_EDGE_ZONE, GestureArbiter, GestureSet, PagerPosition};
pub use options::{OptionsError, PagingOptions};
pub use pager::{DelegateId, PageDataSource, PageSequencer, PagingDelegate, index_after, index_before};
pub use paging_view::PagingView;
pub use queuing::{
    Completion, FLICK_VELOCITY, NavigationDirection, Pane, PaneObserver, PaneSource, QueuingHost,
};
pub use sticky::{ContainerScrollHook, PageScrollable, PagingConfig, StickyHeaderCoordinator};
