#![forbid(unsafe_code)]

//! Vertical scroll coordination between a container and the active page.
//!
//! The container (the "parent" surface) scrolls the header away; the active
//! page may expose its own vertical surface (the "child"). The coordinator
//! keeps the two from fighting:
//!
//! - While the header is partially collapsed, the child stays pinned to its
//!   top.
//! - Pulling content down while the child is scrolled pins the container at
//!   the sticky offset, so the child scrolls back first.
//! - While the container overscrolls at its top, the child stays pinned.
//!
//! With `sticky_offset = header_height - sticky_height`, the container's
//! scrollable range is `[0, sticky_offset]` when the active page is sticky.
//!
//! # Invariants
//!
//! - At most one child surface is bound, and its gesture is in
//!   [`StickyHeaderCoordinator::simultaneous_gestures`] exactly while it is
//!   bound.
//! - The container-scroll hook fires once per observed change of the
//!   container offset, after corrections.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No child surface bound | Only direction and bounce are tracked |
//! | Child mutated without an observation call | Corrected on the next observation |
//! | `sticky_height >= header_height` | Container never bounces; nothing to collapse |

use std::fmt;

use carousel_core::geometry::{Insets, Point, Rect, Size};
use carousel_core::scroll::{GestureId, ScrollView, SharedScrollView, VerticalDirection};

use crate::gesture::GestureSet;

/// Vertical behaviour requested by the active page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "options-config", derive(serde::Serialize, serde::Deserialize))]
pub struct PagingConfig {
    /// Container may overscroll at the top.
    pub bounces: bool,
    /// Header collapses to the sticky height while the page scrolls.
    pub is_sticky: bool,
}

impl PagingConfig {
    #[must_use]
    pub const fn bounces(mut self, bounces: bool) -> Self {
        self.bounces = bounces;
        self
    }

    #[must_use]
    pub const fn sticky(mut self, is_sticky: bool) -> Self {
        self.is_sticky = is_sticky;
        self
    }
}

/// Optional capability of a page: a vertical surface and a paging config.
pub trait PageScrollable {
    fn scroll_surface(&self) -> Option<SharedScrollView> {
        None
    }

    fn paging_config(&self) -> PagingConfig {
        PagingConfig::default()
    }
}

/// Called with the container offset whenever it changes.
pub type ContainerScrollHook = Box<dyn FnMut(Point)>;

struct ChildBinding {
    surface: SharedScrollView,
    gesture: GestureId,
    last_offset: Point,
}

/// Keeps a container surface and the active page's surface in step.
pub struct StickyHeaderCoordinator {
    parent: ScrollView,
    header_height: f64,
    sticky_height: f64,
    content_inset: Insets,
    viewport: Size,
    config: PagingConfig,
    bounces: bool,
    child: Option<ChildBinding>,
    simultaneous: GestureSet,
    parent_offset: Point,
    direction: VerticalDirection,
    page_frame: Rect,
    needs_layout: bool,
    on_container_scroll: Option<ContainerScrollHook>,
}

impl fmt::Debug for StickyHeaderCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StickyHeaderCoordinator")
            .field("parent", &self.parent)
            .field("header_height", &self.header_height)
            .field("sticky_height", &self.sticky_height)
            .field("content_inset", &self.content_inset)
            .field("viewport", &self.viewport)
            .field("config", &self.config)
            .field("bounces", &self.bounces)
            .field("child_bound", &self.child.is_some())
            .field("direction", &self.direction)
            .field("page_frame", &self.page_frame)
            .finish_non_exhaustive()
    }
}

impl Default for StickyHeaderCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl StickyHeaderCoordinator {
    pub fn new() -> Self {
        Self {
            parent: ScrollView::default(),
            header_height: 0.0,
            sticky_height: 0.0,
            content_inset: Insets::ZERO,
            viewport: Size::ZERO,
            config: PagingConfig::default(),
            bounces: false,
            child: None,
            simultaneous: GestureSet::new(),
            parent_offset: Point::ZERO,
            direction: VerticalDirection::Stop,
            page_frame: Rect::default(),
            needs_layout: true,
            on_container_scroll: None,
        }
    }

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

    // --- Accessors --------------------------------------------------------

    /// The container surface.
    pub fn container(&self) -> &ScrollView {
        &self.parent
    }

    pub fn container_offset(&self) -> f64 {
        self.parent.content_offset.y
    }

    /// Frame of the page area, as of the last layout.
    pub fn page_frame(&self) -> Rect {
        self.page_frame
    }

    /// Config of the active page, as of the last rebind.
    pub fn config(&self) -> PagingConfig {
        self.config
    }

    /// Effective container bounce, as of the last layout.
    pub fn bounces(&self) -> bool {
        self.bounces
    }

    /// Direction of the last container offset change.
    pub fn direction(&self) -> VerticalDirection {
        self.direction
    }

    /// Container scroll distance at which the header is fully collapsed.
    #[inline]
    pub fn sticky_offset(&self) -> f64 {
        self.header_height - self.sticky_height
    }

    /// Gestures allowed to run together with the container's own drag.
    pub fn simultaneous_gestures(&self) -> &GestureSet {
        &self.simultaneous
    }

    pub fn child(&self) -> Option<&SharedScrollView> {
        self.child.as_ref().map(|c| &c.surface)
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn get_header_height(&self) -> f64 {
        self.header_height
    }

    pub fn get_sticky_height(&self) -> f64 {
        self.sticky_height
    }

    pub fn get_content_inset(&self) -> Insets {
        self.content_inset
    }

    #[inline]
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    // --- Configuration ----------------------------------------------------

    pub fn set_header_height(&mut self, height: f64) {
        if self.header_height != height {
            self.header_height = height;
            self.needs_layout = true;
        }
    }

    pub fn set_sticky_height(&mut self, height: f64) {
        if self.sticky_height != height {
            self.sticky_height = height;
            self.needs_layout = true;
        }
    }

    pub fn set_content_inset(&mut self, inset: Insets) {
        if self.content_inset != inset {
            self.content_inset = inset;
            self.needs_layout = true;
        }
    }

    pub fn set_viewport(&mut self, size: Size) {
        if self.viewport != size {
            self.viewport = size;
            self.needs_layout = true;
        }
    }

    pub fn set_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    /// Install the container-scroll hook, replacing any previous one.
    pub fn set_on_container_scroll(&mut self, hook: Option<ContainerScrollHook>) {
        self.on_container_scroll = hook;
    }

    // --- Binding ----------------------------------------------------------

    /// Drop the current child binding and bind the active page's surface.
    ///
    /// `None`, or a page without a surface, leaves the default config and no
    /// child. Always schedules a layout.
    pub fn rebind(&mut self, page: Option<&dyn PageScrollable>) {
        self.unbind();
        self.config = PagingConfig::default();
        self.needs_layout = true;

        let Some(page) = page else {
            return;
        };
        self.config = page.paging_config();
        if let Some(surface) = page.scroll_surface() {
            let (gesture, last_offset) = {
                let view = surface.borrow();
                (view.gesture(), view.content_offset)
            };
            self.simultaneous.insert(gesture);
            self.child = Some(ChildBinding {
                surface,
                gesture,
                last_offset,
            });
        }
        carousel_core::debug!(
            sticky = self.config.is_sticky,
            bounces = self.config.bounces,
            child = self.child.is_some(),
            "active page rebound"
        );
    }

    /// Stop observing the child surface.
    pub fn unbind(&mut self) {
        if let Some(child) = self.child.take() {
            self.simultaneous.remove(child.gesture);
        }
    }

    // --- Layout -----------------------------------------------------------

    pub fn layout_if_needed(&mut self) {
        if self.needs_layout {
            self.layout();
        }
    }

    /// Apply bounce, container range and page frame.
    pub fn layout(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "sticky_layout",
            header = self.header_height,
            sticky = self.sticky_height,
            is_sticky = self.config.is_sticky
        )
        .entered();

        self.needs_layout = false;

        self.bounces = self.config.bounces;
        if self.header_height > 0.0 && self.sticky_height >= self.header_height {
            self.bounces = false;
        }

        let offset_y = self.parent.content_offset.y;
        self.parent.bounces = self.bounces;
        self.parent.bounds = self.viewport;
        self.parent.content_size = self.viewport;
        let collapse = if self.config.is_sticky {
            self.sticky_offset()
        } else {
            0.0
        };
        if self.config.is_sticky {
            self.parent.content_size.height += collapse;
            self.parent.set_offset_y(offset_y);
        } else {
            self.parent.set_offset_y(0.0);
        }

        let area = Rect::from_origin_size(Point::ZERO, self.viewport).inset_by(self.content_inset);
        self.page_frame = Rect::new(
            area.left(),
            area.top() + self.header_height,
            area.width,
            area.height - self.header_height + collapse,
        );

        if self.parent.content_offset != self.parent_offset {
            self.container_did_scroll();
        }
    }

    // --- Scrolling --------------------------------------------------------

    /// Drag the container by `dy`.
    pub fn scroll_container_by(&mut self, dy: f64) {
        self.parent.scroll_by(dy);
        self.container_did_scroll();
    }

    /// Move the container offset programmatically.
    pub fn set_container_offset(&mut self, y: f64) {
        self.parent.set_offset_y(y);
        self.container_did_scroll();
    }

    /// Drag the bound child by `dy`. No-op without a child.
    pub fn scroll_child_by(&mut self, dy: f64) {
        let Some(child) = &self.child else {
            return;
        };
        child.surface.borrow_mut().scroll_by(dy);
        self.child_did_scroll();
    }

    /// Move the bound child offset programmatically. No-op without a child.
    pub fn set_child_offset(&mut self, y: f64) {
        let Some(child) = &self.child else {
            return;
        };
        child.surface.borrow_mut().set_offset_y(y);
        self.child_did_scroll();
    }

    /// Observe the container after its offset changed.
    pub fn container_did_scroll(&mut self) {
        let y = self.parent.content_offset.y;
        self.direction = VerticalDirection::from_offsets(self.parent_offset.y, y);

        let sticky_offset = self.sticky_offset();
        if self.sticky_height < self.header_height && self.bounces && self.config.is_sticky {
            let bounce = y < sticky_offset / 2.0;
            if self.parent.bounces != bounce {
                carousel_core::trace!(y, bounce, "container bounce toggled");
                self.parent.bounces = bounce;
            }
        }

        if self.child.is_some() {
            self.correct_offsets();
        }

        if self.parent.content_offset != self.parent_offset {
            self.parent_offset = self.parent.content_offset;
            if let Some(hook) = self.on_container_scroll.as_mut() {
                hook(self.parent_offset);
            }
        }
    }

    /// Observe the child after its offset may have changed.
    ///
    /// Only a vertical change is acted on. A correction that moves the
    /// container is observed like any other container scroll.
    pub fn child_did_scroll(&mut self) {
        let Some(child) = &self.child else {
            return;
        };
        let now = child.surface.borrow().content_offset;
        if now.y == child.last_offset.y {
            return;
        }
        self.correct_offsets();
        if self.parent.content_offset != self.parent_offset {
            self.container_did_scroll();
        }
        if let Some(child) = self.child.as_mut() {
            child.last_offset = child.surface.borrow().content_offset;
        }
    }

    fn correct_offsets(&mut self) {
        let Some(child) = &self.child else {
            return;
        };
        let mut surface = child.surface.borrow_mut();
        let parent_y = self.parent.content_offset.y;
        let child_top = -surface.content_inset.top;
        let sticky_offset = self.sticky_offset();

        if self.bounces && parent_y < 0.0 {
            surface.set_offset_y(child_top);
            return;
        }

        if self.direction == VerticalDirection::Down && surface.content_offset.y > child_top {
            self.parent.set_offset_y(sticky_offset);
        }

        let parent_y = self.parent.content_offset.y;
        if parent_y > 0.0 && parent_y < sticky_offset {
            surface.set_offset_y(child_top);
        }
    }
}
