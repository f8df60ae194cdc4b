#![forbid(unsafe_code)]

//! Paging view: pager, sticky header and gesture rules behind one surface.
//!
//! [`PagingView`] owns a [`PageSequencer`] for horizontal paging and a
//! [`StickyHeaderCoordinator`] for vertical coordination with the active
//! page. A layout pass runs:
//!
//! 1. reload, if one is pending;
//! 2. rebind the active page's scroll surface, if requested;
//! 3. sticky layout (bounce, container range, page frame);
//! 4. pager bounds = page frame size, then pager layout;
//! 5. if the pager settled, rebind and lay out again.
//!
//! Every configuration setter that changes a value schedules a layout.
//!
//! # Example
//!
//! ```ignore
//! let mut view = PagingView::new(source).options(&PagingOptions::default().header_height(120.0));
//! view.set_viewport(Size::new(390.0, 844.0));
//! view.layout();
//! view.scroll_to(2, true);
//! while view.tick(Duration::from_millis(16)) {}
//! ```

use std::time::Duration;

use carousel_core::geometry::{Insets, Rect, Size};
use carousel_core::scroll::GestureId;

use crate::gesture::{GestureArbiter, PagerPosition};
use crate::options::PagingOptions;
use crate::pager::{DelegateId, PageDataSource, PageSequencer, PagingDelegate};
use crate::sticky::{ContainerScrollHook, PageScrollable, StickyHeaderCoordinator};

/// Headless paging view.
#[derive(Debug)]
pub struct PagingView<D: PageDataSource> {
    pager: PageSequencer<D>,
    sticky: StickyHeaderCoordinator,
    gestures: GestureArbiter,
    needs_page_scrollable_update: bool,
}

impl<D> PagingView<D>
where
    D: PageDataSource,
    D::Page: PageScrollable,
{
    /// Create a view over `source`. The first layout reloads it.
    pub fn new(source: D) -> Self {
        Self {
            pager: PageSequencer::new(source),
            sticky: StickyHeaderCoordinator::new(),
            gestures: GestureArbiter::new(),
            needs_page_scrollable_update: false,
        }
    }

    /// Apply `options` (builder). Options are not validated here.
    #[must_use]
    pub fn options(mut self, options: &PagingOptions) -> Self {
        self.apply_options(options);
        self
    }

    /// Apply every field of `options`.
    pub fn apply_options(&mut self, options: &PagingOptions) {
        self.set_header_height(options.header_height);
        self.set_sticky_height(options.sticky_height);
        self.set_content_inset(options.content_inset);
        self.set_infinite(options.is_infinite);
        self.set_paging_enabled(options.is_paging_enabled);
        self.pager.set_durations(options.transition(), options.settle());
    }

    // --- Accessors --------------------------------------------------------

    pub fn pager(&self) -> &PageSequencer<D> {
        &self.pager
    }

    pub fn sticky(&self) -> &StickyHeaderCoordinator {
        &self.sticky
    }

    pub fn gestures(&self) -> &GestureArbiter {
        &self.gestures
    }

    pub fn gestures_mut(&mut self) -> &mut GestureArbiter {
        &mut self.gestures
    }

    pub fn source(&self) -> &D {
        self.pager.source()
    }

    pub fn source_mut(&mut self) -> &mut D {
        self.pager.source_mut()
    }

    #[inline]
    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn page_frame(&self) -> Rect {
        self.sticky.page_frame()
    }

    pub fn container_offset(&self) -> f64 {
        self.sticky.container_offset()
    }

    pub fn needs_layout(&self) -> bool {
        self.sticky.needs_layout()
            || self.pager.needs_reload()
            || self.pager.host().needs_layout()
            || self.needs_page_scrollable_update
    }

    // --- Configuration ----------------------------------------------------

    pub fn set_viewport(&mut self, size: Size) {
        self.sticky.set_viewport(size);
    }

    pub fn set_header_height(&mut self, height: f64) {
        self.sticky.set_header_height(height);
    }

    pub fn set_sticky_height(&mut self, height: f64) {
        self.sticky.set_sticky_height(height);
    }

    pub fn set_content_inset(&mut self, inset: Insets) {
        self.sticky.set_content_inset(inset);
    }

    pub fn set_infinite(&mut self, infinite: bool) {
        if self.pager.is_infinite() != infinite {
            self.pager.set_infinite(infinite);
            self.sticky.set_needs_layout();
        }
    }

    pub fn set_paging_enabled(&mut self, enabled: bool) {
        if self.pager.is_paging_enabled() != enabled {
            self.pager.set_paging_enabled(enabled);
            self.sticky.set_needs_layout();
        }
    }

    /// Mark this view as nested inside another pager.
    pub fn set_nested(&mut self, nested: bool) {
        if self.pager.is_nested() != nested {
            self.pager.set_nested(nested);
            self.sticky.set_needs_layout();
        }
    }

    pub fn set_durations(&mut self, transition: Duration, settle: Duration) {
        self.pager.set_durations(transition, settle);
    }

    pub fn set_on_container_scroll(&mut self, hook: Option<ContainerScrollHook>) {
        self.sticky.set_on_container_scroll(hook);
    }

    pub fn set_delegate(&mut self, delegate: Box<dyn PagingDelegate>) -> DelegateId {
        self.pager.set_delegate(delegate)
    }

    pub fn add_delegate(&mut self, delegate: Box<dyn PagingDelegate>) -> DelegateId {
        self.pager.add_delegate(delegate)
    }

    pub fn remove_delegate(&mut self, id: DelegateId) -> Option<Box<dyn PagingDelegate>> {
        self.pager.remove_delegate(id)
    }

    // --- Content ----------------------------------------------------------

    pub fn set_needs_reload(&mut self) {
        self.pager.set_needs_reload();
    }

    /// Reload now. The new page is shown by the next layout.
    pub fn reload(&mut self) {
        self.pager.reload();
        self.sticky.set_needs_layout();
    }

    pub fn scroll_to(&mut self, index: usize, animated: bool) {
        self.pager.scroll_to(index, animated);
    }

    /// Tear down every page and reset the active-page binding.
    pub fn remove_all(&mut self) {
        self.pager.remove_all();
        self.sticky.rebind(None);
    }

    /// Re-query the active page's scroll surface and config on next layout.
    pub fn set_needs_page_scrollable_update(&mut self) {
        self.needs_page_scrollable_update = true;
        self.sticky.set_needs_layout();
    }

    // --- Layout -----------------------------------------------------------

    pub fn layout_if_needed(&mut self) {
        if self.needs_layout() {
            self.layout();
        }
    }

    pub fn layout(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "paging_view_layout",
            page = self.pager.current_page(),
            pages = self.pager.page_count()
        )
        .entered();

        self.pager.reload_if_needed();
        if self.needs_page_scrollable_update {
            self.update_page_scrollable();
        }
        self.sticky.layout_if_needed();
        self.pager.set_bounds(self.sticky.page_frame().size());
        self.pager.layout_if_needed();
        self.after_pager();
    }

    /// Advance animations. Returns `true` while one is running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let running = self.pager.tick(dt);
        self.after_pager();
        running
    }

    // --- Horizontal drag -------------------------------------------------

    pub fn should_begin_drag(&self, vx: f64) -> bool {
        self.pager.should_begin_drag(vx)
    }

    pub fn begin_drag(&mut self, vx: f64) -> bool {
        self.pager.begin_drag(vx)
    }

    pub fn drag_by(&mut self, dx: f64) {
        self.pager.drag_by(dx);
        self.after_pager();
    }

    pub fn end_drag(&mut self, vx: f64) {
        self.pager.end_drag(vx);
        self.after_pager();
    }

    // --- Vertical scrolling ----------------------------------------------

    pub fn scroll_container_by(&mut self, dy: f64) {
        self.sticky.scroll_container_by(dy);
    }

    pub fn set_container_offset(&mut self, y: f64) {
        self.sticky.set_container_offset(y);
    }

    pub fn scroll_page_by(&mut self, dy: f64) {
        self.sticky.scroll_child_by(dy);
    }

    pub fn set_page_offset(&mut self, y: f64) {
        self.sticky.set_child_offset(y);
    }

    /// Observe the active page's surface after it was moved externally.
    pub fn page_did_scroll(&mut self) {
        self.sticky.child_did_scroll();
    }

    // --- Gestures ---------------------------------------------------------

    fn position(&self) -> PagerPosition {
        PagerPosition {
            current_page: self.pager.current_page(),
            is_infinite: self.pager.is_infinite(),
        }
    }

    /// Whether `other` may run together with the horizontal drag.
    pub fn should_recognize_simultaneously(&self, other: GestureId) -> bool {
        self.gestures
            .should_recognize_simultaneously(other, self.position())
    }

    /// Whether the horizontal drag must wait for `other` to fail.
    pub fn should_require_failure(&self, other: GestureId, touch_x: f64) -> bool {
        self.gestures.should_require_failure(other, touch_x)
    }

    /// Whether `other` may run together with the container's vertical drag.
    pub fn container_should_recognize_simultaneously(&self, other: GestureId) -> bool {
        self.sticky.simultaneous_gestures().contains(other)
    }

    // --- Internals --------------------------------------------------------

    fn update_page_scrollable(&mut self) {
        self.needs_page_scrollable_update = false;
        let page = self
            .pager
            .current_page_content()
            .map(|page| page as &dyn PageScrollable);
        self.sticky.rebind(page);
    }

    fn after_pager(&mut self) {
        if !self.pager.take_page_change() {
            return;
        }
        self.update_page_scrollable();
        self.sticky.layout_if_needed();
        self.pager.set_bounds(self.sticky.page_frame().size());
        self.pager.layout_if_needed();
        // The follow-up pass reports the settled page again.
        self.pager.take_page_change();
    }
}
