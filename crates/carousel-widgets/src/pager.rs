#![forbid(unsafe_code)]

//! Index-addressed paging on top of [`QueuingHost`].
//!
//! [`PageSequencer`] turns a [`PageDataSource`] (count, default index,
//! page-by-index) into the key-based [`PaneSource`] the host wants, and turns
//! the host's key-based progress reports back into index pairs for
//! [`PagingDelegate`]s.
//!
//! Every page handed to the host is first bound to its index in a
//! [`PaneArena`]. A binding is created once per distinct page value and is
//! never rewritten: fetching an equal page again returns the existing key
//! with the index it was first bound at. Bindings the host no longer holds are dropped
//! after each call that drives the host.
//!
//! # Settling
//!
//! The host reports a settled pane (progress 1.0) on every layout pass that
//! ends with a single resident, so `did_finish_scrolling` repeats while the
//! carousel is at rest. Delegates that only care about changes should
//! compare against the last index they saw.

use std::fmt;
use std::time::Duration;

use carousel_core::geometry::Size;

use crate::arena::{PaneArena, PaneKey};
use crate::queuing::{NavigationDirection, PaneObserver, PaneSource, QueuingHost};

/// Supplies pages by index.
pub trait PageDataSource {
    /// Page content handle. Equality decides whether two fetches returned
    /// the same page.
    type Page: PartialEq;

    fn page_count(&self) -> usize;

    /// Page shown after a reload. Out-of-range values fall back to 0.
    fn default_page_index(&self) -> isize {
        0
    }

    fn page_at(&mut self, index: usize) -> Self::Page;
}

/// Paging notifications, in page indices.
#[allow(unused_variables)]
pub trait PagingDelegate {
    fn will_begin_dragging(&mut self) {}
    fn did_end_dragging(&mut self) {}
    fn will_begin_scrolling(&mut self, from: usize, to: usize) {}
    fn is_scrolling(&mut self, from: usize, to: usize, progress: f64) {}
    fn did_finish_scrolling(&mut self, to: usize) {}
}

/// Handle returned by [`PageSequencer::add_delegate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelegateId(u64);

/// Index before `index`, wrapping to the last page when `infinite`.
pub fn index_before(index: usize, count: usize, infinite: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }
    match index.checked_sub(1) {
        Some(prev) => Some(prev),
        None if infinite => Some(count - 1),
        None => None,
    }
}

/// Index after `index`, wrapping to the first page when `infinite`.
pub fn index_after(index: usize, count: usize, infinite: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let next = index + 1;
    if next < count {
        Some(next)
    } else if infinite {
        Some(0)
    } else {
        None
    }
}

#[derive(Debug)]
struct BoundPage<P> {
    page: P,
    index: usize,
}

type Book<P> = PaneArena<BoundPage<P>>;

fn bind<P: PartialEq>(book: &mut Book<P>, page: P, index: usize) -> PaneKey {
    match book.find(|bound| bound.page == page) {
        Some(key) => key,
        None => book.insert(BoundPage { page, index }),
    }
}

// ---------------------------------------------------------------------------
// Host adapters
// ---------------------------------------------------------------------------

struct Neighbors<'a, D: PageDataSource> {
    source: &'a mut D,
    book: &'a mut Book<D::Page>,
    count: usize,
    infinite: bool,
}

impl<D: PageDataSource> Neighbors<'_, D> {
    fn resolve(
        &mut self,
        key: PaneKey,
        step: fn(usize, usize, bool) -> Option<usize>,
    ) -> Option<PaneKey> {
        let index = self.book.get(key)?.index;
        let next = step(index, self.count, self.infinite)?;
        let page = self.source.page_at(next);
        Some(bind(self.book, page, next))
    }
}

impl<D: PageDataSource> PaneSource for Neighbors<'_, D> {
    fn pane_before(&mut self, key: PaneKey) -> Option<PaneKey> {
        self.resolve(key, index_before)
    }

    fn pane_after(&mut self, key: PaneKey) -> Option<PaneKey> {
        self.resolve(key, index_after)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum HostEvent {
    Change {
        from: Option<PaneKey>,
        to: PaneKey,
        progress: f64,
    },
    BeginDrag,
    EndDrag,
}

/// Collects host notifications for dispatch once the host call returns.
#[derive(Debug, Default)]
struct EventLog(Vec<HostEvent>);

impl PaneObserver for EventLog {
    fn visible_pane_change(&mut self, from: Option<PaneKey>, to: PaneKey, progress: f64) {
        self.0.push(HostEvent::Change { from, to, progress });
    }

    fn will_begin_dragging(&mut self) {
        self.0.push(HostEvent::BeginDrag);
    }

    fn did_end_dragging(&mut self) {
        self.0.push(HostEvent::EndDrag);
    }
}

// ---------------------------------------------------------------------------
// PageSequencer
// ---------------------------------------------------------------------------

/// Pages through a [`PageDataSource`] with a [`QueuingHost`].
pub struct PageSequencer<D: PageDataSource> {
    source: D,
    host: QueuingHost,
    book: Book<D::Page>,
    delegates: Vec<(DelegateId, Box<dyn PagingDelegate>)>,
    next_delegate: u64,
    page_count: usize,
    current_page: usize,
    is_infinite: bool,
    is_paging_enabled: bool,
    nested: bool,
    needs_reload: bool,
    page_changed: bool,
}

impl<D: PageDataSource> fmt::Debug for PageSequencer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSequencer")
            .field("host", &self.host)
            .field("bound_pages", &self.book.len())
            .field("delegates", &self.delegates.len())
            .field("page_count", &self.page_count)
            .field("current_page", &self.current_page)
            .field("is_infinite", &self.is_infinite)
            .field("is_paging_enabled", &self.is_paging_enabled)
            .field("needs_reload", &self.needs_reload)
            .finish_non_exhaustive()
    }
}

impl<D: PageDataSource> PageSequencer<D> {
    /// Create a sequencer. Nothing is fetched until the first reload.
    pub fn new(source: D) -> Self {
        Self {
            source,
            host: QueuingHost::new(),
            book: PaneArena::new(),
            delegates: Vec::new(),
            next_delegate: 0,
            page_count: 0,
            current_page: 0,
            is_infinite: false,
            is_paging_enabled: true,
            nested: false,
            needs_reload: true,
            page_changed: false,
        }
    }

    /// Wrap around past the first and last page (builder).
    #[must_use]
    pub fn infinite(mut self, infinite: bool) -> Self {
        self.is_infinite = infinite;
        self
    }

    /// Allow or refuse horizontal drags (builder).
    #[must_use]
    pub fn paging_enabled(mut self, enabled: bool) -> Self {
        self.is_paging_enabled = enabled;
        self
    }

    /// Mark this sequencer as living inside another pager (builder).
    #[must_use]
    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Set animation durations (builder).
    #[must_use]
    pub fn durations(mut self, transition: Duration, settle: Duration) -> Self {
        self.host.set_transition_duration(transition);
        self.host.set_settle_duration(settle);
        self
    }

    // --- Accessors --------------------------------------------------------

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    pub fn host(&self) -> &QueuingHost {
        &self.host
    }

    #[inline]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Page count as of the last reload.
    #[inline]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Page index bound to `key`.
    pub fn index_of(&self, key: PaneKey) -> Option<usize> {
        self.book.get(key).map(|bound| bound.index)
    }

    /// Page content bound to `key`.
    pub fn page(&self, key: PaneKey) -> Option<&D::Page> {
        self.book.get(key).map(|bound| &bound.page)
    }

    /// Content of the current page, if it is still bound.
    pub fn current_page_content(&self) -> Option<&D::Page> {
        self.book
            .iter()
            .find(|(_, bound)| bound.index == self.current_page)
            .map(|(_, bound)| &bound.page)
    }

    /// Number of live page bindings.
    pub fn bound_pages(&self) -> usize {
        self.book.len()
    }

    pub fn is_infinite(&self) -> bool {
        self.is_infinite
    }

    pub fn set_infinite(&mut self, infinite: bool) {
        self.is_infinite = infinite;
    }

    pub fn is_paging_enabled(&self) -> bool {
        self.is_paging_enabled
    }

    pub fn set_paging_enabled(&mut self, enabled: bool) {
        self.is_paging_enabled = enabled;
    }

    pub fn is_nested(&self) -> bool {
        self.nested
    }

    pub fn set_nested(&mut self, nested: bool) {
        self.nested = nested;
    }

    pub fn set_durations(&mut self, transition: Duration, settle: Duration) {
        self.host.set_transition_duration(transition);
        self.host.set_settle_duration(settle);
    }

    // --- Delegates --------------------------------------------------------

    /// Replace every delegate with `delegate`.
    pub fn set_delegate(&mut self, delegate: Box<dyn PagingDelegate>) -> DelegateId {
        self.delegates.clear();
        self.add_delegate(delegate)
    }

    /// Add a delegate after the existing ones.
    pub fn add_delegate(&mut self, delegate: Box<dyn PagingDelegate>) -> DelegateId {
        let id = DelegateId(self.next_delegate);
        self.next_delegate += 1;
        self.delegates.push((id, delegate));
        id
    }

    pub fn remove_delegate(&mut self, id: DelegateId) -> Option<Box<dyn PagingDelegate>> {
        let pos = self.delegates.iter().position(|(d, _)| *d == id)?;
        Some(self.delegates.remove(pos).1)
    }

    // --- Reload -----------------------------------------------------------

    #[inline]
    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    pub fn set_needs_reload(&mut self) {
        self.needs_reload = true;
    }

    pub fn reload_if_needed(&mut self) {
        if self.needs_reload {
            self.reload();
        }
    }

    /// Drop every page and show the default page again.
    pub fn reload(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("pager_reload").entered();

        self.needs_reload = false;
        self.drive(|host, _, observer| host.remove_all(observer));
        self.book.clear();

        let count = self.source.page_count();
        self.page_count = count;
        self.current_page = 0;
        if count == 0 {
            carousel_core::debug!("pager reloaded with no pages");
            return;
        }

        let requested = self.source.default_page_index();
        let index = usize::try_from(requested)
            .ok()
            .filter(|i| *i < count)
            .unwrap_or(0);
        self.current_page = index;
        carousel_core::debug!(count, requested, index, "pager reloaded");

        let page = self.source.page_at(index);
        let key = bind(&mut self.book, page, index);
        self.host
            .set_pane(key, NavigationDirection::Forward, false, None);
    }

    /// Show page `index`.
    ///
    /// No-op when `index` is out of range, already current, or a reload is
    /// pending.
    pub fn scroll_to(&mut self, index: usize, animated: bool) {
        if self.needs_reload || index >= self.page_count || index == self.current_page {
            return;
        }
        let page = self.source.page_at(index);
        let key = bind(&mut self.book, page, index);
        let direction = if index > self.current_page {
            NavigationDirection::Forward
        } else {
            NavigationDirection::Reverse
        };
        self.host.set_pane(key, direction, animated, None);
        self.prune();
    }

    /// Tear down every page without reloading.
    pub fn remove_all(&mut self) {
        self.drive(|host, _, observer| host.remove_all(observer));
        self.book.clear();
        self.page_count = 0;
        self.current_page = 0;
    }

    // --- Layout and motion -----------------------------------------------

    pub fn set_bounds(&mut self, size: Size) {
        self.host.set_bounds(size);
    }

    pub fn layout(&mut self) {
        self.drive(|host, source, observer| host.layout(source, observer));
    }

    pub fn layout_if_needed(&mut self) {
        self.drive(|host, source, observer| host.layout_if_needed(source, observer));
    }

    /// Advance animations. Returns `true` while one is running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.drive(|host, source, observer| host.tick(dt, source, observer))
    }

    /// Whether a drag starting with finger velocity `vx` may begin.
    pub fn should_begin_drag(&self, vx: f64) -> bool {
        if !self.is_paging_enabled {
            return false;
        }
        if self.is_infinite || !self.nested {
            return true;
        }
        let last = self.page_count.checked_sub(1);
        if vx > 0.0 && self.current_page == 0 {
            return false;
        }
        if vx < 0.0 && Some(self.current_page) == last {
            return false;
        }
        true
    }

    pub fn begin_drag(&mut self, vx: f64) -> bool {
        if !self.should_begin_drag(vx) {
            return false;
        }
        self.drive(|host, _, observer| host.begin_drag(vx, observer))
    }

    pub fn drag_by(&mut self, dx: f64) {
        self.drive(|host, source, observer| host.drag_by(dx, source, observer));
    }

    pub fn end_drag(&mut self, vx: f64) {
        self.drive(|host, source, observer| host.end_drag(vx, source, observer));
    }

    /// `true` once per settle since the last call.
    pub fn take_page_change(&mut self) -> bool {
        std::mem::take(&mut self.page_changed)
    }

    // --- Internals --------------------------------------------------------

    fn drive<R>(
        &mut self,
        f: impl FnOnce(&mut QueuingHost, &mut dyn PaneSource, &mut dyn PaneObserver) -> R,
    ) -> R {
        let mut log = EventLog::default();
        let out = {
            let mut neighbors = Neighbors {
                source: &mut self.source,
                book: &mut self.book,
                count: self.page_count,
                infinite: self.is_infinite,
            };
            f(&mut self.host, &mut neighbors, &mut log)
        };
        for event in log.0 {
            self.dispatch(event);
        }
        self.prune();
        out
    }

    fn prune(&mut self) {
        let host = &self.host;
        self.book.retain(|key, _| host.holds(key));
    }

    fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::BeginDrag => {
                for (_, delegate) in &mut self.delegates {
                    delegate.will_begin_dragging();
                }
            }
            HostEvent::EndDrag => {
                for (_, delegate) in &mut self.delegates {
                    delegate.did_end_dragging();
                }
            }
            HostEvent::Change { from, to, progress } => self.dispatch_change(from, to, progress),
        }
    }

    fn dispatch_change(&mut self, from: Option<PaneKey>, to: PaneKey, progress: f64) {
        let to_index = self.index_of(to);
        let from_index = match from {
            Some(key) => self.index_of(key),
            None => to_index,
        };

        if progress >= 1.0 {
            self.page_changed = true;
            let Some(index) = to_index else {
                carousel_core::warn!(?to, "settled pane has no bound page index");
                return;
            };
            self.current_page = index;
            for (_, delegate) in &mut self.delegates {
                delegate.did_finish_scrolling(index);
            }
            return;
        }

        let (Some(from_index), Some(to_index)) = (from_index, to_index) else {
            carousel_core::warn!(?from, ?to, progress, "scrolling pane has no bound page index");
            return;
        };
        for (_, delegate) in &mut self.delegates {
            if progress <= 0.0 {
                delegate.will_begin_scrolling(from_index, to_index);
            } else {
                delegate.is_scrolling(from_index, to_index, progress);
            }
        }
    }
}
