#![forbid(unsafe_code)]

//! Windowed pane host with a recentering canvas.
//!
//! [`QueuingHost`] keeps at most two panes resident inside a canvas three
//! viewports wide. The visible rectangle is always kept near the middle slot:
//! whenever the offset drifts past half a viewport from center, offset and
//! panes move back by one viewport together, which looks like endless travel
//! in either direction. Neighbors are fetched lazily from a [`PaneSource`] as
//! an edge of the visible rectangle uncovers empty canvas.
//!
//! Each layout pass runs, in order:
//!
//! 1. **Sizing**: a new viewport size re-lays residents from slot 0.
//! 2. **Recentering**: keeps the offset within `[0.5w, 1.5w]`.
//! 3. **Tiling**: installs a staged pane, or inserts/evicts neighbors, and
//!    drives the appearance lifecycle of every pane it touches.
//! 4. **Progress**: reports `visible_pane_change` for the pass.
//!
//! All notifications for a pass are delivered before the call returns.
//!
//! # Invariants
//!
//! - At most two panes are resident after any pass.
//! - Once the viewport is non-empty the offset is within `[0.5w, 1.5w]`
//!   after every pass.
//! - `will_appear`/`did_appear` are never delivered to a pane that is
//!   already `Appeared`, and `did_appear` always follows `will_appear`.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No neighbor for an uncovered edge | Offset snaps back onto the edge pane |
//! | Neighbor already resident | Treated as no neighbor |
//! | Viewport unknown | Nothing is tiled; staged panes wait |
//! | Resize mid-animation | Motion cancelled, pending pane installed in the same pass |

use std::fmt;
use std::time::Duration;

use carousel_core::animation::{Animation, Tween, ease_in_out, ease_out_cubic};
use carousel_core::geometry::{Rect, Size};
use carousel_core::scroll::HorizontalDirection;

use crate::appearance::{AppearanceEvent, AppearanceState};
use crate::arena::PaneKey;

/// Tolerance for edge comparisons after fractional recentering.
const EDGE_EPSILON: f64 = 1e-6;

/// Release velocity (points per second) that counts as a flick.
pub const FLICK_VELOCITY: f64 = 300.0;

/// Default duration of a directed `set_pane` transition.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Default duration of the settle animation after a drag.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(250);

/// One-shot callback for [`QueuingHost::set_pane`].
pub type Completion = Box<dyn FnOnce()>;

/// Which way a directed `set_pane` travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// The new pane enters from the right.
    Forward,
    /// The new pane enters from the left.
    Reverse,
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Supplies neighbors for a resident pane.
pub trait PaneSource {
    fn pane_before(&mut self, key: PaneKey) -> Option<PaneKey>;
    fn pane_after(&mut self, key: PaneKey) -> Option<PaneKey>;
}

/// Receives lifecycle and scroll notifications from the host.
///
/// Every method has an empty default. Observers get keys only and cannot
/// reach back into the host during a pass.
#[allow(unused_variables)]
pub trait PaneObserver {
    fn will_move_to_host(&mut self, key: PaneKey, attaching: bool) {}
    fn did_move_to_host(&mut self, key: PaneKey, attached: bool) {}
    fn will_appear(&mut self, key: PaneKey, animated: bool) {}
    fn did_appear(&mut self, key: PaneKey) {}
    fn will_disappear(&mut self, key: PaneKey, animated: bool) {}
    fn did_disappear(&mut self, key: PaneKey) {}
    /// `progress` is 0.0 when a transition starts and 1.0 once `to` has
    /// settled. `from` is `None` when no other pane was involved.
    fn visible_pane_change(&mut self, from: Option<PaneKey>, to: PaneKey, progress: f64) {}
    fn will_begin_dragging(&mut self) {}
    fn did_end_dragging(&mut self) {}
}

impl PaneSource for () {
    fn pane_before(&mut self, _key: PaneKey) -> Option<PaneKey> {
        None
    }

    fn pane_after(&mut self, _key: PaneKey) -> Option<PaneKey> {
        None
    }
}

impl PaneObserver for () {}

// ---------------------------------------------------------------------------
// Pane bookkeeping
// ---------------------------------------------------------------------------

/// A resident pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pane {
    key: PaneKey,
    frame: Rect,
    state: AppearanceState,
}

impl Pane {
    fn new(key: PaneKey, frame: Rect) -> Self {
        Self {
            key,
            frame,
            state: AppearanceState::Unmounted,
        }
    }

    #[inline]
    pub fn key(&self) -> PaneKey {
        self.key
    }

    /// Frame in canvas coordinates.
    #[inline]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    #[inline]
    pub fn state(&self) -> AppearanceState {
        self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionKind {
    /// Animated `set_pane`.
    Directed,
    /// Paging settle after a drag.
    Settle,
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    kind: MotionKind,
    tween: Tween,
}

// ---------------------------------------------------------------------------
// QueuingHost
// ---------------------------------------------------------------------------

/// Hosts up to two panes on a recentering three-slot canvas.
pub struct QueuingHost {
    bounds: Size,
    viewport: Size,
    offset: f64,
    window: Vec<Pane>,
    /// Staged by `set_pane` until the next pass can install it.
    temp: Option<PaneKey>,
    /// Target of the last `set_pane`, until it appears.
    inserting: Option<PaneKey>,
    center: Option<PaneKey>,
    completion: Option<Completion>,
    drag_enabled: bool,
    dragging: bool,
    direction: HorizontalDirection,
    motion: Option<Motion>,
    needs_layout: bool,
    transition_duration: Duration,
    settle_duration: Duration,
}

impl fmt::Debug for QueuingHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuingHost")
            .field("viewport", &self.viewport)
            .field("offset", &self.offset)
            .field("window", &self.window)
            .field("temp", &self.temp)
            .field("inserting", &self.inserting)
            .field("center", &self.center)
            .field("has_completion", &self.completion.is_some())
            .field("drag_enabled", &self.drag_enabled)
            .field("motion", &self.motion.map(|m| m.kind))
            .finish_non_exhaustive()
    }
}

impl Default for QueuingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl QueuingHost {
    /// Create an empty, unsized host.
    pub fn new() -> Self {
        Self {
            bounds: Size::ZERO,
            viewport: Size::ZERO,
            offset: 0.0,
            window: Vec::with_capacity(3),
            temp: None,
            inserting: None,
            center: None,
            completion: None,
            drag_enabled: true,
            dragging: false,
            direction: HorizontalDirection::Stop,
            motion: None,
            needs_layout: false,
            transition_duration: DEFAULT_TRANSITION,
            settle_duration: DEFAULT_SETTLE,
        }
    }

    /// Set the directed transition duration (builder).
    #[must_use]
    pub fn with_transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }

    /// Set the drag settle duration (builder).
    #[must_use]
    pub fn with_settle_duration(mut self, duration: Duration) -> Self {
        self.settle_duration = duration;
        self
    }

    pub fn set_transition_duration(&mut self, duration: Duration) {
        self.transition_duration = duration;
    }

    pub fn set_settle_duration(&mut self, duration: Duration) {
        self.settle_duration = duration;
    }

    // --- Queries ----------------------------------------------------------

    /// Size requested by the embedder.
    #[inline]
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Size the last pass laid out with.
    #[inline]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Canvas size: three viewports wide.
    pub fn canvas_size(&self) -> Size {
        Size::new(self.viewport.width * 3.0, self.viewport.height)
    }

    /// Horizontal scroll offset into the canvas.
    #[inline]
    pub fn content_offset(&self) -> f64 {
        self.offset
    }

    /// The visible rectangle in canvas coordinates.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(self.offset, 0.0, self.viewport.width, self.viewport.height)
    }

    /// Resident panes, left to right.
    #[inline]
    pub fn panes(&self) -> &[Pane] {
        &self.window
    }

    /// The pane that most recently finished appearing.
    #[inline]
    pub fn center(&self) -> Option<PaneKey> {
        self.center
    }

    /// Appearance state of `key`; `Unmounted` if not resident.
    pub fn state_of(&self, key: PaneKey) -> AppearanceState {
        self.pane(key)
            .map_or(AppearanceState::Unmounted, |p| p.state)
    }

    /// Whether `key` is resident.
    pub fn is_resident(&self, key: PaneKey) -> bool {
        self.pane(key).is_some()
    }

    /// Whether the host still references `key` (resident, staged or
    /// being inserted).
    pub fn holds(&self, key: PaneKey) -> bool {
        self.is_resident(key) || self.temp == Some(key) || self.inserting == Some(key)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    #[inline]
    pub fn is_drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Last horizontal travel direction.
    #[inline]
    pub fn direction(&self) -> HorizontalDirection {
        self.direction
    }

    #[inline]
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    fn pane(&self, key: PaneKey) -> Option<&Pane> {
        self.window.iter().find(|p| p.key == key)
    }

    fn keys(&self) -> Vec<PaneKey> {
        self.window.iter().map(|p| p.key).collect()
    }

    fn has_size(&self) -> bool {
        !self.viewport.is_empty()
    }

    // --- Commands ---------------------------------------------------------

    /// Request a new size; applied on the next pass.
    pub fn set_bounds(&mut self, size: Size) {
        if self.bounds != size {
            self.bounds = size;
            self.needs_layout = true;
        }
    }

    pub fn set_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    /// Jump the offset, clamped to the canvas. Applied on the next pass.
    pub fn set_content_offset(&mut self, x: f64) {
        let x = x.clamp(0.0, self.viewport.width * 2.0);
        self.direction = HorizontalDirection::from_offsets(self.offset, x);
        self.offset = x;
        self.needs_layout = true;
    }

    /// Show `key`.
    ///
    /// A resident key completes immediately. Without a known size, without
    /// residents, or with `animated == false`, the key is staged and
    /// installed by the next pass. Otherwise the canvas animates one viewport
    /// in `direction` from the center pane (drive it with [`Self::tick`]) and
    /// drag stays disabled until the pane has appeared. A drag or settle in
    /// progress is abandoned: the next pass drops the half-shown neighbor.
    ///
    /// A completion still pending from an earlier call is dropped.
    pub fn set_pane(
        &mut self,
        key: PaneKey,
        direction: NavigationDirection,
        animated: bool,
        completion: Option<Completion>,
    ) {
        self.completion = None;

        if self.is_resident(key) {
            if let Some(done) = completion {
                done();
            }
            return;
        }

        self.inserting = Some(key);
        self.completion = completion;

        if !self.has_size() || self.window.is_empty() || !animated {
            self.temp = Some(key);
            self.needs_layout = true;
            return;
        }

        self.drag_enabled = false;
        self.dragging = false;
        let w = self.viewport.width;
        let anchor = self
            .center
            .and_then(|c| self.pane(c))
            .or(self.window.first())
            .map_or(w, |p| p.frame.left());
        let (target, travel) = match direction {
            NavigationDirection::Forward => (anchor + w, HorizontalDirection::Left),
            NavigationDirection::Reverse => (anchor - w, HorizontalDirection::Right),
        };
        self.direction = travel;
        self.motion = Some(Motion {
            kind: MotionKind::Directed,
            tween: Tween::new(self.offset, target, self.transition_duration).easing(ease_in_out),
        });
    }

    /// Evict every resident with full teardown and forget staged work.
    pub fn remove_all(&mut self, observer: &mut dyn PaneObserver) {
        for key in self.keys() {
            self.evict(key, observer);
        }
        self.center = None;
        self.inserting = None;
        self.temp = None;
        self.completion = None;
        self.motion = None;
        self.drag_enabled = true;
        self.dragging = false;
    }

    /// Advance any running animation by `dt` and lay out.
    ///
    /// Returns `true` while an animation is still running.
    pub fn tick(
        &mut self,
        dt: Duration,
        source: &mut dyn PaneSource,
        observer: &mut dyn PaneObserver,
    ) -> bool {
        let Some(motion) = self.motion.as_mut() else {
            return false;
        };
        motion.tween.tick(dt);
        let next = motion.tween.position();
        if motion.tween.is_complete() {
            self.motion = None;
        }
        self.direction = HorizontalDirection::from_offsets(self.offset, next);
        self.offset = next;
        self.layout(source, observer);
        self.motion.is_some()
    }

    // --- Drag -------------------------------------------------------------

    /// Start a horizontal drag. `vx` is the finger velocity.
    ///
    /// Refused with no residents or while a directed transition runs. A
    /// running settle animation is cancelled.
    pub fn begin_drag(&mut self, vx: f64, observer: &mut dyn PaneObserver) -> bool {
        if self.window.is_empty() || !self.drag_enabled {
            return false;
        }
        if self.motion.is_some_and(|m| m.kind == MotionKind::Settle) {
            self.motion = None;
        }
        self.dragging = true;
        self.direction = HorizontalDirection::from_velocity(vx);
        observer.will_begin_dragging();
        true
    }

    /// Move the finger by `dx`. Content follows the finger; the offset is
    /// clamped to `[0, 2w]`.
    pub fn drag_by(
        &mut self,
        dx: f64,
        source: &mut dyn PaneSource,
        observer: &mut dyn PaneObserver,
    ) {
        if !self.dragging {
            return;
        }
        let next = (self.offset - dx).clamp(0.0, self.viewport.width * 2.0);
        self.direction = HorizontalDirection::from_offsets(self.offset, next);
        self.offset = next;
        self.layout(source, observer);
    }

    /// Release the drag and settle onto a page boundary.
    ///
    /// Past [`FLICK_VELOCITY`] the page in the travel direction wins;
    /// otherwise the nearest one.
    pub fn end_drag(
        &mut self,
        vx: f64,
        source: &mut dyn PaneSource,
        observer: &mut dyn PaneObserver,
    ) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        observer.did_end_dragging();

        let target = self.settle_target(vx);
        self.direction = HorizontalDirection::from_offsets(self.offset, target);
        if (target - self.offset).abs() > EDGE_EPSILON {
            self.motion = Some(Motion {
                kind: MotionKind::Settle,
                tween: Tween::new(self.offset, target, self.settle_duration)
                    .easing(ease_out_cubic),
            });
        } else {
            self.offset = target;
            self.layout(source, observer);
        }
    }

    fn settle_target(&self, vx: f64) -> f64 {
        let w = self.viewport.width;
        if w <= 0.0 {
            return self.offset;
        }
        let base = self.window.first().map_or(0.0, |p| p.frame.left());
        let pages = (self.offset - base) / w;
        let page = if vx < -FLICK_VELOCITY {
            pages.ceil()
        } else if vx > FLICK_VELOCITY {
            pages.floor()
        } else {
            pages.round()
        };
        base + page * w
    }

    // --- Layout -----------------------------------------------------------

    /// Run a pass only if one was requested.
    pub fn layout_if_needed(&mut self, source: &mut dyn PaneSource, observer: &mut dyn PaneObserver) {
        if self.needs_layout {
            self.layout(source, observer);
        }
    }

    /// Run a full layout pass.
    pub fn layout(&mut self, source: &mut dyn PaneSource, observer: &mut dyn PaneObserver) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "queuing_layout",
            offset = self.offset,
            panes = self.window.len(),
            staged = self.temp.is_some()
        )
        .entered();

        self.needs_layout = false;
        if self.bounds != self.viewport {
            self.resize();
        }
        if !self.has_size() {
            return;
        }
        self.recenter();

        let before = self.keys();
        self.tile(source, observer);
        self.report_progress(&before, observer);
    }

    fn resize(&mut self) {
        self.viewport = self.bounds;
        let Size { width, height } = self.viewport;
        for (i, pane) in self.window.iter_mut().enumerate() {
            pane.frame = Rect::new(width * i as f64, 0.0, width, height);
        }
        if !self.window.is_empty() {
            self.offset = 0.0;
        }
        carousel_core::debug!(width, height, panes = self.window.len(), "queuing host resized");

        if let Some(motion) = self.motion.take()
            && motion.kind == MotionKind::Directed
            && let Some(key) = self.inserting
        {
            match self.pane(key) {
                Some(pane) => self.offset = pane.frame.left(),
                None => self.temp = Some(key),
            }
        }
    }

    fn recenter(&mut self) {
        let w = self.viewport.width;
        if w <= 0.0 {
            return;
        }
        loop {
            let delta = if self.offset > w * 1.5 {
                -w
            } else if self.offset < w * 0.5 {
                w
            } else {
                return;
            };
            self.offset += delta;
            for pane in &mut self.window {
                pane.frame = pane.frame.offset_x(delta);
            }
            if let Some(motion) = self.motion.as_mut() {
                motion.tween.shift(delta);
            }
        }
    }

    /// Pull the offset back onto `anchor` after an edge found no neighbor.
    fn snap_back(&mut self, anchor: f64) {
        carousel_core::trace!(from = self.offset, to = anchor, "no neighbor, snapping back");
        self.offset = anchor;
        if self.motion.is_some_and(|m| m.kind == MotionKind::Settle) {
            self.motion = None;
        }
        self.recenter();
        self.needs_layout = true;
    }

    fn neighbor(
        &self,
        of: PaneKey,
        direction: NavigationDirection,
        source: &mut dyn PaneSource,
    ) -> Option<PaneKey> {
        if let Some(key) = self.inserting.filter(|k| !self.is_resident(*k)) {
            return Some(key);
        }
        let found = match direction {
            NavigationDirection::Reverse => source.pane_before(of),
            NavigationDirection::Forward => source.pane_after(of),
        };
        found.filter(|k| !self.is_resident(*k))
    }

    fn tile(&mut self, source: &mut dyn PaneSource, observer: &mut dyn PaneObserver) {
        if self.temp.is_none()
            && self.window.len() > 1
            && self.motion.is_some_and(|m| m.kind == MotionKind::Directed)
            && self.inserting.is_some_and(|k| !self.is_resident(k))
        {
            self.collapse_to_center(observer);
        }

        let Size { width: w, height: h } = self.viewport;
        let visible = self.visible_rect();

        if let Some(key) = self.temp.take() {
            for resident in self.keys() {
                self.evict(resident, observer);
            }
            self.center = Some(key);
            self.mount(Pane::new(key, Rect::new(visible.left(), 0.0, w, h)), false, observer);
            self.emit(key, AppearanceEvent::WillAppear, false, observer);
            self.did_appear(key, observer);
            return;
        }

        let (Some(first), Some(last)) = (self.window.first().copied(), self.window.last().copied())
        else {
            return;
        };

        let mut left_insert = None;
        let mut right_insert = None;

        if first.frame.left() > visible.left() + EDGE_EPSILON {
            match self.neighbor(first.key, NavigationDirection::Reverse, source) {
                Some(key) => {
                    left_insert = Some(Pane::new(key, Rect::new(first.frame.left() - w, 0.0, w, h)));
                }
                None => self.snap_back(first.frame.left()),
            }
        }
        if last.frame.right() < visible.right() - EDGE_EPSILON {
            match self.neighbor(last.key, NavigationDirection::Forward, source) {
                Some(key) => {
                    right_insert = Some(Pane::new(key, Rect::new(last.frame.right(), 0.0, w, h)));
                }
                None => self.snap_back(last.frame.left()),
            }
        }

        let visible = self.visible_rect();
        let mut left_removing = self
            .window
            .first()
            .filter(|p| p.frame.right() <= visible.left() + EDGE_EPSILON)
            .map(|p| p.key);
        let mut right_removing = self
            .window
            .last()
            .filter(|p| p.frame.left() >= visible.right() - EDGE_EPSILON)
            .map(|p| p.key);

        if let Some(pane) = right_insert {
            if let Some(removing) = left_removing.take() {
                if let Some(old_last) = self.window.last().map(|p| p.key).filter(|k| *k != removing) {
                    self.settle_appeared(old_last, observer);
                }
                self.evict(removing, observer);
            }
            let key = pane.key;
            self.mount(pane, false, observer);
            self.emit(key, AppearanceEvent::WillAppear, true, observer);
            if let Some(leaving) = self.window.first().copied().filter(|p| p.key != key)
                && leaving.state.is_visible()
            {
                self.emit(leaving.key, AppearanceEvent::WillDisappear, true, observer);
            }
        }

        if let Some(pane) = left_insert {
            if let Some(removing) = right_removing.take() {
                if let Some(old_first) = self.window.first().map(|p| p.key).filter(|k| *k != removing) {
                    self.settle_appeared(old_first, observer);
                }
                self.evict(removing, observer);
            }
            let key = pane.key;
            self.mount(pane, true, observer);
            self.emit(key, AppearanceEvent::WillAppear, true, observer);
            if let Some(leaving) = self.window.last().copied().filter(|p| p.key != key)
                && leaving.state.is_visible()
            {
                self.emit(leaving.key, AppearanceEvent::WillDisappear, true, observer);
            }
        }

        if let Some(removing) = left_removing
            && self.window.len() > 1
        {
            if let Some(next) = self.window.last().map(|p| p.key).filter(|k| *k != removing) {
                self.settle_appeared(next, observer);
            }
            self.evict(removing, observer);
        }

        if let Some(removing) = right_removing
            && self.window.len() > 1
        {
            if let Some(previous) = self.window.first().map(|p| p.key).filter(|k| *k != removing) {
                self.settle_appeared(previous, observer);
            }
            self.evict(removing, observer);
        }

        // An offset jump can replace the only resident in one pass.
        if self.window.len() == 1 {
            let key = self.window[0].key;
            self.settle_appeared(key, observer);
        }
    }

    /// Reduce the window to the center pane before a directed transition
    /// that started with two residents, and restart the motion from it.
    fn collapse_to_center(&mut self, observer: &mut dyn PaneObserver) {
        let offset = self.offset;
        let Some(center) = self
            .center
            .and_then(|c| self.pane(c))
            .or_else(|| {
                self.window.iter().min_by(|a, b| {
                    let da = (a.frame.left() - offset).abs();
                    let db = (b.frame.left() - offset).abs();
                    da.total_cmp(&db)
                })
            })
            .copied()
        else {
            return;
        };

        for key in self.keys() {
            if key != center.key {
                self.evict(key, observer);
            }
        }
        self.center = Some(center.key);
        if self.state_of(center.key) != AppearanceState::Appeared {
            self.emit(center.key, AppearanceEvent::WillAppear, false, observer);
            self.emit(center.key, AppearanceEvent::DidAppear, false, observer);
        }

        let from = center.frame.left();
        if let Some(motion) = self.motion.as_mut() {
            let target = motion.tween.target();
            motion.tween = Tween::new(from, target, self.transition_duration).easing(ease_in_out);
        }
        self.direction = HorizontalDirection::from_offsets(self.offset, from);
        self.offset = from;
        self.recenter();
    }

    fn report_progress(&mut self, before: &[PaneKey], observer: &mut dyn PaneObserver) {
        let now = self.keys();
        match now.as_slice() {
            [] => {}
            [only] => {
                let from = if before.len() > 1 {
                    before.iter().find(|k| !now.contains(k)).copied()
                } else {
                    None
                };
                observer.visible_pane_change(from, *only, 1.0);
            }
            _ => {
                if before.len() > 1
                    && let Some(&gone) = before.iter().find(|k| !now.contains(k))
                    && let Some(&arrived) = before.iter().find(|k| **k != gone)
                {
                    observer.visible_pane_change(Some(gone), arrived, 1.0);
                }
                let Some(from) = self.center.filter(|c| now.contains(c)) else {
                    return;
                };
                let Some(to) = self.window.iter().find(|p| p.key != from).copied() else {
                    return;
                };
                if before != now.as_slice() {
                    observer.visible_pane_change(Some(from), to.key, 0.0);
                } else {
                    let overlap = to.frame.intersection(&self.visible_rect()).width;
                    let progress = if to.frame.width > 0.0 {
                        (overlap / to.frame.width).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    observer.visible_pane_change(Some(from), to.key, progress);
                }
            }
        }
    }

    // --- Appearance -------------------------------------------------------

    fn emit(
        &mut self,
        key: PaneKey,
        event: AppearanceEvent,
        animated: bool,
        observer: &mut dyn PaneObserver,
    ) {
        let Some(pane) = self.window.iter_mut().find(|p| p.key == key) else {
            carousel_core::warn!(?key, ?event, "appearance event for a pane that is not resident");
            return;
        };
        if !pane.state.is_valid_transition(event) {
            carousel_core::warn!(?key, from = ?pane.state, ?event, "unexpected appearance transition");
        }
        pane.state = pane.state.apply(event);
        match event {
            AppearanceEvent::WillMoveToHost { attaching } => observer.will_move_to_host(key, attaching),
            AppearanceEvent::DidMoveToHost { attached } => observer.did_move_to_host(key, attached),
            AppearanceEvent::WillAppear => observer.will_appear(key, animated),
            AppearanceEvent::DidAppear => observer.did_appear(key),
            AppearanceEvent::WillDisappear => observer.will_disappear(key, animated),
            AppearanceEvent::DidDisappear => observer.did_disappear(key),
        }
    }

    fn did_appear(&mut self, key: PaneKey, observer: &mut dyn PaneObserver) {
        self.center = Some(key);
        self.emit(key, AppearanceEvent::DidAppear, false, observer);
        if self.inserting == Some(key) {
            if let Some(done) = self.completion.take() {
                done();
            }
            self.inserting = None;
            self.drag_enabled = true;
        }
        self.completion = None;
    }

    /// Finish bringing `key` in, whatever state it was left in.
    fn settle_appeared(&mut self, key: PaneKey, observer: &mut dyn PaneObserver) {
        match self.state_of(key) {
            AppearanceState::Appeared => {}
            AppearanceState::Appearing => self.did_appear(key, observer),
            _ => {
                self.emit(key, AppearanceEvent::WillAppear, false, observer);
                self.did_appear(key, observer);
            }
        }
    }

    fn mount(&mut self, pane: Pane, at_front: bool, observer: &mut dyn PaneObserver) {
        let key = pane.key;
        if at_front {
            self.window.insert(0, pane);
        } else {
            self.window.push(pane);
        }
        self.emit(key, AppearanceEvent::WillMoveToHost { attaching: true }, false, observer);
        self.emit(key, AppearanceEvent::DidMoveToHost { attached: true }, false, observer);
    }

    /// Disappear (as far as still needed) and detach `key`.
    fn evict(&mut self, key: PaneKey, observer: &mut dyn PaneObserver) {
        match self.state_of(key) {
            AppearanceState::Disappeared => {}
            AppearanceState::Disappearing => {
                self.emit(key, AppearanceEvent::DidDisappear, false, observer);
            }
            _ => {
                self.emit(key, AppearanceEvent::WillDisappear, false, observer);
                self.emit(key, AppearanceEvent::DidDisappear, false, observer);
            }
        }
        self.emit(key, AppearanceEvent::WillMoveToHost { attaching: false }, false, observer);
        self.emit(key, AppearanceEvent::DidMoveToHost { attached: false }, false, observer);
        self.window.retain(|p| p.key != key);
        if self.center == Some(key) {
            self.center = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::arena::PaneArena;

    const W: f64 = 100.0;

    struct Strip {
        keys: Vec<PaneKey>,
        cyclic: bool,
    }

    impl Strip {
        fn new(n: usize, cyclic: bool) -> Self {
            let mut arena = PaneArena::new();
            Self {
                keys: (0..n).map(|i| arena.insert(i)).collect(),
                cyclic,
            }
        }

        fn pos(&self, key: PaneKey) -> usize {
            self.keys.iter().position(|k| *k == key).unwrap()
        }
    }

    impl PaneSource for Strip {
        fn pane_before(&mut self, key: PaneKey) -> Option<PaneKey> {
            match self.pos(key) {
                0 if self.cyclic => self.keys.last().copied(),
                0 => None,
                i => Some(self.keys[i - 1]),
            }
        }

        fn pane_after(&mut self, key: PaneKey) -> Option<PaneKey> {
            let i = self.pos(key) + 1;
            match self.keys.get(i) {
                Some(k) => Some(*k),
                None if self.cyclic => self.keys.first().copied(),
                None => None,
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<(PaneKey, &'static str)>,
        changes: Vec<(Option<PaneKey>, PaneKey, f64)>,
        drags: Vec<&'static str>,
    }

    impl Recorder {
        fn names_for(&self, key: PaneKey) -> Vec<&'static str> {
            self.events
                .iter()
                .filter(|(k, _)| *k == key)
                .map(|(_, n)| *n)
                .collect()
        }
    }

    impl PaneObserver for Recorder {
        fn will_move_to_host(&mut self, key: PaneKey, attaching: bool) {
            self.events.push((key, if attaching { "will_attach" } else { "will_detach" }));
        }
        fn did_move_to_host(&mut self, key: PaneKey, attached: bool) {
            self.events.push((key, if attached { "did_attach" } else { "did_detach" }));
        }
        fn will_appear(&mut self, key: PaneKey, _animated: bool) {
            self.events.push((key, "will_appear"));
        }
        fn did_appear(&mut self, key: PaneKey) {
            self.events.push((key, "did_appear"));
        }
        fn will_disappear(&mut self, key: PaneKey, _animated: bool) {
            self.events.push((key, "will_disappear"));
        }
        fn did_disappear(&mut self, key: PaneKey) {
            self.events.push((key, "did_disappear"));
        }
        fn visible_pane_change(&mut self, from: Option<PaneKey>, to: PaneKey, progress: f64) {
            self.changes.push((from, to, progress));
        }
        fn will_begin_dragging(&mut self) {
            self.drags.push("begin");
        }
        fn did_end_dragging(&mut self) {
            self.drags.push("end");
        }
    }

    fn mounted(strip: &mut Strip, rec: &mut Recorder, first: usize) -> QueuingHost {
        let mut host = QueuingHost::new();
        host.set_pane(strip.keys[first], NavigationDirection::Forward, false, None);
        host.set_bounds(Size::new(W, 50.0));
        host.layout_if_needed(strip, rec);
        host
    }

    #[test]
    fn staged_pane_installs_on_first_sized_pass() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = QueuingHost::new();
        host.set_pane(strip.keys[0], NavigationDirection::Forward, true, None);
        assert!(host.holds(strip.keys[0]));
        assert!(host.panes().is_empty());

        host.set_bounds(Size::new(W, 50.0));
        host.layout_if_needed(&mut strip, &mut rec);

        assert_eq!(host.content_offset(), W);
        assert_eq!(host.canvas_size(), Size::new(3.0 * W, 50.0));
        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.panes()[0].frame(), Rect::new(W, 0.0, W, 50.0));
        assert_eq!(
            rec.names_for(strip.keys[0]),
            ["will_attach", "did_attach", "will_appear", "did_appear"]
        );
        assert_eq!(rec.changes, [(None, strip.keys[0], 1.0)]);
        assert_eq!(host.center(), Some(strip.keys[0]));
    }

    #[test]
    fn dragging_reveals_neighbor_and_reports_progress() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);
        let (a, b) = (strip.keys[0], strip.keys[1]);
        rec.changes.clear();

        assert!(host.begin_drag(-10.0, &mut rec));
        host.drag_by(-30.0, &mut strip, &mut rec);
        assert_eq!(host.panes().len(), 2);
        assert_eq!(host.state_of(b), AppearanceState::Appearing);
        assert_eq!(host.state_of(a), AppearanceState::Disappearing);
        assert_eq!(rec.changes.last(), Some(&(Some(a), b, 0.0)));

        host.drag_by(-40.0, &mut strip, &mut rec);
        assert!((host.content_offset() - 70.0).abs() < 1e-9);
        let (from, to, progress) = *rec.changes.last().unwrap();
        assert_eq!((from, to), (Some(a), b));
        assert!((progress - 0.7).abs() < 1e-9);

        host.end_drag(0.0, &mut strip, &mut rec);
        while host.tick(Duration::from_millis(16), &mut strip, &mut rec) {}

        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.panes()[0].key(), b);
        assert_eq!(host.state_of(b), AppearanceState::Appeared);
        assert_eq!(host.content_offset(), W);
        assert_eq!(rec.changes.last(), Some(&(Some(a), b, 1.0)));
        assert_eq!(rec.drags, ["begin", "end"]);
        assert_eq!(
            rec.names_for(a),
            [
                "will_attach",
                "did_attach",
                "will_appear",
                "did_appear",
                "will_disappear",
                "did_disappear",
                "will_detach",
                "did_detach"
            ]
        );
    }

    #[test]
    fn missing_neighbor_snaps_back() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);

        assert!(host.begin_drag(10.0, &mut rec));
        host.drag_by(30.0, &mut strip, &mut rec);
        assert_eq!(host.content_offset(), W);
        assert_eq!(host.panes().len(), 1);
        assert!(host.needs_layout());
    }

    #[test]
    fn small_release_settles_back() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 1);
        let (b, c) = (strip.keys[1], strip.keys[2]);

        host.begin_drag(-5.0, &mut rec);
        host.drag_by(-20.0, &mut strip, &mut rec);
        assert!(host.is_resident(c));
        host.end_drag(0.0, &mut strip, &mut rec);
        while host.tick(Duration::from_millis(16), &mut strip, &mut rec) {}

        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.panes()[0].key(), b);
        assert_eq!(host.state_of(b), AppearanceState::Appeared);
        assert_eq!(
            rec.names_for(c),
            [
                "will_attach",
                "did_attach",
                "will_appear",
                "will_disappear",
                "did_disappear",
                "will_detach",
                "did_detach"
            ]
        );
    }

    #[test]
    fn flick_advances_past_halfway() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);

        host.begin_drag(-500.0, &mut rec);
        host.drag_by(-20.0, &mut strip, &mut rec);
        host.end_drag(-500.0, &mut strip, &mut rec);
        while host.tick(Duration::from_millis(16), &mut strip, &mut rec) {}

        assert_eq!(host.panes()[0].key(), strip.keys[1]);
    }

    #[test]
    fn animated_set_pane_completes_once() {
        let mut strip = Strip::new(5, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);
        let target = strip.keys[3];
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);

        host.set_pane(
            target,
            NavigationDirection::Forward,
            true,
            Some(Box::new(move || counter.set(counter.get() + 1))),
        );
        assert!(!host.is_drag_enabled());
        assert!(!host.begin_drag(-10.0, &mut rec));

        while host.tick(Duration::from_millis(50), &mut strip, &mut rec) {
            let offset = host.content_offset();
            assert!((0.5 * W..=1.5 * W).contains(&offset));
        }

        assert_eq!(fired.get(), 1);
        assert!(host.is_drag_enabled());
        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.panes()[0].key(), target);
        assert_eq!(host.center(), Some(target));
        host.layout(&mut strip, &mut rec);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn single_tick_jump_still_completes() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);
        let target = strip.keys[2];
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);

        host.set_pane(
            target,
            NavigationDirection::Forward,
            true,
            Some(Box::new(move || flag.set(true))),
        );
        assert!(!host.tick(Duration::from_secs(1), &mut strip, &mut rec));

        assert!(fired.get());
        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.state_of(target), AppearanceState::Appeared);
        assert_eq!(
            rec.names_for(target),
            ["will_attach", "did_attach", "will_appear", "did_appear"]
        );
    }

    #[test]
    fn reverse_set_pane_enters_from_left() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 2);
        let target = strip.keys[0];

        host.set_pane(target, NavigationDirection::Reverse, true, None);
        assert_eq!(host.direction(), HorizontalDirection::Right);
        host.tick(Duration::from_millis(20), &mut strip, &mut rec);
        assert_eq!(host.panes()[0].key(), target);
        while host.tick(Duration::from_millis(20), &mut strip, &mut rec) {}
        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.panes()[0].key(), target);
    }

    #[test]
    fn resident_set_pane_completes_immediately() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);
        let before = rec.events.len();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);

        host.set_pane(
            strip.keys[0],
            NavigationDirection::Forward,
            true,
            Some(Box::new(move || flag.set(true))),
        );
        assert!(fired.get());
        assert!(!host.is_animating());
        assert!(!host.needs_layout());
        assert_eq!(rec.events.len(), before);
    }

    #[test]
    fn superseded_completion_is_dropped() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = QueuingHost::new();
        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));
        let (f1, f2) = (Rc::clone(&first), Rc::clone(&second));

        host.set_pane(strip.keys[0], NavigationDirection::Forward, false, Some(Box::new(move || f1.set(true))));
        host.set_pane(strip.keys[1], NavigationDirection::Forward, false, Some(Box::new(move || f2.set(true))));
        host.set_bounds(Size::new(W, 50.0));
        host.layout_if_needed(&mut strip, &mut rec);

        assert!(!first.get());
        assert!(second.get());
        assert_eq!(host.panes()[0].key(), strip.keys[1]);
    }

    #[test]
    fn unanimated_set_pane_replaces_residents() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);

        host.set_pane(strip.keys[2], NavigationDirection::Forward, false, None);
        host.layout_if_needed(&mut strip, &mut rec);

        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.panes()[0].key(), strip.keys[2]);
        assert_eq!(
            rec.names_for(strip.keys[0])[4..],
            ["will_disappear", "did_disappear", "will_detach", "did_detach"]
        );
        assert_eq!(rec.changes.last(), Some(&(None, strip.keys[2], 1.0)));
    }

    #[test]
    fn resize_mid_animation_still_completes() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);

        host.set_pane(
            strip.keys[1],
            NavigationDirection::Forward,
            true,
            Some(Box::new(move || flag.set(true))),
        );
        host.tick(Duration::from_millis(100), &mut strip, &mut rec);
        assert!(host.is_resident(strip.keys[1]));

        host.set_bounds(Size::new(200.0, 80.0));
        host.layout(&mut strip, &mut rec);

        assert!(fired.get());
        assert!(!host.is_animating());
        assert!(host.is_drag_enabled());
        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.panes()[0].key(), strip.keys[1]);
        assert_eq!(host.panes()[0].frame(), Rect::new(200.0, 0.0, 200.0, 80.0));
        assert_eq!(host.content_offset(), 200.0);
    }

    #[test]
    fn single_pane_cycle_has_no_duplicate_neighbor() {
        let mut strip = Strip::new(1, true);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);

        host.begin_drag(-10.0, &mut rec);
        host.drag_by(-30.0, &mut strip, &mut rec);
        assert_eq!(host.panes().len(), 1);
        assert_eq!(host.content_offset(), W);
    }

    #[test]
    fn remove_all_tears_everything_down() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 0);
        host.begin_drag(-10.0, &mut rec);
        host.drag_by(-30.0, &mut strip, &mut rec);
        rec.events.clear();

        host.remove_all(&mut rec);

        assert!(host.panes().is_empty());
        assert_eq!(host.center(), None);
        assert_eq!(
            rec.names_for(strip.keys[0]),
            ["did_disappear", "will_detach", "did_detach"]
        );
        assert_eq!(
            rec.names_for(strip.keys[1]),
            ["will_disappear", "did_disappear", "will_detach", "did_detach"]
        );
    }

    #[test]
    fn set_content_offset_clamps() {
        let mut strip = Strip::new(3, false);
        let mut rec = Recorder::default();
        let mut host = mounted(&mut strip, &mut rec, 1);
        host.set_content_offset(10_000.0);
        assert_eq!(host.content_offset(), 2.0 * W);
        host.layout_if_needed(&mut strip, &mut rec);
        assert!((0.5 * W..=1.5 * W).contains(&host.content_offset()));
        assert!(host.panes().len() <= 2);
    }
}
