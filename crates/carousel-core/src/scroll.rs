#![forbid(unsafe_code)]

//! Headless scroll surfaces.
//!
//! A [`ScrollView`] is the state of one scrollable region: how big it is, how
//! big its content is, where the content is scrolled to, and whether it may
//! overscroll. There is no physics here. Embedders feed offsets in (from
//! touch, wheel or a test) and read them back out.
//!
//! Surfaces that two components observe at once (a page's list and the
//! sticky-header coordinator) are shared as [`SharedScrollView`]. Sharing is
//! single-threaded and the type is `!Send`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geometry::{Insets, Point, Size};

/// Shared handle to a scroll surface.
pub type SharedScrollView = Rc<RefCell<ScrollView>>;

static NEXT_GESTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a pan gesture.
///
/// Gesture arbitration compares these instead of inspecting gesture types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(u64);

impl GestureId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_GESTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Vertical scroll direction, from the content's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalDirection {
    /// Offset increased: content moves up.
    Up,
    /// Offset decreased: content moves down.
    Down,
    #[default]
    Stop,
}

impl VerticalDirection {
    /// Classify the change from `old` to `new` offset.
    pub fn from_offsets(old: f64, new: f64) -> Self {
        if new > old {
            Self::Up
        } else if new < old {
            Self::Down
        } else {
            Self::Stop
        }
    }
}

/// Horizontal scroll direction, from the content's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalDirection {
    /// Offset increased: content moves left, new content enters on the right.
    Left,
    /// Offset decreased: content moves right, new content enters on the left.
    Right,
    #[default]
    Stop,
}

impl HorizontalDirection {
    /// Classify the change from `old` to `new` offset.
    pub fn from_offsets(old: f64, new: f64) -> Self {
        if new > old {
            Self::Left
        } else if new < old {
            Self::Right
        } else {
            Self::Stop
        }
    }

    /// Classify a finger velocity. Positive x means the finger moves right,
    /// which drags the content right.
    pub fn from_velocity(vx: f64) -> Self {
        if vx > 0.0 {
            Self::Right
        } else if vx < 0.0 {
            Self::Left
        } else {
            Self::Stop
        }
    }
}

/// A headless vertical/horizontal scroll surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollView {
    gesture: GestureId,
    /// Visible size.
    pub bounds: Size,
    /// Scrollable content size.
    pub content_size: Size,
    /// Current scroll position.
    pub content_offset: Point,
    /// Extra scrollable space around the content.
    pub content_inset: Insets,
    /// Whether offsets may leave the `[min, max]` range.
    pub bounces: bool,
}

impl Default for ScrollView {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl ScrollView {
    /// Create a surface with the given visible size and no content.
    pub fn new(bounds: Size) -> Self {
        Self {
            gesture: GestureId::next(),
            bounds,
            content_size: Size::ZERO,
            content_offset: Point::ZERO,
            content_inset: Insets::ZERO,
            bounces: false,
        }
    }

    /// Set the content size (builder).
    #[must_use]
    pub fn with_content_size(mut self, size: Size) -> Self {
        self.content_size = size;
        self
    }

    /// Set the content inset (builder).
    #[must_use]
    pub fn with_content_inset(mut self, insets: Insets) -> Self {
        self.content_inset = insets;
        self
    }

    /// Set bounce behaviour (builder).
    #[must_use]
    pub fn with_bounces(mut self, bounces: bool) -> Self {
        self.bounces = bounces;
        self
    }

    /// Wrap in a shared handle.
    pub fn into_shared(self) -> SharedScrollView {
        Rc::new(RefCell::new(self))
    }

    /// Identity of this surface's pan gesture.
    #[inline]
    pub fn gesture(&self) -> GestureId {
        self.gesture
    }

    /// Lowest resting vertical offset (content top under the inset).
    #[inline]
    pub fn min_offset_y(&self) -> f64 {
        -self.content_inset.top
    }

    /// Highest resting vertical offset. Never below [`Self::min_offset_y`].
    pub fn max_offset_y(&self) -> f64 {
        let max = self.content_size.height + self.content_inset.bottom - self.bounds.height;
        max.max(self.min_offset_y())
    }

    /// Set the offset verbatim, bypassing range checks.
    pub fn set_content_offset(&mut self, offset: Point) {
        self.content_offset = offset;
    }

    /// Set only the vertical offset, verbatim.
    pub fn set_offset_y(&mut self, y: f64) {
        self.content_offset.y = y;
    }

    /// Scroll vertically by `dy`, as a drag would.
    ///
    /// Without `bounces` the result is clamped to the resting range. Returns
    /// the new vertical offset.
    pub fn scroll_by(&mut self, dy: f64) -> f64 {
        let mut y = self.content_offset.y + dy;
        if !self.bounces {
            y = y.clamp(self.min_offset_y(), self.max_offset_y());
        }
        self.content_offset.y = y;
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(height: f64) -> ScrollView {
        ScrollView::new(Size::new(320.0, 400.0)).with_content_size(Size::new(320.0, height))
    }

    #[test]
    fn gesture_ids_are_unique() {
        let a = ScrollView::default();
        let b = ScrollView::default();
        assert_ne!(a.gesture(), b.gesture());
        assert_eq!(a.clone().gesture(), a.gesture());
    }

    #[test]
    fn offset_range_honours_insets() {
        let view = list(1000.0).with_content_inset(Insets::new(20.0, 0.0, 10.0, 0.0));
        assert_eq!(view.min_offset_y(), -20.0);
        assert_eq!(view.max_offset_y(), 610.0);
    }

    #[test]
    fn short_content_cannot_scroll() {
        let view = list(100.0);
        assert_eq!(view.max_offset_y(), view.min_offset_y());
    }

    #[test]
    fn scroll_by_clamps_without_bounce() {
        let mut view = list(1000.0);
        assert_eq!(view.scroll_by(-50.0), 0.0);
        assert_eq!(view.scroll_by(900.0), 600.0);
    }

    #[test]
    fn scroll_by_overscrolls_with_bounce() {
        let mut view = list(1000.0).with_bounces(true);
        assert_eq!(view.scroll_by(-50.0), -50.0);
        assert!(view.content_offset.y < view.min_offset_y());
    }

    #[test]
    fn set_content_offset_is_verbatim() {
        let mut view = list(100.0);
        view.set_content_offset(Point::new(0.0, 500.0));
        assert_eq!(view.content_offset.y, 500.0);
        assert!(view.content_offset.y > view.max_offset_y());
    }

    #[test]
    fn directions() {
        assert_eq!(VerticalDirection::from_offsets(0.0, 5.0), VerticalDirection::Up);
        assert_eq!(VerticalDirection::from_offsets(5.0, 0.0), VerticalDirection::Down);
        assert_eq!(VerticalDirection::from_offsets(5.0, 5.0), VerticalDirection::Stop);
        assert_eq!(HorizontalDirection::from_offsets(0.0, 5.0), HorizontalDirection::Left);
        assert_eq!(HorizontalDirection::from_velocity(12.0), HorizontalDirection::Right);
        assert_eq!(HorizontalDirection::from_velocity(0.0), HorizontalDirection::Stop);
    }

    #[test]
    fn shared_handle_is_visible_to_both_sides() {
        let shared = list(1000.0).into_shared();
        let other = Rc::clone(&shared);
        shared.borrow_mut().scroll_by(40.0);
        assert_eq!(other.borrow().content_offset.y, 40.0);
    }
}
