#![forbid(unsafe_code)]

//! Gesture arbitration between the pager drag and surrounding gestures.
//!
//! Other gestures are identified by [`GestureId`] and registered into one of
//! three lists. The pager consults the lists when the platform asks whether
//! its drag may run together with, or must wait for, another gesture.
//!
//! | List | Simultaneous with pager drag | Pager waits for it to fail |
//! |------|------------------------------|----------------------------|
//! | `simultaneous` | always | never |
//! | `back_swipe` | on the first page of a non-infinite pager | touch within the leading edge zone |
//! | `row_swipe` | never | always |

use carousel_core::scroll::GestureId;

/// Width of the leading edge zone reserved for back-navigation swipes.
pub const BACK_SWIPE_EDGE_ZONE: f64 = 44.0;

/// Small ordered set of gesture ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureSet {
    ids: Vec<GestureId>,
}

impl GestureSet {
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Add `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: GestureId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`. Returns `false` if it was absent.
    pub fn remove(&mut self, id: GestureId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|g| *g != id);
        self.ids.len() != before
    }

    #[inline]
    pub fn contains(&self, id: GestureId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GestureId> + '_ {
        self.ids.iter().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Pager state the arbiter needs for its decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PagerPosition {
    pub current_page: usize,
    pub is_infinite: bool,
}

impl PagerPosition {
    /// On the first page with nothing to wrap to.
    #[inline]
    pub const fn at_leading_edge(self) -> bool {
        self.current_page == 0 && !self.is_infinite
    }
}

/// Registrable gesture priority lists.
#[derive(Debug, Clone)]
pub struct GestureArbiter {
    simultaneous: GestureSet,
    back_swipe: GestureSet,
    row_swipe: GestureSet,
    edge_zone: f64,
}

impl Default for GestureArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureArbiter {
    pub const fn new() -> Self {
        Self {
            simultaneous: GestureSet::new(),
            back_swipe: GestureSet::new(),
            row_swipe: GestureSet::new(),
            edge_zone: BACK_SWIPE_EDGE_ZONE,
        }
    }

    /// Override the leading edge zone width (builder).
    #[must_use]
    pub fn edge_zone(mut self, width: f64) -> Self {
        self.edge_zone = width.max(0.0);
        self
    }

    pub fn register_simultaneous(&mut self, id: GestureId) {
        self.simultaneous.insert(id);
    }

    pub fn register_back_swipe(&mut self, id: GestureId) {
        self.back_swipe.insert(id);
    }

    pub fn register_row_swipe(&mut self, id: GestureId) {
        self.row_swipe.insert(id);
    }

    /// Forget `id` in every list. Returns `true` if any list held it.
    pub fn unregister(&mut self, id: GestureId) -> bool {
        let a = self.simultaneous.remove(id);
        let b = self.back_swipe.remove(id);
        let c = self.row_swipe.remove(id);
        a || b || c
    }

    pub fn simultaneous(&self) -> &GestureSet {
        &self.simultaneous
    }

    pub fn back_swipe(&self) -> &GestureSet {
        &self.back_swipe
    }

    pub fn row_swipe(&self) -> &GestureSet {
        &self.row_swipe
    }

    /// Whether `other` may run together with the pager drag.
    pub fn should_recognize_simultaneously(&self, other: GestureId, position: PagerPosition) -> bool {
        if self.simultaneous.contains(other) {
            return true;
        }
        position.at_leading_edge() && self.back_swipe.contains(other)
    }

    /// Whether the pager drag must wait for `other` to fail.
    ///
    /// `touch_x` is the pager touch location in window coordinates.
    pub fn should_require_failure(&self, other: GestureId, touch_x: f64) -> bool {
        if self.row_swipe.contains(other) {
            return true;
        }
        touch_x <= self.edge_zone && self.back_swipe.contains(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (GestureId, GestureId, GestureId, GestureId) {
        (
            GestureId::next(),
            GestureId::next(),
            GestureId::next(),
            GestureId::next(),
        )
    }

    #[test]
    fn set_ignores_duplicates() {
        let mut set = GestureSet::new();
        let id = GestureId::next();
        assert!(set.insert(id));
        assert!(!set.insert(id));
        assert_eq!(set.len(), 1);
        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());
    }

    #[test]
    fn back_swipe_runs_together_only_on_leading_edge() {
        let (back, other, _, _) = ids();
        let mut arbiter = GestureArbiter::new();
        arbiter.register_back_swipe(back);

        let first = PagerPosition { current_page: 0, is_infinite: false };
        let second = PagerPosition { current_page: 1, is_infinite: false };
        let cyclic = PagerPosition { current_page: 0, is_infinite: true };

        assert!(arbiter.should_recognize_simultaneously(back, first));
        assert!(!arbiter.should_recognize_simultaneously(back, second));
        assert!(!arbiter.should_recognize_simultaneously(back, cyclic));
        assert!(!arbiter.should_recognize_simultaneously(other, first));
    }

    #[test]
    fn failure_requirements() {
        let (back, row, plain, _) = ids();
        let mut arbiter = GestureArbiter::new();
        arbiter.register_back_swipe(back);
        arbiter.register_row_swipe(row);

        assert!(arbiter.should_require_failure(row, 300.0));
        assert!(arbiter.should_require_failure(back, 44.0));
        assert!(!arbiter.should_require_failure(back, 44.5));
        assert!(!arbiter.should_require_failure(plain, 0.0));
    }

    #[test]
    fn registered_simultaneous_always_wins() {
        let (a, _, _, _) = ids();
        let mut arbiter = GestureArbiter::new();
        arbiter.register_simultaneous(a);
        assert!(arbiter.should_recognize_simultaneously(a, PagerPosition::default()));
        assert!(arbiter.unregister(a));
        assert!(!arbiter.should_recognize_simultaneously(a, PagerPosition::default()));
        assert!(!arbiter.unregister(a));
    }

    #[test]
    fn custom_edge_zone() {
        let (back, _, _, _) = ids();
        let mut arbiter = GestureArbiter::new().edge_zone(20.0);
        arbiter.register_back_swipe(back);
        assert!(arbiter.should_require_failure(back, 20.0));
        assert!(!arbiter.should_require_failure(back, 30.0));
    }
}
