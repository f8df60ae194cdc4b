#![forbid(unsafe_code)]

//! Per-pane appearance lifecycle.
//!
//! Every pane the host mounts walks the same loop:
//!
//! ```text
//! Unmounted -> Appearing -> Appeared -> Disappearing -> Disappeared -> Unmounted
//! ```
//!
//! Attach/detach notifications bracket the loop; only a detach moves the
//! state (back to `Unmounted`). A pane that starts appearing and is pulled
//! away again may go `Appearing -> Disappearing`, and one that was leaving
//! may come back `Disappearing -> Appearing`.
//!
//! The host never panics on a bad transition; it asks
//! [`AppearanceState::is_valid_transition`] and logs.

/// Where a pane is in its appearance lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppearanceState {
    #[default]
    Unmounted,
    Appearing,
    Appeared,
    Disappearing,
    Disappeared,
}

/// A lifecycle notification, as emitted to [`crate::queuing::PaneObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppearanceEvent {
    /// About to be attached (`true`) or detached (`false`).
    WillMoveToHost { attaching: bool },
    /// Attached (`true`) or detached (`false`).
    DidMoveToHost { attached: bool },
    WillAppear,
    DidAppear,
    WillDisappear,
    DidDisappear,
}

impl AppearanceState {
    /// Successor state after `event`.
    ///
    /// Host moves other than a detach leave the state unchanged.
    #[must_use]
    pub const fn apply(self, event: AppearanceEvent) -> Self {
        match event {
            AppearanceEvent::WillAppear => Self::Appearing,
            AppearanceEvent::DidAppear => Self::Appeared,
            AppearanceEvent::WillDisappear => Self::Disappearing,
            AppearanceEvent::DidDisappear => Self::Disappeared,
            AppearanceEvent::DidMoveToHost { attached: false } => Self::Unmounted,
            AppearanceEvent::WillMoveToHost { .. } | AppearanceEvent::DidMoveToHost { .. } => self,
        }
    }

    /// Whether `event` is allowed from this state.
    pub const fn is_valid_transition(self, event: AppearanceEvent) -> bool {
        use AppearanceEvent as E;
        match (self, event) {
            (Self::Unmounted, E::WillMoveToHost { attaching: true })
            | (Self::Unmounted, E::DidMoveToHost { attached: true }) => true,
            (Self::Disappeared, E::WillMoveToHost { attaching: false })
            | (Self::Disappeared, E::DidMoveToHost { attached: false }) => true,
            // `will_disappear` may be skipped when a leaving pane is re-shown.
            (Self::Unmounted | Self::Disappearing | Self::Disappeared, E::WillAppear) => true,
            (Self::Appearing, E::DidAppear) => true,
            (Self::Appearing | Self::Appeared, E::WillDisappear) => true,
            (Self::Disappearing, E::DidDisappear) => true,
            _ => false,
        }
    }

    /// `true` while the pane is attached and on its way in or fully in.
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Appearing | Self::Appeared)
    }
}
