#![forbid(unsafe_code)]

//! Generational storage for pane content.
//!
//! The host and observers only ever see [`PaneKey`]s. A key names a slot and
//! the generation the slot had when the key was issued, so a key for content
//! that has since been released never aliases whatever reuses the slot.
//!
//! # Invariants
//!
//! - A key is live until [`PaneArena::remove`] (or `retain`/`clear`) drops its
//!   entry; afterwards every lookup with it returns `None`.
//! - Slot generations only grow (wrapping), so a stale key stays stale for
//!   2^32 reuses of its slot.

use std::fmt;

/// Stable handle to a pane's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneKey {
    slot: u32,
    generation: u32,
}

impl PaneKey {
    /// Slot index, for diagnostics.
    #[inline]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for PaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaneKey({}v{})", self.slot, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena keyed by [`PaneKey`].
#[derive(Debug, Clone)]
pub struct PaneArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for PaneArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PaneArena<T> {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value` and return its key.
    pub fn insert(&mut self, value: T) -> PaneKey {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.value = Some(value);
            return PaneKey {
                slot,
                generation: entry.generation,
            };
        }
        let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        PaneKey {
            slot,
            generation: 0,
        }
    }

    fn slot(&self, key: PaneKey) -> Option<&Slot<T>> {
        self.slots
            .get(key.slot as usize)
            .filter(|s| s.generation == key.generation)
    }

    pub fn get(&self, key: PaneKey) -> Option<&T> {
        self.slot(key).and_then(|s| s.value.as_ref())
    }

    /// Drop the entry for `key`, invalidating the key.
    pub fn remove(&mut self, key: PaneKey) -> Option<T> {
        let entry = self
            .slots
            .get_mut(key.slot as usize)
            .filter(|s| s.generation == key.generation)?;
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(key.slot);
        self.len -= 1;
        Some(value)
    }

    /// First key whose entry satisfies `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<PaneKey> {
        self.iter().find(|(_, v)| pred(v)).map(|(k, _)| k)
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PaneKey, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    PaneKey {
                        slot: i as u32,
                        generation: s.generation,
                    },
                    v,
                )
            })
        })
    }

    /// Keep only entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(PaneKey, &T) -> bool) {
        let doomed: Vec<PaneKey> = self
            .iter()
            .filter(|(k, v)| !keep(*k, v))
            .map(|(k, _)| k)
            .collect();
        for key in doomed {
            self.remove(key);
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.retain(|_, _| false);
    }
}
