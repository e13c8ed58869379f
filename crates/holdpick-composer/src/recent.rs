#![forbid(unsafe_code)]

//! Recency list of attachable items.

use std::collections::VecDeque;
use std::fmt;

use holdpick_core::CandidateList;

/// Items with a stable identity.
pub trait Identified {
    type Id: PartialEq + fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Bounded recency list, oldest first.
///
/// Recording an item whose id is already present moves it to the end
/// (most recent); recording past capacity drops the oldest entry.
#[derive(Debug, Clone)]
pub struct RecentItems<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Identified> RecentItems<T> {
    /// Empty list holding at most `capacity` items (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// List seeded from an oldest-first sequence.
    #[must_use]
    pub fn with_items(capacity: usize, items: impl IntoIterator<Item = T>) -> Self {
        let mut recent = Self::new(capacity);
        for item in items {
            recent.record(item);
        }
        recent
    }

    /// Mark `item` as the most recent.
    pub fn record(&mut self, item: T) {
        if let Some(pos) = self.position(item.id()) {
            self.items.remove(pos);
        }
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    /// Remove the item with `id`.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let pos = self.position(id)?;
        self.items.remove(pos)
    }

    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.position(id).is_some()
    }

    /// The most recent item.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl<T: Identified + Clone> RecentItems<T> {
    /// Snapshot for a picker session.
    #[must_use]
    pub fn candidates(&self) -> CandidateList<T> {
        CandidateList::new(self.items.iter().cloned().collect())
    }
}
