#![forbid(unsafe_code)]

//! Read-only candidate snapshot offered by the picker.

use std::num::NonZeroUsize;
use std::sync::Arc;

/// Ordered candidates, oldest first; the last element is the most recent.
///
/// Cloning is cheap (shared slice), so a session can keep its own snapshot
/// while the host goes on updating its recency list.
#[derive(Debug)]
pub struct CandidateList<T> {
    items: Arc<[T]>,
}

impl<T> Clone for CandidateList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for CandidateList<T> {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }
}

impl<T> CandidateList<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }

    /// Keep only the `max` most recent entries of an oldest-first sequence.
    #[must_use]
    pub fn from_recent(items: impl IntoIterator<Item = T>, max: usize) -> Self {
        let mut items: Vec<T> = items.into_iter().collect();
        let skip = items.len().saturating_sub(max);
        items.drain(..skip);
        Self::new(items)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Length as a non-zero count, `None` for an empty list.
    #[inline]
    #[must_use]
    pub fn count(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.items.len())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Index of the most recent candidate.
    #[inline]
    #[must_use]
    pub fn most_recent_index(&self) -> Option<usize> {
        self.items.len().checked_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for CandidateList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<'a, T> IntoIterator for &'a CandidateList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
