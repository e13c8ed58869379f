#![forbid(unsafe_code)]

//! Pointer position → picker row index.
//!
//! Rows are laid out top to bottom, oldest first, so index `0` is the top row
//! and `n - 1` (the most recent candidate) is the bottom row.
//!
//! # Clamping
//!
//! | pointer `y`            | result                                   |
//! |------------------------|------------------------------------------|
//! | `y < top`              | `0`                                      |
//! | `top <= y <= bottom`   | `floor((y - top) / item_height)` clamped |
//! | `y > bottom`           | `n - 1`                                  |
//!
//! The mapping is monotonic non-decreasing in `y` and never leaves
//! `[0, n - 1]`.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Map a pointer `y` onto a row index in `[0, n - 1]`.
#[must_use]
pub fn map_to_index(
    y: f32,
    picker_top: f32,
    picker_bottom: f32,
    item_height: f32,
    n: NonZeroUsize,
) -> usize {
    let last = n.get() - 1;
    if y < picker_top {
        return 0;
    }
    if y > picker_bottom {
        return last;
    }
    // Float-to-int `as` saturates: NaN -> 0, +inf -> usize::MAX.
    let raw = ((y - picker_top) / item_height).floor();
    if raw <= 0.0 || raw.is_nan() {
        0
    } else {
        (raw as usize).min(last)
    }
}

/// The rows region of an open picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowBand {
    pub top: f32,
    pub bottom: f32,
    pub item_height: f32,
    pub count: NonZeroUsize,
}

impl RowBand {
    /// Band of `count` rows of `item_height` starting at `top`.
    #[must_use]
    pub fn new(top: f32, item_height: f32, count: NonZeroUsize) -> Self {
        Self {
            top,
            bottom: top + item_height * count.get() as f32,
            item_height,
            count,
        }
    }

    /// Row index under pointer `y`.
    #[inline]
    #[must_use]
    pub fn index_at(&self, y: f32) -> usize {
        map_to_index(y, self.top, self.bottom, self.item_height, self.count)
    }

    /// Index of the bottom row (the most recent candidate).
    #[inline]
    #[must_use]
    pub const fn last_index(&self) -> usize {
        self.count.get() - 1
    }

    /// Top edge of row `index`.
    #[must_use]
    pub fn row_top(&self, index: usize) -> f32 {
        self.top + self.item_height * index.min(self.last_index()) as f32
    }
}
