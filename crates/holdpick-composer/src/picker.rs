#![forbid(unsafe_code)]

//! View model of the open picker.

use holdpick_core::{CandidateList, PickerLayout, Rect};

/// Hint shown in the picker footer.
pub const PICKER_HINT: &str = "Slide up/down to select, release to attach";

/// One rendered candidate row.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerRow<T> {
    pub index: usize,
    pub item: T,
    pub highlighted: bool,
    pub frame: Rect,
}

/// Everything a UI layer needs to draw the open picker.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerView<T> {
    pub layout: PickerLayout,
    pub rows: Vec<PickerRow<T>>,
    pub hint: &'static str,
}

impl<T: Clone> PickerView<T> {
    /// Build the rows for `candidates`, top row first.
    #[must_use]
    pub fn build(layout: PickerLayout, candidates: &CandidateList<T>, highlighted: usize) -> Self {
        let band = layout.rows;
        let inset = band.top - layout.frame.top();
        let width = (layout.frame.width - 2.0 * inset).max(0.0);
        let rows = candidates
            .iter()
            .take(band.count.get())
            .enumerate()
            .map(|(index, item)| PickerRow {
                index,
                item: item.clone(),
                highlighted: index == highlighted,
                frame: Rect::new(
                    layout.frame.left() + inset,
                    band.row_top(index),
                    width,
                    band.item_height,
                ),
            })
            .collect();
        Self {
            layout,
            rows,
            hint: PICKER_HINT,
        }
    }
}

impl<T> PickerView<T> {
    /// Move the highlight to `index`.
    pub fn set_highlighted(&mut self, index: usize) {
        for row in &mut self.rows {
            row.highlighted = row.index == index;
        }
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&PickerRow<T>> {
        self.rows.iter().find(|row| row.highlighted)
    }

    /// Row whose frame contains the point, if any.
    #[must_use]
    pub fn row_at(&self, x: f32, y: f32) -> Option<&PickerRow<T>> {
        self.rows.iter().find(|row| row.frame.contains(x, y))
    }
}
