#![forbid(unsafe_code)]

//! Picker placement relative to the anchor control.
//!
//! The picker opens directly above the anchor, right-aligned to it, and never
//! closer than `min_margin` to the viewport's right edge:
//!
//! ```text
//! bottom_offset = viewport_height - anchor_top + gap
//! right_offset  = max(min_margin, viewport_width - anchor_right)
//! ```
//!
//! Offsets are measured from the viewport's bottom and right edges (the way a
//! fixed-position overlay is styled). Placement is computed once when the
//! picker opens; scrolls or resizes during the same gesture do not move it.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::config::PickerConfig;
use crate::geometry::{Rect, Size};
use crate::index_map::RowBand;

/// Read access to the live geometry of the embedding surface.
///
/// Either value may be unavailable (element not mounted yet, zero-sized
/// window); positioning then degrades to zero offsets instead of failing.
pub trait GeometrySource {
    /// Bounding rectangle of the anchor control.
    fn anchor_rect(&self) -> Option<Rect>;
    /// Size of the viewport the picker is positioned in.
    fn viewport(&self) -> Option<Size>;
}

/// Geometry that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl GeometrySource for NoGeometry {
    fn anchor_rect(&self) -> Option<Rect> {
        None
    }

    fn viewport(&self) -> Option<Size> {
        None
    }
}

/// Fixed geometry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StaticGeometry {
    pub anchor: Option<Rect>,
    pub viewport: Option<Size>,
}

impl StaticGeometry {
    #[must_use]
    pub const fn new(anchor: Rect, viewport: Size) -> Self {
        Self {
            anchor: Some(anchor),
            viewport: Some(viewport),
        }
    }
}

impl GeometrySource for StaticGeometry {
    fn anchor_rect(&self) -> Option<Rect> {
        self.anchor
    }

    fn viewport(&self) -> Option<Size> {
        self.viewport
    }
}

/// Offsets of the picker from the viewport's bottom and right edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MenuPlacement {
    pub bottom_offset: f32,
    pub right_offset: f32,
}

/// Compute the picker placement for an anchor inside a viewport.
///
/// Returns zero offsets when either input is missing or not finite.
#[must_use]
pub fn position_menu(
    anchor: Option<Rect>,
    viewport: Option<Size>,
    config: &PickerConfig,
) -> MenuPlacement {
    let (Some(anchor), Some(viewport)) = (anchor, viewport) else {
        return MenuPlacement::default();
    };
    if !anchor.is_finite() || !viewport.is_finite() {
        return MenuPlacement::default();
    }
    MenuPlacement {
        bottom_offset: viewport.height - anchor.top() + config.gap,
        right_offset: config.min_margin.max(viewport.width - anchor.right()),
    }
}

/// Resolved picker geometry for one open session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickerLayout {
    pub placement: MenuPlacement,
    /// Whether placement used real anchor/viewport measurements.
    pub measured: bool,
    /// Outer picker frame, including padding and the hint footer.
    pub frame: Rect,
    /// Rows region used for pointer → index mapping.
    pub rows: RowBand,
}

impl PickerLayout {
    /// Lay out a picker of `count` rows for the given placement.
    #[must_use]
    pub fn compute(
        placement: MenuPlacement,
        viewport: Size,
        count: NonZeroUsize,
        config: &PickerConfig,
    ) -> Self {
        let max_width = (viewport.width - 2.0 * config.min_margin).max(0.0);
        let width = config.menu_width.min(max_width);
        let right = viewport.width - placement.right_offset;
        let bottom = viewport.height - placement.bottom_offset;
        let rows_height = config.item_height * count.get() as f32;
        let height = rows_height + 2.0 * config.list_padding + config.footer_height;
        let frame = Rect::from_edges(right - width, bottom - height, right, bottom);
        let rows = RowBand::new(frame.top() + config.list_padding, config.item_height, count);
        Self {
            placement,
            measured: false,
            frame,
            rows,
        }
    }

    /// Read geometry once and lay out the picker.
    #[must_use]
    pub fn resolve(geometry: &dyn GeometrySource, count: NonZeroUsize, config: &PickerConfig) -> Self {
        let anchor = geometry.anchor_rect();
        let viewport = geometry.viewport();
        let placement = position_menu(anchor, viewport, config);
        let measured = matches!(
            (anchor, viewport),
            (Some(a), Some(v)) if a.is_finite() && v.is_finite()
        );
        let viewport = viewport.filter(Size::is_finite).unwrap_or_default();
        Self {
            measured,
            ..Self::compute(placement, viewport, count, config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> StaticGeometry {
        StaticGeometry::new(Rect::new(334.0, 780.0, 44.0, 44.0), Size::new(390.0, 844.0))
    }

    #[test]
    fn placement_sits_above_anchor() {
        let config = PickerConfig::default();
        let placement = position_menu(phone().anchor, phone().viewport, &config);
        assert_eq!(placement.bottom_offset, 844.0 - 780.0 + 12.0);
    }

    #[test]
    fn right_offset_respects_min_margin() {
        let config = PickerConfig::default();
        // Anchor 12px from the right edge: margin wins.
        let placement = position_menu(phone().anchor, phone().viewport, &config);
        assert_eq!(placement.right_offset, 16.0);

        // Anchor 100px from the right edge: anchor alignment wins.
        let inset = Rect::new(246.0, 780.0, 44.0, 44.0);
        let placement = position_menu(Some(inset), phone().viewport, &config);
        assert_eq!(placement.right_offset, 100.0);
    }

    #[test]
    fn missing_geometry_gives_zero_offsets() {
        let config = PickerConfig::default();
        assert_eq!(
            position_menu(None, Some(Size::new(10.0, 10.0)), &config),
            MenuPlacement::default()
        );
        assert_eq!(
            position_menu(Some(Rect::new(0.0, 0.0, 1.0, 1.0)), None, &config),
            MenuPlacement::default()
        );
        let nan_anchor = Rect::new(f32::NAN, 0.0, 1.0, 1.0);
        assert_eq!(
            position_menu(Some(nan_anchor), Some(Size::new(10.0, 10.0)), &config),
            MenuPlacement::default()
        );
    }

    #[test]
    fn layout_stacks_rows_above_footer() {
        let config = PickerConfig::default();
        let five = NonZeroUsize::new(5).expect("non-zero");
        let layout = PickerLayout::resolve(&phone(), five, &config);
        assert!(layout.measured);
        // bottom = 844 - 76 = 768, height = 360 + 16 + 33 = 409.
        assert_eq!(layout.frame.bottom(), 768.0);
        assert_eq!(layout.frame.top(), 359.0);
        assert_eq!(layout.frame.right(), 374.0);
        assert_eq!(layout.frame.width, 320.0);
        assert_eq!(layout.rows.top, 367.0);
        assert_eq!(layout.rows.bottom, 727.0);
    }

    #[test]
    fn narrow_viewport_caps_width() {
        let config = PickerConfig::default();
        let geometry = StaticGeometry::new(Rect::new(250.0, 500.0, 44.0, 44.0), Size::new(300.0, 600.0));
        let layout = PickerLayout::resolve(&geometry, NonZeroUsize::MIN, &config);
        assert_eq!(layout.frame.width, 268.0);
    }

    #[test]
    fn unmeasured_layout_is_degenerate_but_usable() {
        let config = PickerConfig::default();
        let layout = PickerLayout::resolve(&NoGeometry, NonZeroUsize::MIN, &config);
        assert!(!layout.measured);
        assert_eq!(layout.placement, MenuPlacement::default());
        assert_eq!(layout.rows.index_at(0.0), 0);
        assert_eq!(layout.rows.last_index(), 0);
    }
}
