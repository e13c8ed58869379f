#![forbid(unsafe_code)]

//! Tuning for the long-press gesture and the picker geometry.
//!
//! Both structs deserialize with per-field defaults, so a partial JSON
//! object (for example the `config` block of a replay trace) only needs to
//! name the values it overrides. Call [`GestureConfig::validate`] before use;
//! [`GestureController::new`](crate::gesture::GestureController::new) does.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default long-press duration in milliseconds.
pub const DEFAULT_LONG_PRESS_MS: u64 = 300;
/// Default height of one picker row in pixels.
pub const DEFAULT_ITEM_HEIGHT: f32 = 72.0;
/// Default number of recent items offered by the picker.
pub const DEFAULT_MAX_CANDIDATES: usize = 5;

/// Picker geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Height of one candidate row.
    pub item_height: f32,
    /// Preferred picker width; capped by the viewport.
    pub menu_width: f32,
    /// Vertical gap between the anchor's top edge and the picker.
    pub gap: f32,
    /// Minimum distance between the picker and the viewport's side edges.
    pub min_margin: f32,
    /// Padding around the row list inside the picker frame.
    pub list_padding: f32,
    /// Height of the hint footer below the rows.
    pub footer_height: f32,
    /// Upper bound on candidates the picker will show.
    pub max_candidates: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            item_height: DEFAULT_ITEM_HEIGHT,
            menu_width: 320.0,
            gap: 12.0,
            min_margin: 16.0,
            list_padding: 8.0,
            footer_height: 33.0,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Long-press gesture configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Time a press must be held before the picker opens.
    pub long_press_ms: u64,
    pub picker: PickerConfig,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            picker: PickerConfig::default(),
        }
    }
}

impl GestureConfig {
    /// Long-press threshold as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn long_press_threshold(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), GestureConfigError> {
        if self.long_press_ms == 0 {
            return Err(GestureConfigError::ZeroLongPress);
        }
        let picker = &self.picker;
        if !(picker.item_height.is_finite() && picker.item_height > 0.0) {
            return Err(GestureConfigError::InvalidLength {
                field: "item_height",
                value: picker.item_height,
            });
        }
        if !(picker.menu_width.is_finite() && picker.menu_width > 0.0) {
            return Err(GestureConfigError::InvalidLength {
                field: "menu_width",
                value: picker.menu_width,
            });
        }
        for (field, value) in [
            ("gap", picker.gap),
            ("min_margin", picker.min_margin),
            ("list_padding", picker.list_padding),
            ("footer_height", picker.footer_height),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GestureConfigError::InvalidLength { field, value });
            }
        }
        if picker.max_candidates == 0 {
            return Err(GestureConfigError::ZeroMaxCandidates);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureConfigError {
    ZeroLongPress,
    InvalidLength { field: &'static str, value: f32 },
    ZeroMaxCandidates,
}

impl fmt::Display for GestureConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLongPress => write!(f, "long-press duration must be > 0 ms"),
            Self::InvalidLength { field, value } => {
                write!(f, "invalid {field} value {value}")
            }
            Self::ZeroMaxCandidates => write!(f, "max_candidates must be > 0"),
        }
    }
}

impl std::error::Error for GestureConfigError {}
