#![forbid(unsafe_code)]

//! Chat composer host for the holdpick gesture engine.
//!
//! Wraps a [`holdpick_core::GestureController`] with the state of a chat
//! input bar: draft text, a bounded list of recent items, the attached item,
//! and a view model of the open picker.

pub mod composer;
pub mod picker;
pub mod recent;

pub use composer::{Composer, ComposerEvent, OutgoingMessage};
pub use picker::{PICKER_HINT, PickerRow, PickerView};
pub use recent::{Identified, RecentItems};
