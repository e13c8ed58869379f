#![forbid(unsafe_code)]

//! Core: input normalization, picker geometry, and the long-press state machine.
//!
//! # Role in holdpick
//! `holdpick-core` is the engine behind a press-hold-drag-select control. A
//! short press on the anchor is a plain tap; holding it past the long-press
//! threshold opens a picker of recent items above the anchor, dragging moves
//! the highlight, and releasing commits the highlighted item.
//!
//! # Primary responsibilities
//! - **Input**: raw touch/mouse/blur events ([`event`]) normalized into one
//!   [`PointerSignal`] stream ([`pointer`]).
//! - **Geometry**: picker placement above the anchor ([`positioner`]) and
//!   pointer-y to row index mapping ([`index_map`]).
//! - **Gesture**: the [`GestureController`] state machine with its one-shot
//!   timer ([`timer`]) and global input capture ([`capture`]).
//!
//! # How it fits in the system
//! Hosts (`holdpick-composer`, the replay harness, a UI binding) feed events
//! and timer polls into a [`GestureController`] and apply the returned
//! [`GestureEffect`]s, either directly or through [`GestureHost`] callbacks.
//! The engine never reads a clock on its own; every decision is a function
//! of the timestamps it is given, so traces replay deterministically.

pub mod candidates;
pub mod capture;
pub mod clock;
pub mod config;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod index_map;
pub mod pointer;
pub mod positioner;
pub mod timer;

pub use candidates::CandidateList;
pub use capture::{CaptureCommand, CaptureLedger, CaptureLedgerError, CaptureScope, ScopeId};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{GestureConfig, GestureConfigError, PickerConfig};
pub use event::{
    BlurInput, InputEvent, MouseButton, MouseButtons, MouseInput, MousePhase, TouchInput,
    TouchPhase, TouchPoint,
};
pub use geometry::{Rect, Size};
pub use gesture::{
    GestureController, GestureEffect, GestureHost, GestureNoopReason, GesturePhase,
    GestureTransition, SessionId, SessionOutcome,
};
pub use index_map::{RowBand, map_to_index};
pub use pointer::{CancelReason, NormalizePointer, PointerSample, PointerSignal, PointerSource};
pub use positioner::{
    GeometrySource, MenuPlacement, NoGeometry, PickerLayout, StaticGeometry, position_menu,
};
pub use timer::{OneShotTimer, TimerId};
