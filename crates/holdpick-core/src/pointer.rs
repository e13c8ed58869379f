#![forbid(unsafe_code)]

//! Pointer normalization: one sample stream from touch and mouse input.
//!
//! Every raw [`InputEvent`] is dispatched exactly once, at this boundary, to
//! the [`NormalizePointer`] implementation of its variant. Downstream code
//! only ever sees [`PointerSignal`] values.
//!
//! # Rules
//!
//! - Touch start/move sample the first contact; additional fingers are ignored.
//! - Only the primary mouse button starts or ends a press.
//! - A mouse move that no longer reports the primary button held is treated as
//!   a release: the up-event landed outside the surface and was never delivered.
//! - Surface blur becomes a source-less cancel that applies to any session.
//!
//! Normalization is stateless; the same event always yields the same signal.

use serde::{Deserialize, Serialize};

use crate::event::{
    BlurInput, InputEvent, MouseButton, MouseButtons, MouseInput, MousePhase, TouchInput,
    TouchPhase,
};

/// The device family a pointer signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerSource {
    Touch,
    Mouse,
}

/// A single pointer position with its host timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: u64,
    pub source: PointerSource,
}

impl PointerSample {
    #[must_use]
    pub const fn new(x: f32, y: f32, timestamp_ms: u64, source: PointerSource) -> Self {
        Self {
            x,
            y,
            timestamp_ms,
            source,
        }
    }
}

/// Why a session was cancelled rather than released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The platform cancelled the pointer stream (e.g. `touchcancel`).
    PointerCancel,
    /// The input surface lost focus or was hidden.
    FocusLost,
    /// The owning component was torn down mid-gesture.
    Disposed,
}

/// Normalized gesture input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSignal {
    Start(PointerSample),
    Move(PointerSample),
    End {
        source: PointerSource,
        timestamp_ms: u64,
    },
    Cancel {
        /// `None` means the cancel applies regardless of which device is active.
        source: Option<PointerSource>,
        timestamp_ms: u64,
        reason: CancelReason,
    },
}

impl PointerSignal {
    /// Host timestamp carried by the signal.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        match self {
            Self::Start(sample) | Self::Move(sample) => sample.timestamp_ms,
            Self::End { timestamp_ms, .. } | Self::Cancel { timestamp_ms, .. } => *timestamp_ms,
        }
    }

    /// Device the signal came from, if it is tied to one.
    #[must_use]
    pub const fn source(&self) -> Option<PointerSource> {
        match self {
            Self::Start(sample) | Self::Move(sample) => Some(sample.source),
            Self::End { source, .. } => Some(*source),
            Self::Cancel { source, .. } => *source,
        }
    }

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Move(_) => "move",
            Self::End { .. } => "end",
            Self::Cancel { .. } => "cancel",
        }
    }
}

/// Conversion of one device-specific event into a pointer signal.
///
/// Returns `None` for events that carry no gesture meaning (a non-primary
/// button, a touch start without contacts, ...).
pub trait NormalizePointer {
    fn normalize(&self) -> Option<PointerSignal>;
}

impl NormalizePointer for TouchInput {
    fn normalize(&self) -> Option<PointerSignal> {
        let first = self.touches.first();
        match self.phase {
            TouchPhase::Start => first.map(|t| {
                PointerSignal::Start(PointerSample::new(
                    t.x,
                    t.y,
                    self.timestamp_ms,
                    PointerSource::Touch,
                ))
            }),
            TouchPhase::Move => first.map(|t| {
                PointerSignal::Move(PointerSample::new(
                    t.x,
                    t.y,
                    self.timestamp_ms,
                    PointerSource::Touch,
                ))
            }),
            TouchPhase::End => Some(PointerSignal::End {
                source: PointerSource::Touch,
                timestamp_ms: self.timestamp_ms,
            }),
            TouchPhase::Cancel => Some(PointerSignal::Cancel {
                source: Some(PointerSource::Touch),
                timestamp_ms: self.timestamp_ms,
                reason: CancelReason::PointerCancel,
            }),
        }
    }
}

impl NormalizePointer for MouseInput {
    fn normalize(&self) -> Option<PointerSignal> {
        let sample = PointerSample::new(self.x, self.y, self.timestamp_ms, PointerSource::Mouse);
        match self.phase {
            MousePhase::Down => {
                (self.button == Some(MouseButton::Primary)).then_some(PointerSignal::Start(sample))
            }
            MousePhase::Up => {
                (self.button == Some(MouseButton::Primary)).then_some(PointerSignal::End {
                    source: PointerSource::Mouse,
                    timestamp_ms: self.timestamp_ms,
                })
            }
            MousePhase::Move if self.buttons.contains(MouseButtons::PRIMARY) => {
                Some(PointerSignal::Move(sample))
            }
            MousePhase::Move => Some(PointerSignal::End {
                source: PointerSource::Mouse,
                timestamp_ms: self.timestamp_ms,
            }),
        }
    }
}

impl NormalizePointer for BlurInput {
    fn normalize(&self) -> Option<PointerSignal> {
        Some(PointerSignal::Cancel {
            source: None,
            timestamp_ms: self.timestamp_ms,
            reason: CancelReason::FocusLost,
        })
    }
}

impl NormalizePointer for InputEvent {
    fn normalize(&self) -> Option<PointerSignal> {
        match self {
            Self::Touch(touch) => touch.normalize(),
            Self::Mouse(mouse) => mouse.normalize(),
            Self::Blur(blur) => blur.normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TouchPoint;

    #[test]
    fn touch_start_uses_first_contact() {
        let ev = InputEvent::Touch(TouchInput {
            phase: TouchPhase::Start,
            touches: vec![TouchPoint::new(4, 10.0, 20.0), TouchPoint::new(5, 99.0, 99.0)],
            timestamp_ms: 3,
        });
        assert_eq!(
            ev.normalize(),
            Some(PointerSignal::Start(PointerSample::new(
                10.0,
                20.0,
                3,
                PointerSource::Touch
            )))
        );
    }

    #[test]
    fn touch_move_without_contacts_is_dropped() {
        let ev = InputEvent::Touch(TouchInput {
            phase: TouchPhase::Move,
            touches: Vec::new(),
            timestamp_ms: 3,
        });
        assert_eq!(ev.normalize(), None);
    }

    #[test]
    fn touch_end_and_cancel_are_bare_signals() {
        assert_eq!(
            InputEvent::touch(TouchPhase::End, 0.0, 0.0, 50).normalize(),
            Some(PointerSignal::End {
                source: PointerSource::Touch,
                timestamp_ms: 50
            })
        );
        assert_eq!(
            InputEvent::touch(TouchPhase::Cancel, 0.0, 0.0, 51).normalize(),
            Some(PointerSignal::Cancel {
                source: Some(PointerSource::Touch),
                timestamp_ms: 51,
                reason: CancelReason::PointerCancel,
            })
        );
    }

    #[test]
    fn secondary_button_is_ignored() {
        let ev = InputEvent::Mouse(MouseInput {
            phase: MousePhase::Down,
            button: Some(MouseButton::Secondary),
            buttons: MouseButtons::SECONDARY,
            x: 1.0,
            y: 1.0,
            timestamp_ms: 0,
        });
        assert_eq!(ev.normalize(), None);

        let up = InputEvent::Mouse(MouseInput {
            phase: MousePhase::Up,
            button: Some(MouseButton::Middle),
            buttons: MouseButtons::empty(),
            x: 1.0,
            y: 1.0,
            timestamp_ms: 1,
        });
        assert_eq!(up.normalize(), None);
    }

    #[test]
    fn mouse_move_with_primary_held_is_a_move() {
        let ev = InputEvent::mouse(MousePhase::Move, 5.0, 6.0, 9);
        assert_eq!(
            ev.normalize(),
            Some(PointerSignal::Move(PointerSample::new(
                5.0,
                6.0,
                9,
                PointerSource::Mouse
            )))
        );
    }

    #[test]
    fn mouse_move_after_lost_release_ends_the_press() {
        let ev = InputEvent::Mouse(MouseInput {
            phase: MousePhase::Move,
            button: None,
            buttons: MouseButtons::empty(),
            x: 5.0,
            y: 6.0,
            timestamp_ms: 9,
        });
        assert_eq!(
            ev.normalize(),
            Some(PointerSignal::End {
                source: PointerSource::Mouse,
                timestamp_ms: 9
            })
        );
    }

    #[test]
    fn blur_is_a_sourceless_cancel() {
        let signal = InputEvent::blur(12).normalize().expect("blur signal");
        assert_eq!(signal.source(), None);
        assert_eq!(signal.timestamp_ms(), 12);
        assert_eq!(signal.label(), "cancel");
    }
}
