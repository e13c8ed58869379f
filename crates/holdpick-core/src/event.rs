#![forbid(unsafe_code)]

//! Raw input events as delivered by the embedding surface.
//!
//! The host (a browser shell, a native window, a test trace) provides
//! surface-pixel coordinates and a millisecond timestamp for every event.
//! These types are deliberately close to the DOM shapes they come from; the
//! [`pointer`](crate::pointer) module folds them into one pointer stream.
//!
//! # Design Notes
//!
//! - `touches` lists the contacts still on the surface, first contact first.
//!   On `TouchPhase::End` it is usually empty.
//! - `MouseInput::button` is the button that changed (down/up only);
//!   `MouseInput::buttons` is the mask of buttons held at event time.
//! - JSON encoding uses a `kind` tag and a compact `u8` button mask so that
//!   recorded traces stay stable and diff-friendly.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Mouse buttons held during an event (DOM `buttons` bit layout).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        const PRIMARY   = 0b001;
        const SECONDARY = 0b010;
        const MIDDLE    = 0b100;
    }
}

/// The button whose state changed in a down/up event (DOM `button` codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
    Other(u8),
}

impl MouseButton {
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Primary => 0,
            Self::Middle => 1,
            Self::Secondary => 2,
            Self::Other(n) => n,
        }
    }

    #[must_use]
    pub const fn from_u8(n: u8) -> Self {
        match n {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// Phase for touch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Phase for mouse events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MousePhase {
    Down,
    Move,
    Up,
}

/// One touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// Touch event with every active contact.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub touches: Vec<TouchPoint>,
    pub timestamp_ms: u64,
}

/// Mouse event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseInput {
    pub phase: MousePhase,
    pub button: Option<MouseButton>,
    pub buttons: MouseButtons,
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: u64,
}

/// The input surface lost focus or became hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurInput {
    pub timestamp_ms: u64,
}

/// Raw input event from the host surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "InputEventJson", from = "InputEventJson")]
pub enum InputEvent {
    Touch(TouchInput),
    Mouse(MouseInput),
    Blur(BlurInput),
}

impl InputEvent {
    /// Host timestamp of the event in milliseconds.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            Self::Touch(touch) => touch.timestamp_ms,
            Self::Mouse(mouse) => mouse.timestamp_ms,
            Self::Blur(blur) => blur.timestamp_ms,
        }
    }

    /// Single-contact touch event.
    #[must_use]
    pub fn touch(phase: TouchPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        let touches = match phase {
            TouchPhase::End | TouchPhase::Cancel => Vec::new(),
            TouchPhase::Start | TouchPhase::Move => vec![TouchPoint::new(0, x, y)],
        };
        Self::Touch(TouchInput {
            phase,
            touches,
            timestamp_ms,
        })
    }

    /// Primary-button mouse event; the held mask follows the phase.
    #[must_use]
    pub fn mouse(phase: MousePhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        let (button, buttons) = match phase {
            MousePhase::Down => (Some(MouseButton::Primary), MouseButtons::PRIMARY),
            MousePhase::Move => (None, MouseButtons::PRIMARY),
            MousePhase::Up => (Some(MouseButton::Primary), MouseButtons::empty()),
        };
        Self::Mouse(MouseInput {
            phase,
            button,
            buttons,
            x,
            y,
            timestamp_ms,
        })
    }

    #[must_use]
    pub const fn blur(timestamp_ms: u64) -> Self {
        Self::Blur(BlurInput { timestamp_ms })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum InputEventJson {
    Touch {
        phase: TouchPhase,
        #[serde(default)]
        touches: Vec<TouchPoint>,
        ts_ms: u64,
    },
    Mouse {
        phase: MousePhase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        button: Option<u8>,
        #[serde(default)]
        buttons: u8,
        x: f32,
        y: f32,
        ts_ms: u64,
    },
    Blur {
        ts_ms: u64,
    },
}

impl From<InputEvent> for InputEventJson {
    fn from(value: InputEvent) -> Self {
        match value {
            InputEvent::Touch(touch) => Self::Touch {
                phase: touch.phase,
                touches: touch.touches,
                ts_ms: touch.timestamp_ms,
            },
            InputEvent::Mouse(mouse) => Self::Mouse {
                phase: mouse.phase,
                button: mouse.button.map(MouseButton::to_u8),
                buttons: mouse.buttons.bits(),
                x: mouse.x,
                y: mouse.y,
                ts_ms: mouse.timestamp_ms,
            },
            InputEvent::Blur(blur) => Self::Blur {
                ts_ms: blur.timestamp_ms,
            },
        }
    }
}

impl From<InputEventJson> for InputEvent {
    fn from(value: InputEventJson) -> Self {
        match value {
            InputEventJson::Touch {
                phase,
                touches,
                ts_ms,
            } => Self::Touch(TouchInput {
                phase,
                touches,
                timestamp_ms: ts_ms,
            }),
            InputEventJson::Mouse {
                phase,
                button,
                buttons,
                x,
                y,
                ts_ms,
            } => Self::Mouse(MouseInput {
                phase,
                button: button.map(MouseButton::from_u8),
                buttons: MouseButtons::from_bits_truncate(buttons),
                x,
                y,
                timestamp_ms: ts_ms,
            }),
            InputEventJson::Blur { ts_ms } => Self::Blur(BlurInput {
                timestamp_ms: ts_ms,
            }),
        }
    }
}
