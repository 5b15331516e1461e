//! Event payloads delivered to callbacks
//!
//! Payloads are immutable snapshots captured when the raw notification
//! arrived, not views of live state: dispatch is deferred to the frame
//! boundary, and the state may have moved on by then.

use super::identity::{Button, Key};

/// Keyboard modifier snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub(crate) fn from_winit(state: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
            meta: state.super_key(),
        }
    }
}

/// A key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

/// A pointer-button transition, with the cursor position at the time of the
/// raw notification (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub button: Button,
    pub position: [f32; 2],
}

/// Pointer movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    pub position: [f32; 2],
}

/// Wheel motion, in pixel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta: [f32; 2],
    pub position: [f32; 2],
}
