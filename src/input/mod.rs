//! Input handling system
//!
//! Converts raw window notifications into application callbacks while
//! keeping key/button state queryable across discrete simulation steps:
//! - Folds raw transitions into double-buffered edge state as they arrive
//! - Defers every callback invocation and structural mutation to the
//!   two-phase frame protocol, so subscribing or unsubscribing from inside
//!   a running callback is always safe
//! - Routes dispatch through per-consumer scoped binding sets and the
//!   device's default set
//! - Lets binding sets be chained so one set's events propagate to another
//!
//! # Architecture
//!
//! ```text
//! Raw events (winit) → InputManager → Keyboard / Pointer
//!                                       (edge state + op queues)
//!                                              ↓
//!                                    scoped binding sets,
//!                                    then the default set
//!                                              ↓
//!                                         callbacks
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut input = InputManager::from_env();
//! input.attach(window.id())?;
//!
//! let jump = Binding::new(|event: &KeyEvent| { /* ... */ });
//! input.keyboard().add_on_pressed(Key::Space, jump);
//!
//! // In window_event()
//! input.window_event(window_id, &event);
//!
//! // Once per simulation step, in this order
//! input.begin_frame();
//! input.update(window_focused);
//! ```

mod binding;
mod edge;
mod error;
mod event;
mod frame;
mod identity;
mod key_bindings;
mod keyboard;
mod manager;
mod pointer;
mod pointer_bindings;
mod queue;
mod scope;

// Re-export public API
pub use binding::{Binding, BindingId};
pub use edge::{EdgeState, InputState};
pub use error::InputError;
pub use event::{ButtonEvent, KeyEvent, Modifiers, MotionEvent, WheelEvent};
pub use frame::FrameDevice;
pub use identity::{Button, InputId, Key};
pub use key_bindings::KeyBindings;
pub use keyboard::Keyboard;
pub use manager::{InputManager, InputScope};
pub use pointer::Pointer;
pub use pointer_bindings::PointerBindings;
pub use scope::ScopeId;
