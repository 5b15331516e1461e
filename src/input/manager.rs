//! Input facade: device ownership, window attachment, focus gating

use std::rc::Rc;

use tracing::{debug, warn};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use super::error::InputError;
use super::event::Modifiers;
use super::frame::FrameDevice;
use super::identity::{Button, Key};
use super::key_bindings::KeyBindings;
use super::keyboard::Keyboard;
use super::pointer::Pointer;
use super::pointer_bindings::PointerBindings;
use super::scope::{ScopeId, ScopeIds};
use crate::config::InputConfig;

/// Wheel line deltas converted to pixel units (approximate).
const WHEEL_LINE_TO_PIXELS: f32 = 20.0;

/// One consumer's isolated subscription sets across both devices.
///
/// Created and destroyed as a unit; the sets are invisible to every other
/// consumer and die with the scope.
pub struct InputScope {
    id: ScopeId,
    pub keyboard: KeyBindings,
    pub pointer: PointerBindings,
}

impl InputScope {
    pub fn id(&self) -> ScopeId {
        self.id
    }
}

/// Owns the concrete devices and the attachment to the window source.
///
/// The outer loop drives it with `begin_frame()` then `update(focused)`
/// exactly once each per simulation step, and feeds it raw window events
/// as they arrive in between.
pub struct InputManager {
    config: InputConfig,
    keyboard: Rc<Keyboard>,
    pointer: Rc<Pointer>,
    attached: Option<WindowId>,
    scale_factor: f32,
    modifiers: Modifiers,
    scope_ids: ScopeIds,
}

impl InputManager {
    pub fn new(config: InputConfig) -> Self {
        debug!(?config.focus, "input manager configured");
        Self {
            config,
            keyboard: Rc::new(Keyboard::new()),
            pointer: Rc::new(Pointer::new()),
            attached: None,
            scale_factor: 1.0,
            modifiers: Modifiers::default(),
            scope_ids: ScopeIds::new(),
        }
    }

    /// Creates a manager with configuration loaded from the environment,
    /// falling back to defaults when loading fails.
    pub fn from_env() -> Self {
        let config = InputConfig::load_from_env().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load input config, using defaults");
            InputConfig::default()
        });
        Self::new(config)
    }

    /// The keyboard device. Clone the `Rc` to subscribe from callbacks.
    pub fn keyboard(&self) -> &Rc<Keyboard> {
        &self.keyboard
    }

    /// The pointer device.
    pub fn pointer(&self) -> &Rc<Pointer> {
        &self.pointer
    }

    /// Binds the manager to one window. Re-attaching the currently
    /// attached window is a no-op; a different window is rejected until
    /// [`detach`](Self::detach).
    pub fn attach(&mut self, window: WindowId) -> Result<(), InputError> {
        match self.attached {
            Some(current) if current != window => Err(InputError::AlreadyAttached),
            _ => {
                debug!(?window, "attached to window");
                self.attached = Some(window);
                Ok(())
            }
        }
    }

    /// Unbinds from the attached window; no-op when unattached.
    pub fn detach(&mut self) {
        if let Some(window) = self.attached.take() {
            debug!(?window, "detached from window");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Updates the DPI scale used to report logical cursor coordinates.
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
    }

    /// Translates a winit window event into raw device notifications.
    /// Events from windows other than the attached one are ignored.
    pub fn window_event(&mut self, window: WindowId, event: &WindowEvent) {
        if self.attached != Some(window) {
            return;
        }

        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = Modifiers::from_winit(modifiers.state());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key
                    && let Some(key) = Key::from_winit(code)
                {
                    match event.state {
                        ElementState::Pressed => self.keyboard.on_raw_pressed(key, self.modifiers),
                        ElementState::Released => {
                            self.keyboard.on_raw_released(key, self.modifiers)
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.on_raw_moved([
                    position.x as f32 / self.scale_factor,
                    position.y as f32 / self.scale_factor,
                ]);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = Button::from_winit(*button) {
                    match state {
                        ElementState::Pressed => self.pointer.on_raw_pressed(button),
                        ElementState::Released => self.pointer.on_raw_released(button),
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => {
                        [x * WHEEL_LINE_TO_PIXELS, y * WHEEL_LINE_TO_PIXELS]
                    }
                    MouseScrollDelta::PixelDelta(pos) => [pos.x as f32, pos.y as f32],
                };
                self.pointer.on_raw_wheel(delta);
            }

            _ => {}
        }
    }

    /// First frame phase: applies queued structural mutations on every
    /// device, keyboard first.
    pub fn begin_frame(&self) {
        for device in self.devices() {
            device.begin_frame();
        }
    }

    /// Second frame phase: runs queued dispatch per device under the
    /// focus-gating policy, then commits edge state.
    ///
    /// The global gate masks both devices; the per-device flags layer
    /// beneath it.
    pub fn update(&self, focused: bool) {
        let focus = &self.config.focus;
        let any = if focus.focused_input_only {
            focused
        } else {
            true
        };
        let keyboard = any
            && if focus.focused_keyboard_only {
                focused
            } else {
                true
            };
        let pointer = any
            && if focus.focused_pointer_only {
                focused
            } else {
                true
            };

        self.keyboard.update(keyboard);
        self.pointer.update(pointer);
    }

    /// Creates an isolated subscription scope across both devices.
    pub fn create_scope(&self) -> InputScope {
        let id = self.scope_ids.issue();
        InputScope {
            id,
            keyboard: self.keyboard.create_scoped_bindings(id),
            pointer: self.pointer.create_scoped_bindings(id),
        }
    }

    /// Destroys a scope on both devices. Dispatch already queued for the
    /// scope is skipped, not an error.
    pub fn remove_scope(&self, id: ScopeId) {
        self.keyboard.remove_scoped_bindings(id);
        self.pointer.remove_scoped_bindings(id);
    }

    fn devices(&self) -> [&dyn FrameDevice; 2] {
        [self.keyboard.as_ref(), self.pointer.as_ref()]
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FocusConfig;
    use crate::input::binding::Binding;
    use std::cell::Cell;

    fn manager_with_focus(focus: FocusConfig) -> InputManager {
        let mut config = InputConfig::default();
        config.focus = focus;
        InputManager::new(config)
    }

    fn press_counter(manager: &InputManager, key: Key) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        manager
            .keyboard()
            .add_on_pressed(key, Binding::new(move |_| c.set(c.get() + 1)));
        manager.begin_frame();
        count
    }

    #[test]
    fn test_attach_rejects_second_window() {
        let mut manager = manager_with_focus(FocusConfig::default());
        let first = WindowId::from(1u64);
        let second = WindowId::from(2u64);

        assert_eq!(manager.attach(first), Ok(()));
        // Same window again: no-op.
        assert_eq!(manager.attach(first), Ok(()));
        assert_eq!(manager.attach(second), Err(InputError::AlreadyAttached));

        manager.detach();
        assert!(!manager.is_attached());
        assert_eq!(manager.attach(second), Ok(()));
    }

    #[test]
    fn test_detach_when_unattached_is_a_no_op() {
        let mut manager = manager_with_focus(FocusConfig::default());
        manager.detach();
        assert!(!manager.is_attached());
    }

    #[test]
    fn test_global_gate_masks_devices() {
        let manager = manager_with_focus(FocusConfig {
            focused_input_only: true,
            focused_keyboard_only: false,
            focused_pointer_only: false,
        });
        let count = press_counter(&manager, Key::A);

        manager.keyboard().on_raw_pressed(Key::A, Modifiers::default());
        manager.begin_frame();
        manager.update(false);
        assert_eq!(count.get(), 0);

        manager.keyboard().on_raw_released(Key::A, Modifiers::default());
        manager.keyboard().on_raw_pressed(Key::A, Modifiers::default());
        manager.begin_frame();
        manager.update(true);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_per_device_gate_layers_under_global() {
        let manager = manager_with_focus(FocusConfig {
            focused_input_only: false,
            focused_keyboard_only: true,
            focused_pointer_only: false,
        });
        let keys = press_counter(&manager, Key::B);

        let clicks = Rc::new(Cell::new(0));
        let c = Rc::clone(&clicks);
        manager
            .pointer()
            .add_on_pressed(Button::Left, Binding::new(move |_| c.set(c.get() + 1)));
        manager.begin_frame();

        manager.keyboard().on_raw_pressed(Key::B, Modifiers::default());
        manager.pointer().on_raw_pressed(Button::Left);
        manager.begin_frame();
        manager.update(false);

        // Keyboard is focus-gated, the pointer is not.
        assert_eq!(keys.get(), 0);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_scopes_are_isolated_and_removable() {
        let manager = manager_with_focus(FocusConfig::default());
        let scope_a = manager.create_scope();
        let scope_b = manager.create_scope();
        assert_ne!(scope_a.id(), scope_b.id());

        let count_a = Rc::new(Cell::new(0));
        let c = Rc::clone(&count_a);
        scope_a
            .keyboard
            .add_on_pressed(Key::C, Binding::new(move |_| c.set(c.get() + 1)));
        let count_b = Rc::new(Cell::new(0));
        let c = Rc::clone(&count_b);
        scope_b
            .keyboard
            .add_on_pressed(Key::C, Binding::new(move |_| c.set(c.get() + 1)));

        manager.keyboard().on_raw_pressed(Key::C, Modifiers::default());
        manager.begin_frame();
        manager.update(true);
        assert_eq!(count_a.get(), 1);
        assert_eq!(count_b.get(), 1);

        manager.remove_scope(scope_a.id());
        manager.keyboard().on_raw_released(Key::C, Modifiers::default());
        manager.keyboard().on_raw_pressed(Key::C, Modifiers::default());
        manager.begin_frame();
        manager.update(true);
        assert_eq!(count_a.get(), 1);
        assert_eq!(count_b.get(), 2);
    }
}
