//! Pointer device

use std::cell::{Cell, RefCell};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::binding::{Binding, BindingId};
use super::edge::{EdgeState, InputState};
use super::error::InputError;
use super::event::{ButtonEvent, MotionEvent, WheelEvent};
use super::frame::FrameDevice;
use super::identity::{Button, InputId};
use super::pointer_bindings::PointerBindings;
use super::queue::OpQueue;
use super::scope::ScopeId;

enum StructuralOp {
    BindPressed {
        button: Button,
        binding: Binding<ButtonEvent>,
    },
    BindReleased {
        button: Button,
        binding: Binding<ButtonEvent>,
    },
    UnbindPressed {
        button: Button,
        id: BindingId,
    },
    UnbindReleased {
        button: Button,
        id: BindingId,
    },
    BindMoved(Binding<MotionEvent>),
    UnbindMoved(BindingId),
    BindWheel(Binding<WheelEvent>),
    UnbindWheel(BindingId),
}

enum DispatchOp {
    Pressed(ButtonEvent),
    Released(ButtonEvent),
    Moved(MotionEvent),
    Wheel(WheelEvent),
}

/// The pointer device.
///
/// Same frame discipline as [`Keyboard`](super::keyboard::Keyboard), with
/// two continuous channels (motion, wheel) on top of the button edges, and
/// cursor position tracking: `position` follows raw motion immediately,
/// `last_position` is pushed once per step at commit time.
pub struct Pointer {
    edge: RefCell<EdgeState<Button>>,
    bindings: PointerBindings,
    scopes: RefCell<IndexMap<ScopeId, PointerBindings>>,
    pending_structural: OpQueue<StructuralOp>,
    pending_dispatch: OpQueue<DispatchOp>,
    position: Cell<[f32; 2]>,
    last_position: Cell<[f32; 2]>,
}

impl Pointer {
    pub fn new() -> Self {
        Self {
            edge: RefCell::new(EdgeState::new()),
            bindings: PointerBindings::new(),
            scopes: RefCell::new(IndexMap::new()),
            pending_structural: OpQueue::new(),
            pending_dispatch: OpQueue::new(),
            position: Cell::new([0.0, 0.0]),
            last_position: Cell::new([0.0, 0.0]),
        }
    }

    /// Handle to the default binding set.
    pub fn bindings(&self) -> &PointerBindings {
        &self.bindings
    }

    /// Queues a pressed-subscription on the default set for the next
    /// `begin_frame`. Safe to call from inside a running callback.
    pub fn add_on_pressed(&self, button: Button, binding: Binding<ButtonEvent>) {
        self.pending_structural
            .push(StructuralOp::BindPressed { button, binding });
    }

    pub fn add_on_released(&self, button: Button, binding: Binding<ButtonEvent>) {
        self.pending_structural
            .push(StructuralOp::BindReleased { button, binding });
    }

    pub fn remove_on_pressed(&self, button: Button, id: BindingId) {
        self.pending_structural
            .push(StructuralOp::UnbindPressed { button, id });
    }

    pub fn remove_on_released(&self, button: Button, id: BindingId) {
        self.pending_structural
            .push(StructuralOp::UnbindReleased { button, id });
    }

    /// Queues a motion listener on the default set.
    pub fn add_on_moved(&self, binding: Binding<MotionEvent>) {
        self.pending_structural.push(StructuralOp::BindMoved(binding));
    }

    pub fn remove_on_moved(&self, id: BindingId) {
        self.pending_structural.push(StructuralOp::UnbindMoved(id));
    }

    /// Queues a wheel listener on the default set.
    pub fn add_on_wheel(&self, binding: Binding<WheelEvent>) {
        self.pending_structural.push(StructuralOp::BindWheel(binding));
    }

    pub fn remove_on_wheel(&self, id: BindingId) {
        self.pending_structural.push(StructuralOp::UnbindWheel(id));
    }

    /// Creates (or replaces) the scoped binding set for `scope`.
    pub fn create_scoped_bindings(&self, scope: ScopeId) -> PointerBindings {
        let set = PointerBindings::new();
        if self
            .scopes
            .borrow_mut()
            .insert(scope, set.clone())
            .is_some()
        {
            warn!(%scope, "replaced existing scoped pointer bindings");
        } else {
            debug!(%scope, "created scoped pointer bindings");
        }
        set
    }

    /// Removes the scoped binding set for `scope`.
    pub fn remove_scoped_bindings(&self, scope: ScopeId) {
        if self.scopes.borrow_mut().shift_remove(&scope).is_none() {
            warn!(%scope, "tried to remove unknown pointer binding scope");
        } else {
            debug!(%scope, "removed scoped pointer bindings");
        }
    }

    /// Raw button-down notification from the window source.
    pub fn on_raw_pressed(&self, button: Button) {
        if button.index().is_none() {
            warn!(?button, "ignoring raw transition for the Any sentinel");
            return;
        }
        self.edge.borrow_mut().set(button, true);
        let position = self.position.get();
        trace!(?button, ?position, "button pressed");
        self.pending_dispatch
            .push(DispatchOp::Pressed(ButtonEvent { button, position }));
    }

    /// Raw button-up notification from the window source.
    pub fn on_raw_released(&self, button: Button) {
        if button.index().is_none() {
            warn!(?button, "ignoring raw transition for the Any sentinel");
            return;
        }
        self.edge.borrow_mut().set(button, false);
        let position = self.position.get();
        trace!(?button, ?position, "button released");
        self.pending_dispatch
            .push(DispatchOp::Released(ButtonEvent { button, position }));
    }

    /// Raw cursor motion. Updates the live position and queues dispatch.
    pub fn on_raw_moved(&self, position: [f32; 2]) {
        self.position.set(position);
        self.pending_dispatch
            .push(DispatchOp::Moved(MotionEvent { position }));
    }

    /// Raw wheel motion, delta in pixel units.
    pub fn on_raw_wheel(&self, delta: [f32; 2]) {
        let position = self.position.get();
        trace!(?delta, "wheel moved");
        self.pending_dispatch
            .push(DispatchOp::Wheel(WheelEvent { delta, position }));
    }

    /// Edge-triggered state of one button for the current step.
    pub fn button_state(&self, button: Button) -> Result<InputState, InputError> {
        self.edge.borrow().state(button)
    }

    pub fn is_button_down(&self, button: Button) -> Result<bool, InputError> {
        self.edge.borrow().is_down(button)
    }

    pub fn is_button_up(&self, button: Button) -> Result<bool, InputError> {
        self.edge.borrow().is_up(button)
    }

    /// Aggregate state over every button, OR per buffer.
    pub fn any_button_state(&self) -> InputState {
        self.edge.borrow().any_state()
    }

    pub fn is_any_button_down(&self) -> bool {
        self.edge.borrow().any_down()
    }

    /// Cursor position in logical pixels, following raw motion.
    pub fn position(&self) -> [f32; 2] {
        self.position.get()
    }

    /// Cursor position as of the last committed step.
    pub fn last_position(&self) -> [f32; 2] {
        self.last_position.get()
    }

    fn dispatch(&self, op: DispatchOp) {
        let scoped: Vec<PointerBindings> = self.scopes.borrow().values().cloned().collect();
        match op {
            DispatchOp::Pressed(event) => {
                for set in &scoped {
                    set.dispatch_pressed(&event);
                }
                self.bindings.dispatch_pressed(&event);
            }
            DispatchOp::Released(event) => {
                for set in &scoped {
                    set.dispatch_released(&event);
                }
                self.bindings.dispatch_released(&event);
            }
            DispatchOp::Moved(event) => {
                for set in &scoped {
                    set.dispatch_moved(&event);
                }
                self.bindings.dispatch_moved(&event);
            }
            DispatchOp::Wheel(event) => {
                for set in &scoped {
                    set.dispatch_wheel(&event);
                }
                self.bindings.dispatch_wheel(&event);
            }
        }
    }
}

impl FrameDevice for Pointer {
    fn begin_frame(&self) {
        for op in self.pending_structural.take() {
            match op {
                StructuralOp::BindPressed { button, binding } => {
                    self.bindings.add_on_pressed(button, binding);
                }
                StructuralOp::BindReleased { button, binding } => {
                    self.bindings.add_on_released(button, binding);
                }
                StructuralOp::UnbindPressed { button, id } => {
                    self.bindings.remove_on_pressed(button, id);
                }
                StructuralOp::UnbindReleased { button, id } => {
                    self.bindings.remove_on_released(button, id);
                }
                StructuralOp::BindMoved(binding) => self.bindings.add_on_moved(binding),
                StructuralOp::UnbindMoved(id) => self.bindings.remove_on_moved(id),
                StructuralOp::BindWheel(binding) => self.bindings.add_on_wheel(binding),
                StructuralOp::UnbindWheel(id) => self.bindings.remove_on_wheel(id),
            }
        }
    }

    fn update(&self, active: bool) {
        let ops = self.pending_dispatch.take();
        if active {
            for op in ops {
                self.dispatch(op);
            }
        }
        self.edge.borrow_mut().commit();
        self.last_position.set(self.position.get());
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new()
    }
}
