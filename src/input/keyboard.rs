//! Keyboard device

use std::cell::RefCell;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::binding::{Binding, BindingId};
use super::edge::{EdgeState, InputState};
use super::error::InputError;
use super::event::{KeyEvent, Modifiers};
use super::frame::FrameDevice;
use super::identity::{InputId, Key};
use super::key_bindings::KeyBindings;
use super::queue::OpQueue;
use super::scope::ScopeId;

/// Structural mutation applied at the next `begin_frame`, against the
/// device's default binding set.
enum StructuralOp {
    BindPressed { key: Key, binding: Binding<KeyEvent> },
    BindReleased { key: Key, binding: Binding<KeyEvent> },
    UnbindPressed { key: Key, id: BindingId },
    UnbindReleased { key: Key, id: BindingId },
}

/// Dispatch record captured when a raw notification arrived, executed at
/// the next `update`.
enum DispatchOp {
    Pressed(KeyEvent),
    Released(KeyEvent),
}

/// The keyboard device.
///
/// Owns the key edge register, the default binding set, and one scoped
/// binding set per attached consumer. Raw transitions fold into the edge
/// register immediately; every callback invocation and every structural
/// mutation is deferred to the frame protocol, which is what makes
/// subscribing or unsubscribing from inside a running callback safe.
pub struct Keyboard {
    edge: RefCell<EdgeState<Key>>,
    bindings: KeyBindings,
    scopes: RefCell<IndexMap<ScopeId, KeyBindings>>,
    pending_structural: OpQueue<StructuralOp>,
    pending_dispatch: OpQueue<DispatchOp>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            edge: RefCell::new(EdgeState::new()),
            bindings: KeyBindings::new(),
            scopes: RefCell::new(IndexMap::new()),
            pending_structural: OpQueue::new(),
            pending_dispatch: OpQueue::new(),
        }
    }

    /// Handle to the default binding set.
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Queues a pressed-subscription on the default set for the next
    /// `begin_frame`. Safe to call from inside a running callback.
    pub fn add_on_pressed(&self, key: Key, binding: Binding<KeyEvent>) {
        self.pending_structural
            .push(StructuralOp::BindPressed { key, binding });
    }

    /// Queues a released-subscription on the default set.
    pub fn add_on_released(&self, key: Key, binding: Binding<KeyEvent>) {
        self.pending_structural
            .push(StructuralOp::BindReleased { key, binding });
    }

    /// Queues removal of a pressed-subscription from the default set. The
    /// current dispatch pass is unaffected; the binding still receives the
    /// event that is in flight.
    pub fn remove_on_pressed(&self, key: Key, id: BindingId) {
        self.pending_structural
            .push(StructuralOp::UnbindPressed { key, id });
    }

    /// Queues removal of a released-subscription from the default set.
    pub fn remove_on_released(&self, key: Key, id: BindingId) {
        self.pending_structural
            .push(StructuralOp::UnbindReleased { key, id });
    }

    /// Creates (or replaces) the scoped binding set for `scope`.
    ///
    /// Synchronous: scope routing is resolved when dispatch runs, so this
    /// never races an in-flight pass.
    pub fn create_scoped_bindings(&self, scope: ScopeId) -> KeyBindings {
        let set = KeyBindings::new();
        if self
            .scopes
            .borrow_mut()
            .insert(scope, set.clone())
            .is_some()
        {
            warn!(%scope, "replaced existing scoped key bindings");
        } else {
            debug!(%scope, "created scoped key bindings");
        }
        set
    }

    /// Removes the scoped binding set for `scope`. Dispatch records still
    /// queued for this step simply skip the missing scope.
    pub fn remove_scoped_bindings(&self, scope: ScopeId) {
        if self.scopes.borrow_mut().shift_remove(&scope).is_none() {
            warn!(%scope, "tried to remove unknown key binding scope");
        } else {
            debug!(%scope, "removed scoped key bindings");
        }
    }

    /// Raw key-down notification from the window source.
    pub fn on_raw_pressed(&self, key: Key, modifiers: Modifiers) {
        if key.index().is_none() {
            warn!(?key, "ignoring raw transition for the Any sentinel");
            return;
        }
        self.edge.borrow_mut().set(key, true);
        trace!(?key, "key pressed");
        self.pending_dispatch
            .push(DispatchOp::Pressed(KeyEvent { key, modifiers }));
    }

    /// Raw key-up notification from the window source.
    pub fn on_raw_released(&self, key: Key, modifiers: Modifiers) {
        if key.index().is_none() {
            warn!(?key, "ignoring raw transition for the Any sentinel");
            return;
        }
        self.edge.borrow_mut().set(key, false);
        trace!(?key, "key released");
        self.pending_dispatch
            .push(DispatchOp::Released(KeyEvent { key, modifiers }));
    }

    /// Edge-triggered state of one key for the current step.
    pub fn key_state(&self, key: Key) -> Result<InputState, InputError> {
        self.edge.borrow().state(key)
    }

    pub fn is_key_down(&self, key: Key) -> Result<bool, InputError> {
        self.edge.borrow().is_down(key)
    }

    pub fn is_key_up(&self, key: Key) -> Result<bool, InputError> {
        self.edge.borrow().is_up(key)
    }

    /// Aggregate state over every key, OR per buffer.
    pub fn any_key_state(&self) -> InputState {
        self.edge.borrow().any_state()
    }

    pub fn is_any_key_down(&self) -> bool {
        self.edge.borrow().any_down()
    }

    fn dispatch(&self, op: DispatchOp) {
        // Scope membership is resolved per record, so a scope removed by an
        // earlier callback in this same pass no longer receives anything.
        let scoped: Vec<KeyBindings> = self.scopes.borrow().values().cloned().collect();
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
        }
    }
}

impl FrameDevice for Keyboard {
    fn begin_frame(&self) {
        for op in self.pending_structural.take() {
            match op {
                StructuralOp::BindPressed { key, binding } => {
                    self.bindings.add_on_pressed(key, binding);
                }
                StructuralOp::BindReleased { key, binding } => {
                    self.bindings.add_on_released(key, binding);
                }
                StructuralOp::UnbindPressed { key, id } => {
                    self.bindings.remove_on_pressed(key, id);
                }
                StructuralOp::UnbindReleased { key, id } => {
                    self.bindings.remove_on_released(key, id);
                }
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
        // Commit after dispatch so Pressed/Released hold for this whole
        // step; an inactive step still commits, as a step with no input.
        self.edge.borrow_mut().commit();
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
