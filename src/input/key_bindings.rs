//! Keyboard binding sets

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::binding::{Binding, BindingId, BindingMap};
use super::event::KeyEvent;
use super::identity::Key;

struct KeyBindingsInner {
    on_pressed: BindingMap<Key, KeyEvent>,
    on_released: BindingMap<Key, KeyEvent>,
    /// Directed propagation edges: dispatching here also dispatches every
    /// live target. Weak, so a chained-to set owned by a removed scope
    /// simply drops out.
    chained: Vec<Weak<RefCell<KeyBindingsInner>>>,
}

/// A shareable set of keyboard bindings.
///
/// Cloning yields another handle to the same set. Mutation is synchronous;
/// dispatch snapshots the matching bucket before invoking, so a callback
/// may mutate the very set it is running under without affecting the
/// in-flight pass.
#[derive(Clone)]
pub struct KeyBindings {
    inner: Rc<RefCell<KeyBindingsInner>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(KeyBindingsInner {
                on_pressed: BindingMap::new("key on_pressed"),
                on_released: BindingMap::new("key on_released"),
                chained: Vec::new(),
            })),
        }
    }

    /// Appends a binding for the pressed transition of `key`.
    /// `Key::Any` subscribes to every key.
    pub fn add_on_pressed(&self, key: Key, binding: Binding<KeyEvent>) {
        self.inner.borrow_mut().on_pressed.add(key, binding);
    }

    /// Appends a binding for the released transition of `key`.
    pub fn add_on_released(&self, key: Key, binding: Binding<KeyEvent>) {
        self.inner.borrow_mut().on_released.add(key, binding);
    }

    /// Removes the first pressed-subscription of `key` matching `id`.
    pub fn remove_on_pressed(&self, key: Key, id: BindingId) {
        self.inner.borrow_mut().on_pressed.remove(key, id);
    }

    /// Removes the first released-subscription of `key` matching `id`.
    pub fn remove_on_released(&self, key: Key, id: BindingId) {
        self.inner.borrow_mut().on_released.remove(key, id);
    }

    /// Chains `link` to this set: dispatching here also dispatches `link`,
    /// transitively through `link`'s own chains. Directional.
    pub fn chain(&self, link: &KeyBindings) {
        debug!("chaining key binding set");
        self.inner
            .borrow_mut()
            .chained
            .push(Rc::downgrade(&link.inner));
    }

    /// Removes one propagation edge to `link`. Dechaining a set that was
    /// never chained is reported and otherwise a no-op.
    pub fn dechain(&self, link: &KeyBindings) {
        let mut inner = self.inner.borrow_mut();
        let target = Rc::as_ptr(&link.inner);
        let Some(position) = inner
            .chained
            .iter()
            .position(|edge| std::ptr::eq(edge.as_ptr(), target))
        else {
            warn!("tried to dechain a key binding set that was never chained");
            return;
        };
        inner.chained.remove(position);
        debug!("dechained key binding set");
    }

    /// Invokes every pressed-subscription matching the event: the key's
    /// bucket in subscription order, then the `Any` bucket, then every
    /// chained set.
    pub fn dispatch_pressed(&self, event: &KeyEvent) {
        self.dispatch(event, true, &mut Vec::new());
    }

    /// Released counterpart of [`dispatch_pressed`](Self::dispatch_pressed).
    pub fn dispatch_released(&self, event: &KeyEvent) {
        self.dispatch(event, false, &mut Vec::new());
    }

    fn dispatch(
        &self,
        event: &KeyEvent,
        pressed: bool,
        visited: &mut Vec<*const RefCell<KeyBindingsInner>>,
    ) {
        // Each set fires at most once per event, even through chain cycles.
        let ptr = Rc::as_ptr(&self.inner);
        if visited.contains(&ptr) {
            return;
        }
        visited.push(ptr);

        let (bindings, links) = {
            let inner = self.inner.borrow();
            let map = if pressed {
                &inner.on_pressed
            } else {
                &inner.on_released
            };
            (map.snapshot(event.key), inner.chained.clone())
        };

        for binding in &bindings {
            binding.call(event);
        }

        for link in links {
            if let Some(inner) = link.upgrade() {
                KeyBindings { inner }.dispatch(event, pressed, visited);
            }
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::event::Modifiers;
    use std::cell::Cell;

    fn event(key: Key) -> KeyEvent {
        KeyEvent {
            key,
            modifiers: Modifiers::default(),
        }
    }

    fn counter() -> (Rc<Cell<u32>>, Binding<KeyEvent>) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, Binding::new(move |_| c.set(c.get() + 1)))
    }

    #[test]
    fn test_dispatch_reaches_key_and_any_buckets() {
        let set = KeyBindings::new();
        let (on_key, key_binding) = counter();
        let (on_any, any_binding) = counter();
        set.add_on_pressed(Key::W, key_binding);
        set.add_on_pressed(Key::Any, any_binding);

        set.dispatch_pressed(&event(Key::W));
        assert_eq!(on_key.get(), 1);
        assert_eq!(on_any.get(), 1);

        set.dispatch_pressed(&event(Key::S));
        assert_eq!(on_key.get(), 1);
        assert_eq!(on_any.get(), 2);
    }

    #[test]
    fn test_directions_are_independent() {
        let set = KeyBindings::new();
        let (pressed, pressed_binding) = counter();
        let (released, released_binding) = counter();
        set.add_on_pressed(Key::Space, pressed_binding);
        set.add_on_released(Key::Space, released_binding);

        set.dispatch_pressed(&event(Key::Space));
        assert_eq!(pressed.get(), 1);
        assert_eq!(released.get(), 0);

        set.dispatch_released(&event(Key::Space));
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_chained_set_fires_exactly_once() {
        let a = KeyBindings::new();
        let b = KeyBindings::new();
        let (on_a, binding_a) = counter();
        let (on_b, binding_b) = counter();
        a.add_on_pressed(Key::A, binding_a);
        b.add_on_pressed(Key::A, binding_b);

        a.chain(&b);
        a.dispatch_pressed(&event(Key::A));
        assert_eq!(on_a.get(), 1);
        assert_eq!(on_b.get(), 1);

        // Directional: dispatching b does not reach a.
        b.dispatch_pressed(&event(Key::A));
        assert_eq!(on_a.get(), 1);
        assert_eq!(on_b.get(), 2);
    }

    #[test]
    fn test_chain_composes_transitively() {
        let a = KeyBindings::new();
        let b = KeyBindings::new();
        let c = KeyBindings::new();
        let (on_c, binding_c) = counter();
        c.add_on_pressed(Key::Enter, binding_c);

        a.chain(&b);
        b.chain(&c);
        a.dispatch_pressed(&event(Key::Enter));
        assert_eq!(on_c.get(), 1);
    }

    #[test]
    fn test_dechain_removes_only_that_edge() {
        let a = KeyBindings::new();
        let b = KeyBindings::new();
        let c = KeyBindings::new();
        let (on_b, binding_b) = counter();
        let (on_c, binding_c) = counter();
        b.add_on_pressed(Key::D, binding_b);
        c.add_on_pressed(Key::D, binding_c);

        a.chain(&b);
        a.chain(&c);
        a.dechain(&b);

        a.dispatch_pressed(&event(Key::D));
        assert_eq!(on_b.get(), 0);
        assert_eq!(on_c.get(), 1);
    }

    #[test]
    fn test_dechain_of_unchained_pair_is_a_no_op() {
        let a = KeyBindings::new();
        let b = KeyBindings::new();
        a.dechain(&b);
    }

    #[test]
    fn test_chain_cycle_terminates() {
        let a = KeyBindings::new();
        let b = KeyBindings::new();
        let (on_a, binding_a) = counter();
        a.add_on_pressed(Key::Q, binding_a);

        a.chain(&b);
        b.chain(&a);
        a.dispatch_pressed(&event(Key::Q));
        assert_eq!(on_a.get(), 1);
    }

    #[test]
    fn test_chain_edge_to_dropped_set_is_skipped() {
        let a = KeyBindings::new();
        let (on_a, binding_a) = counter();
        a.add_on_pressed(Key::Z, binding_a);

        {
            let b = KeyBindings::new();
            a.chain(&b);
        }
        a.dispatch_pressed(&event(Key::Z));
        assert_eq!(on_a.get(), 1);
    }

    #[test]
    fn test_callback_may_mutate_its_own_set() {
        let set = KeyBindings::new();
        let (late, late_binding) = counter();

        let inner_set = set.clone();
        let first = Binding::new(move |_: &KeyEvent| {
            // Added mid-dispatch: must not run for this event.
            inner_set.add_on_pressed(Key::X, late_binding.clone());
        });
        set.add_on_pressed(Key::X, first);

        set.dispatch_pressed(&event(Key::X));
        assert_eq!(late.get(), 0);

        set.dispatch_pressed(&event(Key::X));
        assert_eq!(late.get(), 1);
    }
}
