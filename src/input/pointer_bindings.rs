//! Pointer binding sets

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::binding::{Binding, BindingId, BindingList, BindingMap};
use super::event::{ButtonEvent, MotionEvent, WheelEvent};
use super::identity::Button;

struct PointerBindingsInner {
    on_pressed: BindingMap<Button, ButtonEvent>,
    on_released: BindingMap<Button, ButtonEvent>,
    on_moved: BindingList<MotionEvent>,
    on_wheel: BindingList<WheelEvent>,
    chained: Vec<Weak<RefCell<PointerBindingsInner>>>,
}

/// A shareable set of pointer bindings: edge-triggered button buckets plus
/// flat listener lists for motion and wheel.
///
/// Same discipline as [`KeyBindings`](super::key_bindings::KeyBindings):
/// synchronous mutation, snapshot-before-invoke dispatch, directional
/// chaining over all four channels.
#[derive(Clone)]
pub struct PointerBindings {
    inner: Rc<RefCell<PointerBindingsInner>>,
}

impl PointerBindings {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PointerBindingsInner {
                on_pressed: BindingMap::new("button on_pressed"),
                on_released: BindingMap::new("button on_released"),
                on_moved: BindingList::new("pointer on_moved"),
                on_wheel: BindingList::new("pointer on_wheel"),
                chained: Vec::new(),
            })),
        }
    }

    /// Appends a binding for the pressed transition of `button`.
    /// `Button::Any` subscribes to every button.
    pub fn add_on_pressed(&self, button: Button, binding: Binding<ButtonEvent>) {
        self.inner.borrow_mut().on_pressed.add(button, binding);
    }

    /// Appends a binding for the released transition of `button`.
    pub fn add_on_released(&self, button: Button, binding: Binding<ButtonEvent>) {
        self.inner.borrow_mut().on_released.add(button, binding);
    }

    pub fn remove_on_pressed(&self, button: Button, id: BindingId) {
        self.inner.borrow_mut().on_pressed.remove(button, id);
    }

    pub fn remove_on_released(&self, button: Button, id: BindingId) {
        self.inner.borrow_mut().on_released.remove(button, id);
    }

    /// Appends a motion listener.
    pub fn add_on_moved(&self, binding: Binding<MotionEvent>) {
        self.inner.borrow_mut().on_moved.add(binding);
    }

    pub fn remove_on_moved(&self, id: BindingId) {
        self.inner.borrow_mut().on_moved.remove(id);
    }

    /// Appends a wheel listener.
    pub fn add_on_wheel(&self, binding: Binding<WheelEvent>) {
        self.inner.borrow_mut().on_wheel.add(binding);
    }

    pub fn remove_on_wheel(&self, id: BindingId) {
        self.inner.borrow_mut().on_wheel.remove(id);
    }

    /// Chains `link` to this set across all four channels. Directional.
    pub fn chain(&self, link: &PointerBindings) {
        debug!("chaining pointer binding set");
        self.inner
            .borrow_mut()
            .chained
            .push(Rc::downgrade(&link.inner));
    }

    /// Removes one propagation edge to `link`; reported no-op when absent.
    pub fn dechain(&self, link: &PointerBindings) {
        let mut inner = self.inner.borrow_mut();
        let target = Rc::as_ptr(&link.inner);
        let Some(position) = inner
            .chained
            .iter()
            .position(|edge| std::ptr::eq(edge.as_ptr(), target))
        else {
            warn!("tried to dechain a pointer binding set that was never chained");
            return;
        };
        inner.chained.remove(position);
        debug!("dechained pointer binding set");
    }

    pub fn dispatch_pressed(&self, event: &ButtonEvent) {
        self.dispatch_edge(event, true, &mut Vec::new());
    }

    pub fn dispatch_released(&self, event: &ButtonEvent) {
        self.dispatch_edge(event, false, &mut Vec::new());
    }

    pub fn dispatch_moved(&self, event: &MotionEvent) {
        self.dispatch_flat(&mut Vec::new(), |inner| inner.on_moved.snapshot(), event);
    }

    pub fn dispatch_wheel(&self, event: &WheelEvent) {
        self.dispatch_flat(&mut Vec::new(), |inner| inner.on_wheel.snapshot(), event);
    }

    fn dispatch_edge(
        &self,
        event: &ButtonEvent,
        pressed: bool,
        visited: &mut Vec<*const RefCell<PointerBindingsInner>>,
    ) {
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
            (map.snapshot(event.button), inner.chained.clone())
        };

        for binding in &bindings {
            binding.call(event);
        }

        for link in links {
            if let Some(inner) = link.upgrade() {
                PointerBindings { inner }.dispatch_edge(event, pressed, visited);
            }
        }
    }

    fn dispatch_flat<E>(
        &self,
        visited: &mut Vec<*const RefCell<PointerBindingsInner>>,
        snapshot: impl Fn(&PointerBindingsInner) -> Vec<Binding<E>> + Copy,
        event: &E,
    ) {
        let ptr = Rc::as_ptr(&self.inner);
        if visited.contains(&ptr) {
            return;
        }
        visited.push(ptr);

        let (bindings, links) = {
            let inner = self.inner.borrow();
            (snapshot(&inner), inner.chained.clone())
        };

        for binding in &bindings {
            binding.call(event);
        }

        for link in links {
            if let Some(inner) = link.upgrade() {
                PointerBindings { inner }.dispatch_flat(visited, snapshot, event);
            }
        }
    }
}

impl Default for PointerBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn button_event(button: Button) -> ButtonEvent {
        ButtonEvent {
            button,
            position: [10.0, 20.0],
        }
    }

    #[test]
    fn test_button_and_any_buckets() {
        let set = PointerBindings::new();
        let on_left = Rc::new(Cell::new(0));
        let on_any = Rc::new(Cell::new(0));

        let c = Rc::clone(&on_left);
        set.add_on_pressed(Button::Left, Binding::new(move |_| c.set(c.get() + 1)));
        let c = Rc::clone(&on_any);
        set.add_on_pressed(Button::Any, Binding::new(move |_| c.set(c.get() + 1)));

        set.dispatch_pressed(&button_event(Button::Left));
        set.dispatch_pressed(&button_event(Button::Right));
        assert_eq!(on_left.get(), 1);
        assert_eq!(on_any.get(), 2);
    }

    #[test]
    fn test_motion_and_wheel_listeners() {
        let set = PointerBindings::new();
        let moved = Rc::new(Cell::new(0));
        let wheeled = Rc::new(Cell::new(0));

        let c = Rc::clone(&moved);
        let motion = Binding::new(move |event: &MotionEvent| {
            assert_eq!(event.position, [3.0, 4.0]);
            c.set(c.get() + 1);
        });
        set.add_on_moved(motion.clone());
        let c = Rc::clone(&wheeled);
        set.add_on_wheel(Binding::new(move |_| c.set(c.get() + 1)));

        set.dispatch_moved(&MotionEvent {
            position: [3.0, 4.0],
        });
        set.dispatch_wheel(&WheelEvent {
            delta: [0.0, -20.0],
            position: [3.0, 4.0],
        });
        assert_eq!(moved.get(), 1);
        assert_eq!(wheeled.get(), 1);

        set.remove_on_moved(motion.id());
        set.dispatch_moved(&MotionEvent {
            position: [3.0, 4.0],
        });
        assert_eq!(moved.get(), 1);
    }

    #[test]
    fn test_chain_covers_motion_and_wheel() {
        let a = PointerBindings::new();
        let b = PointerBindings::new();
        let moved = Rc::new(Cell::new(0));
        let wheeled = Rc::new(Cell::new(0));

        let c = Rc::clone(&moved);
        b.add_on_moved(Binding::new(move |_| c.set(c.get() + 1)));
        let c = Rc::clone(&wheeled);
        b.add_on_wheel(Binding::new(move |_| c.set(c.get() + 1)));

        a.chain(&b);
        a.dispatch_moved(&MotionEvent {
            position: [0.0, 0.0],
        });
        a.dispatch_wheel(&WheelEvent {
            delta: [1.0, 0.0],
            position: [0.0, 0.0],
        });
        assert_eq!(moved.get(), 1);
        assert_eq!(wheeled.get(), 1);

        a.dechain(&b);
        a.dispatch_moved(&MotionEvent {
            position: [0.0, 0.0],
        });
        assert_eq!(moved.get(), 1);
    }

    #[test]
    fn test_chained_button_dispatch() {
        let a = PointerBindings::new();
        let b = PointerBindings::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        b.add_on_released(Button::Middle, Binding::new(move |_| c.set(c.get() + 1)));

        a.chain(&b);
        a.dispatch_released(&button_event(Button::Middle));
        assert_eq!(count.get(), 1);
    }
}
