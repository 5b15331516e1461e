//! Callback handles and binding storage

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use super::identity::InputId;

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identity of one subscription.
///
/// Removal matches by id, never by comparing callbacks, so two bindings
/// wrapping equal closures stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

/// A callback handle: an opaque id paired with the callback it wraps.
///
/// Cloning shares the id; subscribing the same handle twice creates two
/// subscriptions that fire independently. A handle built separately from an
/// equal closure is a distinct subscription.
pub struct Binding<E> {
    id: BindingId,
    callback: Rc<dyn Fn(&E)>,
}

impl<E> Binding<E> {
    pub fn new(callback: impl Fn(&E) + 'static) -> Self {
        Self {
            id: BindingId(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed)),
            callback: Rc::new(callback),
        }
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub(crate) fn call(&self, event: &E) {
        (self.callback)(event);
    }
}

impl<E> Clone for Binding<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<E> std::fmt::Debug for Binding<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Binding").field(&self.id).finish()
    }
}

/// Ordered binding buckets keyed by identity.
///
/// A bucket that becomes empty is pruned; pruning is independent per map,
/// never cross-checked against the opposite direction.
pub(crate) struct BindingMap<I: InputId, E> {
    buckets: HashMap<I, Vec<Binding<E>>>,
    /// Channel name for diagnostics, e.g. `"key on_pressed"`.
    label: &'static str,
}

impl<I: InputId, E> BindingMap<I, E> {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            buckets: HashMap::new(),
            label,
        }
    }

    /// Appends a binding to the bucket for `id`, creating it if absent.
    pub(crate) fn add(&mut self, id: I, binding: Binding<E>) {
        self.buckets.entry(id).or_default().push(binding);
    }

    /// Removes the first subscription matching `binding_id` from the bucket
    /// for `id`. Missing buckets and missing handles are reported, not
    /// fatal: a mode may legitimately race a removal against the teardown
    /// of its own scope.
    pub(crate) fn remove(&mut self, id: I, binding_id: BindingId) {
        let Some(bucket) = self.buckets.get_mut(&id) else {
            warn!(
                channel = self.label,
                ?id,
                "tried to remove a binding from an unbound identity"
            );
            return;
        };

        let Some(position) = bucket.iter().position(|b| b.id() == binding_id) else {
            warn!(
                channel = self.label,
                ?id,
                ?binding_id,
                "tried to remove a binding that was never added"
            );
            return;
        };
        bucket.remove(position);

        if bucket.is_empty() {
            self.buckets.remove(&id);
        }
    }

    /// Clones the bindings that match `id`: its own bucket in subscription
    /// order, then the `Any` bucket. The snapshot lets callers invoke
    /// callbacks without holding a borrow of the map.
    pub(crate) fn snapshot(&self, id: I) -> Vec<Binding<E>> {
        let mut out = Vec::new();
        if id.index().is_some()
            && let Some(bucket) = self.buckets.get(&id)
        {
            out.extend(bucket.iter().cloned());
        }
        if let Some(bucket) = self.buckets.get(&I::any()) {
            out.extend(bucket.iter().cloned());
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: I) -> bool {
        self.buckets.contains_key(&id)
    }

    #[cfg(test)]
    pub(crate) fn bucket_len(&self, id: I) -> usize {
        self.buckets.get(&id).map_or(0, Vec::len)
    }
}

/// Flat, ordered list of bindings for continuous signals (motion, wheel).
pub(crate) struct BindingList<E> {
    items: Vec<Binding<E>>,
    label: &'static str,
}

impl<E> BindingList<E> {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            items: Vec::new(),
            label,
        }
    }

    pub(crate) fn add(&mut self, binding: Binding<E>) {
        self.items.push(binding);
    }

    pub(crate) fn remove(&mut self, binding_id: BindingId) {
        let Some(position) = self.items.iter().position(|b| b.id() == binding_id) else {
            warn!(
                channel = self.label,
                ?binding_id,
                "tried to remove a binding that was never added"
            );
            return;
        };
        self.items.remove(position);
    }

    pub(crate) fn snapshot(&self) -> Vec<Binding<E>> {
        self.items.clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
