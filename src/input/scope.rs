//! Consumer scope identities

use std::cell::Cell;

/// Stable handle for one consumer's scoped binding sets.
///
/// Issued at scope creation and used as the map key on every device, so
/// scope routing never depends on comparing consumer objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Monotonic `ScopeId` source.
pub(crate) struct ScopeIds {
    next: Cell<u64>,
}

impl ScopeIds {
    pub(crate) fn new() -> Self {
        Self { next: Cell::new(0) }
    }

    pub(crate) fn issue(&self) -> ScopeId {
        let id = self.next.get();
        self.next.set(id + 1);
        ScopeId(id)
    }
}
