//! Per-step device contract

/// The two-phase frame protocol every device implements.
///
/// The outer scheduler calls `begin_frame` then `update` exactly once each
/// per simulation step. Raw notifications fold in continuously between
/// steps; the two phases are the only points where deferred work runs.
pub trait FrameDevice {
    /// Drains and applies pending structural mutations (subscribes and
    /// unsubscribes) in enqueue order. Idempotent when the queue is empty.
    fn begin_frame(&self);

    /// Drains pending dispatch when `active` is true, discards it when
    /// false, then commits the edge register either way. `active` is the
    /// focus-gating hint computed by the facade.
    fn update(&self, active: bool);
}
