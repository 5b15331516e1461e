//! keywire
//!
//! The input-event core of an interactive real-time application: raw
//! window notifications in, deferred application callbacks and stable
//! per-frame key/button state out.

/// Input configuration (focus gating, profiles)
pub mod config;

/// Input devices, binding sets, and the frame protocol
pub mod input;
