// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Session store collaborator contract.
//!
//! The guard never owns session data; it talks to an external store through
//! this trait. The contract is deliberately minimal: exactly the operations
//! the fingerprint logic needs. Backends, cookie transport, and record
//! persistence formats are the implementor's concern.
//!
//! Stores are expected to serialize access per request lifecycle. The guard
//! performs at most one write (`set`) or one `destroy` per evaluation and
//! never locks on its own; any atomicity guarantee on the fingerprint key
//! belongs to the store.

/// Operations the session guard requires from a session store.
///
/// Fallible lifecycle operations report success as `bool`, mirroring the
/// conventions of the session backends this crate fronts; the guard
/// propagates those results without retrying.
pub trait SessionStore {
    /// Start a new session or resume an existing one.
    fn start(&mut self) -> bool;

    /// Whether a value exists for `key`.
    fn has(&self, key: &str) -> bool;

    /// The value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// The value for `key`, or `default` when absent.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Set the value for `key`, overwriting any existing value.
    fn set(&mut self, key: &str, value: String);

    /// Remove the value for `key`.
    fn delete(&mut self, key: &str);

    /// Destroy the session: clear all data and invalidate the session
    /// identity. Returns whether destruction succeeded.
    fn destroy(&mut self) -> bool;

    /// Replace the session ID, optionally deleting the old session record.
    /// Returns whether regeneration succeeded.
    fn regenerate_id(&mut self, delete_old: bool) -> bool;
}

// ============================================================================
// TESTS
// ============================================================================
