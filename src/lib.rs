// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! sessionguard - Session fingerprinting and anti-hijacking guard
//!
//! Binds a fingerprint derived from client-identifying request attributes
//! (network address, user agent) to a session, and re-verifies it on every
//! resumption. A resumed session whose fingerprint no longer matches the
//! requesting client is destroyed on the spot, cutting off cookie-theft
//! style session hijacking.
//!
//! Session storage itself lives behind the [`SessionStore`] trait; this
//! crate never owns session data, cookies, or persistence.
//!
//! # Core Modules
//!
//! - [`fingerprint`] - Fingerprint generation from request attributes
//! - [`guard`] - Session start/resume orchestration and the verdict machine
//! - [`store`] - The session store collaborator contract
//! - [`error`] - Configuration error types
//!
//! # Usage
//!
//! ```no_run
//! use sessionguard::{GuardConfig, RequestContext, SessionGuard, SessionStore};
//!
//! fn handle_request(store: &mut dyn SessionStore) {
//!     let guard = SessionGuard::new(GuardConfig::default());
//!     let ctx = RequestContext::new()
//!         .client_address("10.0.0.1")
//!         .user_agent("Mozilla/5.0");
//!
//!     let outcome = guard.start(store, &ctx);
//!     if outcome.verdict.is_invalidated() {
//!         // Prior session state is gone; the next request re-enrolls.
//!     }
//! }
//! ```

pub mod error;
pub mod fingerprint;
pub mod guard;
pub mod store;

// Re-export fingerprint types
pub use fingerprint::{
    Fingerprint, FingerprintGenerator, FingerprintPolicy, HashAlgorithm, RequestContext,
};

// Re-export guard types
pub use guard::{
    FingerprintState, FingerprintVerdict, GuardConfig, GuardEvent, SessionGuard, StartOutcome,
    FINGERPRINT_KEY,
};

// Re-export the store contract
pub use store::SessionStore;

// Re-export error types
pub use error::GuardError;
