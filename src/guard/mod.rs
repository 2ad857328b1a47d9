// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Session guard orchestration.
//!
//! On every session start or resumption the guard checks the store for a
//! bound fingerprint. A session without one is enrolled: a fingerprint is
//! computed from the current request and written under the reserved key.
//! A session with one is verified: the fingerprint is recomputed and
//! compared in constant time. A mismatch means the session cookie is being
//! replayed from a different client, so the session is destroyed outright.
//!
//! Destruction is a security decision, not an error: the caller only
//! observes that prior session state is gone, and the next request
//! re-enrolls as a fresh session.
//!
//! All policy lives in a [`GuardConfig`] owned by the guard instance; there
//! is no process-wide configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fingerprint::{FingerprintGenerator, FingerprintPolicy, RequestContext};
use crate::store::SessionStore;

/// Reserved session key under which the bound fingerprint is stored.
pub const FINGERPRINT_KEY: &str = "session_fingerprint";

/// Configuration for a [`SessionGuard`].
///
/// Passed to the guard at construction and owned by the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Whether fingerprint checking is performed at all. When false, the
    /// guard starts the session and does nothing else.
    #[serde(default = "default_use_fingerprint")]
    pub use_fingerprint: bool,

    /// Fingerprint generation policy.
    #[serde(default)]
    pub policy: FingerprintPolicy,
}

fn default_use_fingerprint() -> bool {
    true
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            use_fingerprint: true,
            policy: FingerprintPolicy::default(),
        }
    }
}

/// Fingerprint status of a session after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FingerprintState {
    /// The store holds no fingerprint key.
    NoFingerprint,
    /// A fingerprint is bound and the last validation succeeded.
    Bound,
    /// The session was destroyed this cycle. Terminal for the current
    /// request; the next request evaluates independently.
    Invalidated,
}

impl fmt::Display for FingerprintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintState::NoFingerprint => write!(f, "NO_FINGERPRINT"),
            FingerprintState::Bound => write!(f, "BOUND"),
            FingerprintState::Invalidated => write!(f, "INVALIDATED"),
        }
    }
}

/// What the guard decided for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintVerdict {
    /// Fingerprint checking is disabled in the configuration.
    Skipped,
    /// First visit: a fingerprint was computed and stored.
    Enrolled,
    /// The stored fingerprint matched the current request.
    Matched,
    /// The stored fingerprint did not match; the session was destroyed.
    /// `destroyed` carries the store's result for the destroy call.
    Mismatched { destroyed: bool },
}

impl FingerprintVerdict {
    /// Fingerprint state implied by this verdict.
    pub fn state(&self) -> FingerprintState {
        match self {
            FingerprintVerdict::Skipped => FingerprintState::NoFingerprint,
            FingerprintVerdict::Enrolled | FingerprintVerdict::Matched => FingerprintState::Bound,
            FingerprintVerdict::Mismatched { .. } => FingerprintState::Invalidated,
        }
    }

    /// Whether the session continues with a bound fingerprint.
    pub fn is_bound(&self) -> bool {
        matches!(
            self,
            FingerprintVerdict::Enrolled | FingerprintVerdict::Matched
        )
    }

    /// Whether the session was destroyed this cycle.
    pub fn is_invalidated(&self) -> bool {
        matches!(self, FingerprintVerdict::Mismatched { .. })
    }
}

/// Result of [`SessionGuard::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOutcome {
    /// Whether the store reported a successful start/resume.
    pub started: bool,

    /// The fingerprint decision for this evaluation.
    pub verdict: FingerprintVerdict,
}

/// Guard events for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GuardEvent {
    /// A fingerprint was bound to a fresh session.
    Enrolled {
        algorithm: String,
        timestamp: DateTime<Utc>,
    },
    /// A resumed session's fingerprint matched.
    Matched {
        algorithm: String,
        timestamp: DateTime<Utc>,
    },
    /// A resumed session's fingerprint did not match and the session was
    /// destroyed.
    HijackDetected {
        destroyed: bool,
        timestamp: DateTime<Utc>,
    },
    /// Fingerprint checking was skipped by configuration.
    Skipped { timestamp: DateTime<Utc> },
}

impl GuardEvent {
    /// Format event for audit log.
    pub fn to_audit_string(&self) -> String {
        match self {
            GuardEvent::Enrolled {
                algorithm,
                timestamp,
            } => format!(
                "{} | FINGERPRINT_ENROLLED | algorithm={}",
                timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                algorithm
            ),
            GuardEvent::Matched {
                algorithm,
                timestamp,
            } => format!(
                "{} | FINGERPRINT_MATCHED | algorithm={}",
                timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                algorithm
            ),
            GuardEvent::HijackDetected {
                destroyed,
                timestamp,
            } => format!(
                "{} | FINGERPRINT_MISMATCH | session_destroyed={}",
                timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                destroyed
            ),
            GuardEvent::Skipped { timestamp } => format!(
                "{} | FINGERPRINT_SKIPPED | reason=disabled_by_config",
                timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        }
    }
}

/// Orchestrates session start/resume with fingerprint verification.
///
/// The guard is stateless across evaluations: each [`start`](Self::start)
/// call is one complete run of the fingerprint state machine, and concurrent
/// requests for different sessions share nothing mutable.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    config: GuardConfig,
    generator: FingerprintGenerator,
}

impl SessionGuard {
    /// Create a guard owning the given configuration.
    pub fn new(config: GuardConfig) -> Self {
        let generator = FingerprintGenerator::new(config.policy.clone());
        Self { config, generator }
    }

    /// The guard's configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Start or resume a session and run the fingerprint check.
    ///
    /// Exactly one of the following happens per call:
    /// - no fingerprint key in the store: one `set` (enrollment);
    /// - stored fingerprint matches the recomputed one: no store write;
    /// - stored fingerprint differs: one `destroy`.
    pub fn start<S: SessionStore + ?Sized>(
        &self,
        store: &mut S,
        ctx: &RequestContext,
    ) -> StartOutcome {
        let started = store.start();
        if !self.config.use_fingerprint {
            let event = GuardEvent::Skipped {
                timestamp: Utc::now(),
            };
            tracing::debug!("{}", event.to_audit_string());
            return StartOutcome {
                started,
                verdict: FingerprintVerdict::Skipped,
            };
        }

        let verdict = if store.has(FINGERPRINT_KEY) {
            let fresh = self.generator.generate(ctx);
            let stored = store.get_or(FINGERPRINT_KEY, "");
            if fresh.matches_hex(&stored) {
                let event = GuardEvent::Matched {
                    algorithm: self.config.policy.algorithm.to_string(),
                    timestamp: Utc::now(),
                };
                tracing::debug!("{}", event.to_audit_string());
                FingerprintVerdict::Matched
            } else {
                let destroyed = store.destroy();
                let event = GuardEvent::HijackDetected {
                    destroyed,
                    timestamp: Utc::now(),
                };
                tracing::warn!("{}", event.to_audit_string());
                FingerprintVerdict::Mismatched { destroyed }
            }
        } else {
            let fp = self.generator.generate(ctx);
            store.set(FINGERPRINT_KEY, fp.into_hex());
            let event = GuardEvent::Enrolled {
                algorithm: self.config.policy.algorithm.to_string(),
                timestamp: Utc::now(),
            };
            tracing::info!("{}", event.to_audit_string());
            FingerprintVerdict::Enrolled
        };

        StartOutcome { started, verdict }
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
