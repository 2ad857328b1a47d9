//! Integration tests for sessionguard
//!
//! These tests drive the guard end to end against an in-memory session
//! store double: enrollment on first visit, verification on resumption,
//! destruction on hijack, and re-enrollment on the following cycle.

use sessionguard::{
    FingerprintPolicy, FingerprintVerdict, GuardConfig, HashAlgorithm, RequestContext,
    SessionGuard, SessionStore, FINGERPRINT_KEY,
};
use std::collections::HashMap;

/// Minimal in-memory session store standing in for a real backend.
struct MemoryStore {
    id: u64,
    active: bool,
    data: HashMap<String, String>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            id: 1,
            active: false,
            data: HashMap::new(),
        }
    }
}

impl SessionStore for MemoryStore {
    fn start(&mut self) -> bool {
        self.active = true;
        true
    }
    fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }
    fn set(&mut self, key: &str, value: String) {
        self.data.insert(key.to_string(), value);
    }
    fn delete(&mut self, key: &str) {
        self.data.remove(key);
    }
    fn destroy(&mut self) -> bool {
        self.data.clear();
        self.active = false;
        true
    }
    fn regenerate_id(&mut self, delete_old: bool) -> bool {
        if delete_old {
            self.id += 1;
        } else {
            self.id = self.id.wrapping_mul(31).wrapping_add(1);
        }
        true
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn browser(addr: &str, ua: &str) -> RequestContext {
    RequestContext::new().client_address(addr).user_agent(ua)
}

// =============================================================================
// Full Lifecycle Tests
// =============================================================================

#[test]
fn test_enroll_resume_hijack_reenroll_flow() {
    init_tracing();
    let guard = SessionGuard::new(GuardConfig::default());
    let mut store = MemoryStore::new();

    // First visit: session starts and a fingerprint is enrolled.
    let outcome = guard.start(&mut store, &browser("10.0.0.1", "AgentA"));
    assert!(outcome.started);
    assert_eq!(outcome.verdict, FingerprintVerdict::Enrolled);
    assert_eq!(
        store.get(FINGERPRINT_KEY).unwrap(),
        HashAlgorithm::Sha512.digest_hex(b"10.0.0.1|AgentA")
    );

    // Application stores some state alongside the fingerprint.
    store.set("user_id", "42".to_string());

    // Same client resumes: everything stays put.
    let outcome = guard.start(&mut store, &browser("10.0.0.1", "AgentA"));
    assert_eq!(outcome.verdict, FingerprintVerdict::Matched);
    assert_eq!(store.get("user_id").as_deref(), Some("42"));

    // Stolen cookie replayed from another address: session destroyed.
    let outcome = guard.start(&mut store, &browser("10.0.0.2", "AgentA"));
    assert_eq!(
        outcome.verdict,
        FingerprintVerdict::Mismatched { destroyed: true }
    );
    assert!(store.get("user_id").is_none());
    assert!(!store.has(FINGERPRINT_KEY));

    // The hijacker's next request is simply a fresh session.
    let outcome = guard.start(&mut store, &browser("10.0.0.2", "AgentA"));
    assert_eq!(outcome.verdict, FingerprintVerdict::Enrolled);
    assert_eq!(
        store.get(FINGERPRINT_KEY).unwrap(),
        HashAlgorithm::Sha512.digest_hex(b"10.0.0.2|AgentA")
    );
}

#[test]
fn test_guard_is_deterministic_across_instances() {
    let config = GuardConfig::default();
    let mut store = MemoryStore::new();
    let ctx = browser("192.0.2.8", "Mozilla/5.0");

    // Enroll with one guard instance, verify with another built from the
    // same configuration. Per-request construction must not change results.
    SessionGuard::new(config.clone()).start(&mut store, &ctx);
    let outcome = SessionGuard::new(config).start(&mut store, &ctx);
    assert_eq!(outcome.verdict, FingerprintVerdict::Matched);
}

#[test]
fn test_id_regeneration_keeps_fingerprint_valid() {
    let guard = SessionGuard::new(GuardConfig::default());
    let mut store = MemoryStore::new();
    let ctx = browser("10.0.0.1", "AgentA");

    guard.start(&mut store, &ctx);
    let old_id = store.id;

    // Privilege escalation path: rotate the session ID against fixation.
    // The fingerprint is keyed on the client, not the session ID, so the
    // next resumption still matches.
    assert!(store.regenerate_id(true));
    assert_ne!(store.id, old_id);

    let outcome = guard.start(&mut store, &ctx);
    assert_eq!(outcome.verdict, FingerprintVerdict::Matched);
}

// =============================================================================
// Policy Variation Tests
// =============================================================================

#[test]
fn test_address_only_policy_ignores_user_agent_change() {
    let guard = SessionGuard::new(GuardConfig {
        use_fingerprint: true,
        policy: FingerprintPolicy {
            use_user_agent: false,
            ..FingerprintPolicy::default()
        },
    });
    let mut store = MemoryStore::new();

    guard.start(&mut store, &browser("10.0.0.1", "AgentA"));

    // Browser upgrade changes the user agent; address-only policy shrugs.
    let outcome = guard.start(&mut store, &browser("10.0.0.1", "AgentB"));
    assert_eq!(outcome.verdict, FingerprintVerdict::Matched);

    // Address change is still fatal.
    let outcome = guard.start(&mut store, &browser("10.9.9.9", "AgentB"));
    assert!(outcome.verdict.is_invalidated());
}

#[test]
fn test_sha256_policy_stores_shorter_digest() {
    let guard = SessionGuard::new(GuardConfig {
        use_fingerprint: true,
        policy: FingerprintPolicy::with_algorithm_name("sha256").unwrap(),
    });
    let mut store = MemoryStore::new();

    guard.start(&mut store, &browser("10.0.0.1", "AgentA"));

    let stored = store.get(FINGERPRINT_KEY).unwrap();
    assert_eq!(stored.len(), 64);
    assert_eq!(stored, HashAlgorithm::Sha256.digest_hex(b"10.0.0.1|AgentA"));
}

#[test]
fn test_client_without_attributes_still_gets_a_session() {
    let guard = SessionGuard::new(GuardConfig::default());
    let mut store = MemoryStore::new();

    // No address, no user agent (e.g. a bare health-check probe).
    let outcome = guard.start(&mut store, &RequestContext::new());
    assert_eq!(outcome.verdict, FingerprintVerdict::Enrolled);
    assert_eq!(
        store.get(FINGERPRINT_KEY).unwrap(),
        HashAlgorithm::Sha512.digest_hex(b"null|null")
    );

    let outcome = guard.start(&mut store, &RequestContext::new());
    assert_eq!(outcome.verdict, FingerprintVerdict::Matched);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_guard_config_from_json() {
    let config: GuardConfig = serde_json::from_str(
        r#"{
            "use_fingerprint": true,
            "policy": {
                "use_client_address": true,
                "use_user_agent": false,
                "algorithm": "sha384"
            }
        }"#,
    )
    .unwrap();

    assert_eq!(config.policy.algorithm, HashAlgorithm::Sha384);

    let guard = SessionGuard::new(config);
    let mut store = MemoryStore::new();
    guard.start(&mut store, &browser("10.0.0.1", "AgentA"));
    assert_eq!(store.get(FINGERPRINT_KEY).unwrap().len(), 96);
}

#[test]
fn test_bad_algorithm_name_fails_before_any_request() {
    let bad: Result<GuardConfig, _> = serde_json::from_str(
        r#"{"use_fingerprint": true, "policy": {
            "use_client_address": true,
            "use_user_agent": true,
            "algorithm": "md5"
        }}"#,
    );
    assert!(bad.is_err());
}
