// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Client fingerprint generation.
//!
//! A fingerprint is a stable identity hash computed from client-identifying
//! request attributes (network address, user agent) under a configurable
//! policy. The same context and policy always produce the same fingerprint;
//! a different client produces a different one with overwhelming probability
//! (collision resistance inherited from the hash).
//!
//! Generation is pure: no network, no storage, no ambient request state.
//! Attributes arrive through an explicit [`RequestContext`] so the function
//! is independently testable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

use crate::error::GuardError;

/// Literal substituted for an attribute that is absent or excluded by policy.
const NULL_TOKEN: &str = "null";

/// Hash algorithm used for fingerprint digests.
///
/// Named after the lowercase identifiers accepted in configuration files
/// (`sha256`, `sha384`, `sha512`). An unknown name is a fatal configuration
/// error reported at parse time, never per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// String identifier for this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Look up an algorithm by its configuration name.
    pub fn from_name(name: &str) -> Result<Self, GuardError> {
        match name {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(GuardError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// Hex-encoded digest of `input` under this algorithm.
    pub fn digest_hex(&self, input: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(input)),
            HashAlgorithm::Sha384 => hex::encode(Sha384::digest(input)),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(input)),
        }
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha512
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Policy controlling which request attributes feed the fingerprint.
///
/// Immutable per guard instance. With both validators disabled every request
/// hashes the same `"null|null"` material, so the guard can never detect
/// hijacking; callers who disable both accept no fingerprint protection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintPolicy {
    /// Validate the fingerprint against the client network address.
    pub use_client_address: bool,

    /// Validate the fingerprint against the user-agent string.
    pub use_user_agent: bool,

    /// Hash algorithm for fingerprint generation.
    pub algorithm: HashAlgorithm,
}

impl Default for FingerprintPolicy {
    fn default() -> Self {
        Self {
            use_client_address: true,
            use_user_agent: true,
            algorithm: HashAlgorithm::default(),
        }
    }
}

impl FingerprintPolicy {
    /// Default policy with an algorithm looked up by configuration name.
    pub fn with_algorithm_name(name: &str) -> Result<Self, GuardError> {
        Ok(Self {
            algorithm: HashAlgorithm::from_name(name)?,
            ..Self::default()
        })
    }
}

/// Client-identifying attributes of one request.
///
/// Either attribute may be absent (proxied connections strip addresses,
/// non-browser clients omit user agents). Absence is not an error; the
/// missing attribute degrades to a fixed token in the hash material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub client_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Context with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client network address.
    pub fn client_address(mut self, addr: impl Into<String>) -> Self {
        self.client_address = Some(addr.into());
        self
    }

    /// Set the user-agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }
}

/// An opaque hex-encoded fingerprint digest.
///
/// Equality is constant-time to avoid leaking how much of a forged
/// fingerprint matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a hex digest previously issued by a generator (e.g. read back
    /// from a session store).
    pub fn from_hex(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// The hex digest.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Consume into the hex digest, for handing to a session store.
    pub fn into_hex(self) -> String {
        self.0
    }

    /// Constant-time comparison against a stored hex digest.
    pub fn matches_hex(&self, stored: &str) -> bool {
        bool::from(self.0.as_bytes().ct_eq(stored.as_bytes()))
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.matches_hex(&other.0)
    }
}

impl Eq for Fingerprint {}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates fingerprints from request contexts under a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct FingerprintGenerator {
    policy: FingerprintPolicy,
}

impl FingerprintGenerator {
    /// Create a generator with the given policy.
    pub fn new(policy: FingerprintPolicy) -> Self {
        Self { policy }
    }

    /// The active policy.
    pub fn policy(&self) -> &FingerprintPolicy {
        &self.policy
    }

    /// Generate a fingerprint for one request.
    ///
    /// Builds the canonical material `"<address>|<user-agent>"`, where each
    /// component is the literal `null` when its validator is disabled or the
    /// attribute is unavailable, then digests it with the policy algorithm.
    /// Deterministic and side-effect free.
    pub fn generate(&self, ctx: &RequestContext) -> Fingerprint {
        let addr = if self.policy.use_client_address {
            ctx.client_address.as_deref().unwrap_or(NULL_TOKEN)
        } else {
            NULL_TOKEN
        };
        let ua = if self.policy.use_user_agent {
            ctx.user_agent.as_deref().unwrap_or(NULL_TOKEN)
        } else {
            NULL_TOKEN
        };
        let material = format!("{}|{}", addr, ua);
        Fingerprint(self.policy.algorithm.digest_hex(material.as_bytes()))
    }

    /// Reset the validator flags to their defaults (both enabled).
    ///
    /// The algorithm is left untouched. Already-issued fingerprints are not
    /// affected.
    pub fn clear(&mut self) {
        self.policy.use_client_address = true;
        self.policy.use_user_agent = true;
    }
}

// ============================================================================
// TESTS
// ============================================================================
