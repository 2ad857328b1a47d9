// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Error types for sessionguard.
//!
//! The guard has exactly one fatal failure mode: an unrecognized hash
//! algorithm identifier in its configuration. It is surfaced when the
//! configuration is parsed or the guard is constructed, never per-request.
//! Everything else (missing request attributes, fingerprint mismatches,
//! store failures) is expressed through return values, not errors.

use std::fmt;

/// Errors produced while configuring the session guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// The configured hash algorithm name is not supported.
    ///
    /// Supported names are `sha256`, `sha384`, and `sha512`.
    UnsupportedAlgorithm(String),
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::UnsupportedAlgorithm(name) => {
                write!(f, "unsupported fingerprint hash algorithm: {}", name)
            }
        }
    }
}

impl std::error::Error for GuardError {}

// ============================================================================
// TESTS
// ============================================================================
