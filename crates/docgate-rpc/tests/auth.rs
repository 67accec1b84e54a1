// docgate-rpc/tests/auth.rs
// ============================================================================
// Module: Gateway Auth Tests
// Description: Tests for connect-time bearer authentication.
// Purpose: Validate fail-closed behavior for every malformed credential.
// Dependencies: docgate-rpc
// ============================================================================

//! Connect-time authentication tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

use docgate_rpc::ConnectionAuth;
use docgate_rpc::MIN_BEARER_SECRET_BYTES;
use docgate_rpc::UNAUTHORIZED_CLOSE_CODE;

/// A secret long enough to be usable.
const SECRET: &str = "long-random-secret-value";

#[test]
fn matching_bearer_token_is_accepted() {
    let auth = ConnectionAuth::new(Some(SECRET.to_string()));
    assert!(auth.authorize(Some(&format!("Bearer {SECRET}"))));
}

#[test]
fn bearer_scheme_is_case_insensitive() {
    let auth = ConnectionAuth::new(Some(SECRET.to_string()));
    assert!(auth.authorize(Some(&format!("bearer {SECRET}"))));
    assert!(auth.authorize(Some(&format!("BEARER {SECRET}"))));
}

#[test]
fn non_matching_token_is_rejected() {
    let auth = ConnectionAuth::new(Some(SECRET.to_string()));
    assert!(!auth.authorize(Some("Bearer wrong-secret-value-here")));
    // A proper prefix of the secret must not authenticate.
    assert!(!auth.authorize(Some(&format!("Bearer {}", &SECRET[..SECRET.len() - 1]))));
}

#[test]
fn missing_header_is_rejected() {
    let auth = ConnectionAuth::new(Some(SECRET.to_string()));
    assert!(!auth.authorize(None));
}

#[test]
fn malformed_headers_are_rejected() {
    let auth = ConnectionAuth::new(Some(SECRET.to_string()));
    assert!(!auth.authorize(Some(SECRET)));
    assert!(!auth.authorize(Some("Basic dXNlcjpwYXNz")));
    assert!(!auth.authorize(Some("Bearer ")));
    assert!(!auth.authorize(Some("")));
}

#[test]
fn missing_expected_secret_rejects_everything() {
    let auth = ConnectionAuth::new(None);
    assert!(!auth.has_usable_secret());
    assert!(!auth.authorize(Some(&format!("Bearer {SECRET}"))));
}

#[test]
fn short_expected_secret_rejects_everything() {
    let short = "x".repeat(MIN_BEARER_SECRET_BYTES - 1);
    let auth = ConnectionAuth::new(Some(short.clone()));
    assert!(!auth.has_usable_secret());
    // Even the exact configured value is rejected while the secret is short.
    assert!(!auth.authorize(Some(&format!("Bearer {short}"))));
}

#[test]
fn minimum_length_secret_is_usable() {
    let minimal = "y".repeat(MIN_BEARER_SECRET_BYTES);
    let auth = ConnectionAuth::new(Some(minimal.clone()));
    assert!(auth.has_usable_secret());
    assert!(auth.authorize(Some(&format!("Bearer {minimal}"))));
}

#[test]
fn oversized_header_is_rejected() {
    let auth = ConnectionAuth::new(Some(SECRET.to_string()));
    let padded = format!("Bearer {}{}", SECRET, " ".repeat(9 * 1024));
    assert!(!auth.authorize(Some(&padded)));
}

#[test]
fn unauthorized_close_code_is_policy_violation() {
    assert_eq!(UNAUTHORIZED_CLOSE_CODE, 1008);
}
