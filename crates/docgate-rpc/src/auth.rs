// docgate-rpc/src/auth.rs
// ============================================================================
// Module: Gateway Authentication
// Description: Connect-time bearer authentication for inbound sockets.
// Purpose: Provide strict, fail-closed auth with constant-time comparison.
// Dependencies: subtle
// ============================================================================

//! ## Overview
//! Authentication happens once per connection, before any message is read.
//! The bearer credential from the handshake `Authorization` header is
//! compared to the configured secret in constant time so timing cannot
//! reveal prefix matches. A missing or short configured secret fails closed:
//! every connection is rejected until a usable secret is in place.
//! Unauthenticated peers are never given a protocol surface; they observe
//! only a close with [`UNAUTHORIZED_CLOSE_CODE`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use subtle::ConstantTimeEq;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum length of a usable configured bearer secret.
pub const MIN_BEARER_SECRET_BYTES: usize = 12;
/// Maximum accepted size of the inbound Authorization header.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;
/// WebSocket policy-violation close code sent to unauthorized peers.
pub const UNAUTHORIZED_CLOSE_CODE: u16 = 1008;

// ============================================================================
// SECTION: Connection Auth
// ============================================================================

/// Connect-time bearer policy for the gateway.
#[derive(Debug, Clone)]
pub struct ConnectionAuth {
    /// Expected bearer secret, when configured.
    expected: Option<String>,
}

impl ConnectionAuth {
    /// Builds the policy from the configured secret.
    #[must_use]
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected,
        }
    }

    /// Returns true when a usable secret is configured.
    #[must_use]
    pub fn has_usable_secret(&self) -> bool {
        self.expected.as_deref().is_some_and(|secret| secret.len() >= MIN_BEARER_SECRET_BYTES)
    }

    /// Decides whether the handshake `Authorization` header authenticates.
    ///
    /// Fail-closed on every malformed input: missing header, wrong scheme,
    /// oversized header, or an unusable configured secret.
    #[must_use]
    pub fn authorize(&self, auth_header: Option<&str>) -> bool {
        let Some(expected) = self.expected.as_deref() else {
            return false;
        };
        if expected.len() < MIN_BEARER_SECRET_BYTES {
            return false;
        }
        let Some(supplied) = parse_bearer_token(auth_header) else {
            return false;
        };
        constant_time_eq(expected.as_bytes(), supplied.as_bytes())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the token from a `Bearer <token>` header value.
fn parse_bearer_token(auth_header: Option<&str>) -> Option<String> {
    let header = auth_header?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return None;
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Compares two byte slices in constant time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
