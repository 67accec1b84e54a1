// docgate-core/src/rpc.rs
// ============================================================================
// Module: RPC Envelope
// Description: Wire envelope types for the WebSocket JSON-RPC channel.
// Purpose: Preserve the exact request and reply frame shapes on the wire.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Requests arrive as `{"id", "jsonrpc": "2.0", "method", "params"}`; the
//! `jsonrpc` member is accepted and ignored. Replies are either
//! `{"id", "ok": true, "result"}` or `{"id", "ok": false, "error"}` with the
//! `id` echoed verbatim and omitted entirely when the request carried none.
//! An uncorrelated reply (no `id`) is still sent; id-based callers will drop
//! it unmatched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// Stable error codes surfaced to RPC callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The inbound frame was not parsable JSON.
    #[serde(rename = "BadJSON")]
    BadJson,
    /// A required parameter was missing or invalid.
    BadRequest,
    /// The method name is not in the supported set.
    MethodNotFound,
    /// An adapter or store failure; the message carries the underlying cause.
    Internal,
}

impl ErrorCode {
    /// Returns the stable wire label for the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadJson => "BadJSON",
            Self::BadRequest => "BadRequest",
            Self::MethodNotFound => "MethodNotFound",
            Self::Internal => "Internal",
        }
    }
}

/// Error payload carried by a failure reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable failure message.
    pub message: String,
    /// Actionable hint for the caller.
    pub hint: String,
}

impl RpcError {
    /// Builds an error payload.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: hint.into(),
        }
    }
}

// ============================================================================
// SECTION: Frames
// ============================================================================

/// Outbound request frame sent by gateway callers.
#[derive(Debug, Clone, Serialize)]
pub struct RequestFrame {
    /// Opaque correlation identifier, echoed verbatim by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Protocol marker, always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Method name.
    pub method: String,
    /// Optional parameters payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestFrame {
    /// Builds a request frame with the protocol marker set.
    #[must_use]
    pub fn new(id: Option<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// Reply frame sent by the gateway for every inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyFrame {
    /// Correlation identifier echoed from the request, omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Result payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl ReplyFrame {
    /// Builds a success reply.
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// Builds a failure reply.
    #[must_use]
    pub fn failure(id: Option<Value>, error: RpcError) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
