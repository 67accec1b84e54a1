// docgate-core/src/lib.rs
// ============================================================================
// Module: Docgate Core Library
// Description: Shared vocabulary for the Docgate document gateway.
// Purpose: Define the RPC wire envelope, method set, and document model.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Docgate Core defines the types shared across the gateway, the document
//! adapter, and callers: the RPC envelope exchanged on the wire, the closed
//! set of supported methods, and the canonical document field payload. These
//! types are part of the external contract surface and must remain stable.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod methods;
pub mod rpc;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )]
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::DEFAULT_CONTENT;
pub use document::DEFAULT_DOCTYPE;
pub use document::DEFAULT_STATUS;
pub use document::DocumentFields;
pub use document::WriteAction;
pub use document::WrittenDoc;
pub use methods::RpcMethod;
pub use methods::ServerDescriptor;
pub use rpc::ErrorCode;
pub use rpc::ReplyFrame;
pub use rpc::RequestFrame;
pub use rpc::RpcError;
