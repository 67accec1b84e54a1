// docgate-rpc/src/lib.rs
// ============================================================================
// Module: Docgate RPC Library
// Description: WebSocket JSON-RPC gateway over the document adapter.
// Purpose: Authenticate, supervise, and dispatch agent RPC connections.
// Dependencies: docgate-config, docgate-core, docgate-store, axum, tokio
// ============================================================================

//! ## Overview
//! The gateway accepts WebSocket connections, authenticates each one with a
//! constant-time bearer comparison before any message is read, supervises
//! liveness with periodic pings, and dispatches the closed method set to the
//! document adapter. Every dispatch is timed and recorded to a
//! fire-and-forget state log; logging can never fail or delay an RPC.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod connection;
pub mod correlation;
pub mod dispatch;
pub mod server;
pub mod statelog;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth::ConnectionAuth;
pub use auth::MIN_BEARER_SECRET_BYTES;
pub use auth::UNAUTHORIZED_CLOSE_CODE;
pub use connection::ConnectionIdGenerator;
pub use connection::ConnectionRegistry;
pub use correlation::CorrelationError;
pub use correlation::PendingReply;
pub use correlation::PendingRpcs;
pub use dispatch::Dispatcher;
pub use server::GatewayError;
pub use server::RpcGateway;
pub use statelog::ChannelStateLogSink;
pub use statelog::FileStateLogSink;
pub use statelog::NoopStateLogSink;
pub use statelog::StateLogEvent;
pub use statelog::StateLogRecord;
pub use statelog::StateLogSink;
pub use statelog::StderrStateLogSink;
pub use statelog::spawn_drain;
