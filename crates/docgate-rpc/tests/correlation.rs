// docgate-rpc/tests/correlation.rs
// ============================================================================
// Module: Correlation Tests
// Description: Tests for the client-side pending-RPC table.
// Purpose: Validate reply matching, caller timeouts, and late-reply drops.
// Dependencies: docgate-rpc, docgate-core, tokio
// ============================================================================

//! Pending-RPC correlation tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

use std::time::Duration;

use docgate_core::ReplyFrame;
use docgate_rpc::CorrelationError;
use docgate_rpc::PendingRpcs;
use serde_json::json;

#[tokio::test]
async fn reply_resolves_the_matching_entry() {
    let pending = PendingRpcs::new();
    let reply = pending.register(&json!("7"));

    let frame = ReplyFrame::success(Some(json!("7")), json!({"projects": []}));
    assert!(pending.resolve(frame.clone()));
    assert!(pending.is_empty());

    let received = reply.await_within(Duration::from_secs(1)).await.unwrap();
    assert_eq!(received, frame);
}

#[tokio::test]
async fn numeric_and_string_ids_do_not_collide_with_other_entries() {
    let pending = PendingRpcs::new();
    let first = pending.register(&json!(1));
    let second = pending.register(&json!("two"));
    assert_eq!(pending.len(), 2);

    assert!(pending.resolve(ReplyFrame::success(Some(json!("two")), json!({}))));
    assert_eq!(pending.len(), 1);

    assert!(pending.resolve(ReplyFrame::success(Some(json!(1)), json!({}))));
    assert!(first.await_within(Duration::from_secs(1)).await.is_ok());
    assert!(second.await_within(Duration::from_secs(1)).await.is_ok());
}

#[tokio::test]
async fn reply_without_id_is_dropped() {
    let pending = PendingRpcs::new();
    let _reply = pending.register(&json!("7"));

    let frame = ReplyFrame::failure(
        None,
        docgate_core::RpcError::new(docgate_core::ErrorCode::BadJson, "Invalid JSON", ""),
    );
    assert!(!pending.resolve(frame));
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn reply_for_unknown_id_is_dropped() {
    let pending = PendingRpcs::new();
    assert!(!pending.resolve(ReplyFrame::success(Some(json!("ghost")), json!({}))));
}

#[tokio::test]
async fn caller_timeout_then_discard_drops_the_late_reply() {
    let pending = PendingRpcs::new();
    let reply = pending.register(&json!("9"));

    let outcome = reply.await_within(Duration::from_millis(10)).await;
    assert_eq!(outcome.unwrap_err(), CorrelationError::TimedOut);

    // The caller discards after timing out, as the contract requires.
    assert!(pending.discard(&json!("9")));
    assert!(pending.is_empty());

    // The server's eventual reply finds nothing and is dropped.
    assert!(!pending.resolve(ReplyFrame::success(Some(json!("9")), json!({}))));
}

#[tokio::test]
async fn discard_is_idempotent() {
    let pending = PendingRpcs::new();
    let _reply = pending.register(&json!("9"));
    assert!(pending.discard(&json!("9")));
    assert!(!pending.discard(&json!("9")));
}

#[tokio::test]
async fn reregistering_an_id_abandons_the_old_continuation() {
    let pending = PendingRpcs::new();
    let old = pending.register(&json!("dup"));
    let new = pending.register(&json!("dup"));
    assert_eq!(pending.len(), 1);

    assert!(pending.resolve(ReplyFrame::success(Some(json!("dup")), json!({}))));
    assert_eq!(old.await_within(Duration::from_secs(1)).await.unwrap_err(), CorrelationError::Abandoned);
    assert!(new.await_within(Duration::from_secs(1)).await.is_ok());
}
