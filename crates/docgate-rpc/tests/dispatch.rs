// docgate-rpc/tests/dispatch.rs
// ============================================================================
// Module: Dispatch Tests
// Description: Tests for frame parsing, routing, and error replies.
// Purpose: Validate the reply envelope for every dispatch outcome.
// Dependencies: docgate-rpc, docgate-store, tiny_http
// ============================================================================

//! ## Overview
//! Feeds raw text frames into [`Dispatcher`] and asserts the exact reply
//! envelope:
//! - `BadJSON` uncorrelated reply for unparsable frames
//! - `BadRequest` for missing method or missing required params, without
//!   contacting the store
//! - `MethodNotFound` naming the method, with the capability hint
//! - Adapter failures surfaced as `Internal` replies
//! - Every dispatch with a string method lands in the state log

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

mod common;

use docgate_core::ErrorCode;
use docgate_core::ReplyFrame;
use docgate_rpc::StateLogEvent;
use serde_json::Value;
use serde_json::json;

use crate::common::StubResponse;
use crate::common::StubStore;
use crate::common::stub_dispatcher;

/// Stub that fails the test if any request reaches the store.
fn unreachable_store() -> StubStore {
    StubStore::spawn(|request| {
        StubResponse::json(500, json!({"error": format!("unexpected request to {}", request.url)}).to_string())
    })
}

/// Dispatches one raw frame and parses the reply envelope.
async fn roundtrip(dispatcher: &docgate_rpc::Dispatcher, raw: &str) -> ReplyFrame {
    let reply = dispatcher.dispatch_text(raw).await;
    serde_json::from_str(&reply).unwrap()
}

#[tokio::test]
async fn unparsable_frame_yields_uncorrelated_bad_json() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(&dispatcher, "{not json").await;
    assert!(reply.id.is_none());
    assert!(!reply.ok);
    assert_eq!(reply.error.as_ref().unwrap().code, ErrorCode::BadJson);
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn missing_method_yields_bad_request_with_echoed_id() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(&dispatcher, r#"{"id":"42","params":{}}"#).await;
    assert_eq!(reply.id, Some(json!("42")));
    assert_eq!(reply.error.as_ref().unwrap().code, ErrorCode::BadRequest);
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn unknown_method_yields_method_not_found() {
    let stub = unreachable_store();
    let (dispatcher, sink) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(&dispatcher, r#"{"id":1,"jsonrpc":"2.0","method":"drop_table"}"#).await;
    let error = reply.error.unwrap();
    assert_eq!(error.code, ErrorCode::MethodNotFound);
    assert!(error.message.contains("drop_table"));
    assert!(error.hint.contains("info"));
    assert_eq!(stub.request_count(), 0);

    // Unknown methods still reach the state log as dispatches.
    let events = sink.events();
    assert!(matches!(&events[0], StateLogEvent::Rpc { method, .. } if method == "drop_table"));
}

#[tokio::test]
async fn ping_replies_with_timestamp() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(&dispatcher, r#"{"id":1,"jsonrpc":"2.0","method":"ping"}"#).await;
    assert!(reply.ok);
    let result = reply.result.unwrap();
    assert_eq!(result.get("ok"), Some(&Value::Bool(true)));
    assert_eq!(result.get("server").and_then(Value::as_str), Some("docgate"));
    assert!(result.get("ts").and_then(Value::as_str).is_some());
}

#[tokio::test]
async fn info_advertises_the_method_set() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(&dispatcher, r#"{"id":2,"jsonrpc":"2.0","method":"info"}"#).await;
    let result = reply.result.unwrap();
    assert_eq!(result.get("name").and_then(Value::as_str), Some("docgate"));
    let capabilities = result.get("capabilities").and_then(Value::as_array).unwrap();
    assert!(capabilities.contains(&json!("list_docs")));
    assert!(capabilities.contains(&json!("write_doc")));
}

#[tokio::test]
async fn list_projects_reads_configuration_not_the_store() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, vec!["nexus".to_string(), "atlas".to_string()]);

    let reply = roundtrip(&dispatcher, r#"{"id":3,"jsonrpc":"2.0","method":"list_projects"}"#).await;
    assert_eq!(reply.result.unwrap(), json!({"projects": ["nexus", "atlas"]}));
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn list_docs_with_blank_project_is_rejected_before_the_store() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply =
        roundtrip(&dispatcher, r#"{"id":4,"jsonrpc":"2.0","method":"list_docs","params":{"project":"  "}}"#).await;
    assert_eq!(reply.id, Some(json!(4)));
    let error = reply.error.unwrap();
    assert_eq!(error.code, ErrorCode::BadRequest);
    assert!(error.message.contains("project"));
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn list_docs_returns_project_and_docs() {
    let stub = StubStore::spawn(|_| {
        StubResponse::json(
            200,
            json!({"records": [{"id": "rec1", "fields": {"project": "nexus", "slug": "readme"}}]}).to_string(),
        )
    });
    let (dispatcher, sink) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(
        &dispatcher,
        r#"{"id":5,"jsonrpc":"2.0","method":"list_docs","params":{"project":" nexus "}}"#,
    )
    .await;
    assert!(reply.ok);
    let result = reply.result.unwrap();
    // The project echo is the trimmed value actually queried.
    assert_eq!(result.get("project"), Some(&json!("nexus")));
    let docs = result.get("docs").and_then(Value::as_array).unwrap();
    assert_eq!(docs.len(), 1);

    let events = sink.events();
    assert!(matches!(&events[0], StateLogEvent::Rpc { method, .. } if method == "list_docs"));
}

#[tokio::test]
async fn write_doc_requires_project_and_slug() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(
        &dispatcher,
        r#"{"id":6,"jsonrpc":"2.0","method":"write_doc","params":{"project":"nexus"}}"#,
    )
    .await;
    let error = reply.error.unwrap();
    assert_eq!(error.code, ErrorCode::BadRequest);
    assert!(error.message.contains("slug"));
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn write_doc_applies_defaults_and_reports_the_action() {
    let stub = StubStore::spawn(|request| {
        if request.url.starts_with("/meta/") {
            return StubResponse::json(200, json!({"tables": []}).to_string());
        }
        match request.method.as_str() {
            "GET" => StubResponse::json(200, json!({"records": []}).to_string()),
            "POST" => {
                let body: Value = serde_json::from_str(&request.body).unwrap();
                let fields = &body["records"][0]["fields"];
                assert_eq!(fields["doctype"], json!("md"));
                assert_eq!(fields["status"], json!("draft"));
                assert_eq!(fields["content"], json!(""));
                StubResponse::json(200, json!({"records": [{"id": "recNew", "fields": fields}]}).to_string())
            }
            other => StubResponse::json(500, json!({"error": format!("unexpected {other}")}).to_string()),
        }
    });
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(
        &dispatcher,
        r#"{"id":7,"jsonrpc":"2.0","method":"write_doc","params":{"project":"nexus","slug":"readme"}}"#,
    )
    .await;
    assert!(reply.ok);
    let written = reply.result.unwrap();
    assert_eq!(written["written"]["action"], json!("created"));
    assert_eq!(written["written"]["id"], json!("recNew"));
}

#[tokio::test]
async fn adapter_failures_surface_as_internal_replies() {
    let stub = StubStore::spawn(|_| StubResponse::json(500, json!({"error": "boom"}).to_string()));
    let (dispatcher, sink) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(
        &dispatcher,
        r#"{"id":8,"jsonrpc":"2.0","method":"list_docs","params":{"project":"nexus"}}"#,
    )
    .await;
    assert_eq!(reply.id, Some(json!(8)));
    let error = reply.error.unwrap();
    assert_eq!(error.code, ErrorCode::Internal);

    // The failed dispatch is still timed and logged.
    let events = sink.events();
    assert!(matches!(&events[0], StateLogEvent::Rpc { method, .. } if method == "list_docs"));
}

#[tokio::test]
async fn frame_without_id_still_receives_a_reply() {
    let stub = unreachable_store();
    let (dispatcher, _) = stub_dispatcher(&stub, Vec::new());

    let reply = roundtrip(&dispatcher, r#"{"jsonrpc":"2.0","method":"ping"}"#).await;
    assert!(reply.ok);
    assert!(reply.id.is_none());
}
