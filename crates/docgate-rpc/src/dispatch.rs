// docgate-rpc/src/dispatch.rs
// ============================================================================
// Module: RPC Dispatch
// Description: Frame parsing and method routing for the gateway.
// Purpose: Convert inbound text frames into adapter calls and reply frames.
// Dependencies: docgate-core, docgate-store, serde_json, time
// ============================================================================

//! ## Overview
//! Dispatch is transport-free: it maps one inbound text frame to exactly one
//! reply frame, so the whole routing surface is testable without a socket.
//! Parse failures yield an uncorrelated `BadJSON` reply; a missing string
//! `method` yields `BadRequest`; method names outside [`RpcMethod`] yield
//! `MethodNotFound`. Adapter failures become `Internal` replies — a
//! connection survives any single failed call. Every dispatch with a string
//! method is timed and recorded to the state log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use docgate_core::DEFAULT_CONTENT;
use docgate_core::DEFAULT_DOCTYPE;
use docgate_core::DEFAULT_STATUS;
use docgate_core::DocumentFields;
use docgate_core::ErrorCode;
use docgate_core::ReplyFrame;
use docgate_core::RpcError;
use docgate_core::RpcMethod;
use docgate_core::ServerDescriptor;
use docgate_store::DocumentAdapter;
use docgate_store::StoreError;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::statelog::StateLogEvent;
use crate::statelog::StateLogSink;

// ============================================================================
// SECTION: Request Payloads
// ============================================================================

/// Parameters accepted by `write_doc`.
///
/// `project` and `slug` default to empty so their absence surfaces as the
/// required-parameter error rather than a decode failure.
#[derive(Debug, Deserialize)]
struct WriteDocParams {
    /// Project the document belongs to.
    #[serde(default)]
    project: String,
    /// Slug identifying the document within the project.
    #[serde(default)]
    slug: String,
    /// Optional human-readable document name.
    #[serde(default)]
    name: Option<String>,
    /// Document type label; defaults to "md".
    #[serde(default)]
    doctype: Option<String>,
    /// Document status label; defaults to "draft".
    #[serde(default)]
    status: Option<String>,
    /// Document body; defaults to empty.
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Routes inbound frames over the closed method set.
pub struct Dispatcher {
    /// Document adapter backing the data methods.
    adapter: DocumentAdapter,
    /// Known project slugs served by `list_projects`.
    projects: Vec<String>,
    /// Static capability descriptor served by `info`.
    descriptor: ServerDescriptor,
    /// State log sink; failures are swallowed.
    sink: Arc<dyn StateLogSink>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        adapter: DocumentAdapter,
        projects: Vec<String>,
        descriptor: ServerDescriptor,
        sink: Arc<dyn StateLogSink>,
    ) -> Self {
        Self {
            adapter,
            projects,
            descriptor,
            sink,
        }
    }

    /// Handles one inbound text frame and returns the serialized reply.
    pub async fn dispatch_text(&self, raw: &str) -> String {
        let frame = self.dispatch(raw).await;
        serde_json::to_string(&frame).unwrap_or_else(|_| {
            "{\"ok\":false,\"error\":{\"code\":\"Internal\",\"message\":\"reply serialization \
             failed\",\"hint\":\"\"}}"
                .to_string()
        })
    }

    /// Handles one inbound text frame.
    pub async fn dispatch(&self, raw: &str) -> ReplyFrame {
        let Ok(message) = serde_json::from_str::<Value>(raw) else {
            return ReplyFrame::failure(
                None,
                RpcError::new(ErrorCode::BadJson, "Invalid JSON", "Send a JSON-RPC-like object"),
            );
        };
        let id = message.get("id").filter(|id| !id.is_null()).cloned();
        let Some(method) = message.get("method").and_then(Value::as_str).map(str::to_string) else {
            return ReplyFrame::failure(
                id,
                RpcError::new(ErrorCode::BadRequest, "Missing method", "Include a string \"method\""),
            );
        };
        let params = message.get("params").cloned();

        let started = Instant::now();
        let outcome = self.route(&method, params).await;
        let ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.sink.record(&StateLogEvent::Rpc {
            method,
            ms,
        });

        match outcome {
            Ok(result) => ReplyFrame::success(id, result),
            Err(error) => ReplyFrame::failure(id, error),
        }
    }

    /// Routes a parsed method name over the closed method set.
    async fn route(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        let Some(method) = RpcMethod::parse(method) else {
            return Err(RpcError::new(
                ErrorCode::MethodNotFound,
                format!("Unknown method {method}"),
                "Call info to list capabilities",
            ));
        };
        match method {
            RpcMethod::Ping => Ok(self.handle_ping()),
            RpcMethod::Info => self.handle_info(),
            RpcMethod::ListProjects => Ok(json!({ "projects": self.projects })),
            RpcMethod::ListDocs => self.handle_list_docs(params).await,
            RpcMethod::WriteDoc => self.handle_write_doc(params).await,
        }
    }

    /// Handles the liveness probe.
    fn handle_ping(&self) -> Value {
        json!({ "ok": true, "ts": now_rfc3339(), "server": self.descriptor.name })
    }

    /// Handles capability discovery.
    fn handle_info(&self) -> Result<Value, RpcError> {
        serde_json::to_value(&self.descriptor).map_err(|err| internal_message(err.to_string()))
    }

    /// Handles the per-project document listing.
    async fn handle_list_docs(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let project = params
            .as_ref()
            .and_then(|params| params.get("project"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|project| !project.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                RpcError::new(
                    ErrorCode::BadRequest,
                    "Missing required param: project",
                    "Provide { project: \"<slug>\" }",
                )
            })?;
        let docs = self.adapter.list_docs(&project).await.map_err(internal_error)?;
        Ok(json!({ "project": project, "docs": docs }))
    }

    /// Handles the document upsert.
    async fn handle_write_doc(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let Some(params) = params.filter(Value::is_object) else {
            return Err(RpcError::new(
                ErrorCode::BadRequest,
                "Missing params",
                "Provide { project, slug, name?, doctype?, status?, content? }",
            ));
        };
        let request: WriteDocParams = serde_json::from_value(params).map_err(|err| {
            RpcError::new(
                ErrorCode::BadRequest,
                err.to_string(),
                "Provide { project, slug, name?, doctype?, status?, content? }",
            )
        })?;
        if request.project.is_empty() || request.slug.is_empty() {
            return Err(RpcError::new(
                ErrorCode::BadRequest,
                "project and slug are required",
                "Provide { project:\"...\", slug:\"...\" }",
            ));
        }
        let draft = DocumentFields {
            project: request.project,
            slug: request.slug,
            name: request.name,
            doctype: request.doctype.unwrap_or_else(|| DEFAULT_DOCTYPE.to_string()),
            status: request.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            content: request.content.unwrap_or_else(|| DEFAULT_CONTENT.to_string()),
        };
        let written = self.adapter.write_doc(draft).await.map_err(internal_error)?;
        let written = serde_json::to_value(written).map_err(|err| internal_message(err.to_string()))?;
        Ok(json!({ "written": written }))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a store failure into the `Internal` reply payload.
fn internal_error(err: StoreError) -> RpcError {
    internal_message(err.to_string())
}

/// Builds an `Internal` reply payload from a message.
fn internal_message(message: String) -> RpcError {
    RpcError::new(ErrorCode::Internal, message, "Check server logs and store configuration")
}

/// Returns the current time as an RFC 3339 string.
fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}
