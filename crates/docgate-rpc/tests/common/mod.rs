// docgate-rpc/tests/common/mod.rs
// ============================================================================
// Module: Gateway Test Helpers
// Description: Stub store, capture sink, and dispatcher builders for tests.
// Purpose: Drive dispatch end-to-end without sockets or a real store.
// Dependencies: docgate-rpc, docgate-store, tiny_http
// ============================================================================

//! Shared helpers for gateway tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only helpers; not every test uses every helper."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use docgate_core::ServerDescriptor;
use docgate_rpc::Dispatcher;
use docgate_rpc::StateLogEvent;
use docgate_rpc::StateLogSink;
use docgate_store::ChoiceCache;
use docgate_store::ChoiceResolver;
use docgate_store::DocumentAdapter;
use docgate_store::StoreClient;
use docgate_store::StoreClientConfig;
use tiny_http::Response;
use tiny_http::Server;

/// Store base identifier used by every stub test.
pub const BASE_ID: &str = "appBase";
/// Table reference used by every stub test.
pub const TABLE: &str = "tblDocs";

/// One request observed by the stub store.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Path plus query string.
    pub url: String,
    /// Request body.
    pub body: String,
}

/// Canned response returned by a stub handler.
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: String,
}

impl StubResponse {
    /// Builds a JSON response.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Local stub server emulating the backing store.
pub struct StubStore {
    /// Listening server handle, shared with the worker thread.
    server: Arc<Server>,
    /// Requests observed so far, in arrival order.
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Worker thread serving requests until unblocked.
    handle: Option<thread::JoinHandle<()>>,
}

impl StubStore {
    /// Spawns a stub store; `handler` maps each observed request to a reply.
    pub fn spawn<H>(handler: H) -> Self
    where
        H: Fn(&RecordedRequest) -> StubResponse + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            while let Ok(mut request) = worker_server.recv() {
                let mut body = String::new();
                let _ = std::io::Read::read_to_string(&mut request.as_reader(), &mut body);
                let recorded = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body,
                };
                let reply = handler(&recorded);
                worker_requests.lock().unwrap().push(recorded);
                let response = Response::from_string(reply.body).with_status_code(reply.status);
                let _ = request.respond(response);
            }
        });
        Self {
            server,
            requests,
            handle: Some(handle),
        }
    }

    /// Returns the endpoint root for a client pointed at this stub.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.server.server_addr().to_ip().unwrap())
    }

    /// Returns the number of requests observed so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Drop for StubStore {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Sink capturing every recorded event for assertions.
#[derive(Debug, Default)]
pub struct CaptureSink {
    /// Events recorded so far, in order.
    events: Mutex<Vec<StateLogEvent>>,
}

impl CaptureSink {
    /// Returns every event recorded so far.
    pub fn events(&self) -> Vec<StateLogEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StateLogSink for CaptureSink {
    fn record(&self, event: &StateLogEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Builds a dispatcher over the stub with a capture sink.
pub fn stub_dispatcher(stub: &StubStore, projects: Vec<String>) -> (Dispatcher, Arc<CaptureSink>) {
    let client = StoreClient::new(StoreClientConfig {
        api_key: "pat-test".to_string(),
        base_id: BASE_ID.to_string(),
        base_url: stub.base_url(),
        timeout_ms: 5_000,
        user_agent: "docgate-tests/0.1".to_string(),
    })
    .unwrap();
    let resolver = ChoiceResolver::new(Arc::new(ChoiceCache::new()));
    let adapter = DocumentAdapter::new(client, TABLE, 100, resolver);
    let descriptor = ServerDescriptor::new("docgate", "0.1.0", 3001);
    let sink = Arc::new(CaptureSink::default());
    let dispatcher = Dispatcher::new(adapter, projects, descriptor, Arc::clone(&sink) as Arc<dyn StateLogSink>);
    (dispatcher, sink)
}
