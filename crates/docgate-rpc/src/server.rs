// docgate-rpc/src/server.rs
// ============================================================================
// Module: RPC Gateway Server
// Description: WebSocket transport, liveness supervision, and composition.
// Purpose: Expose the dispatcher over authenticated persistent sockets.
// Dependencies: docgate-config, docgate-store, axum, tokio
// ============================================================================

//! ## Overview
//! One task per connection owns the socket. Authentication is decided from
//! the handshake headers before the upgrade completes; unauthenticated peers
//! observe only a policy-violation close. Each inbound text frame is
//! dispatched as its own task and replies are funneled through a bounded
//! per-connection queue, so an RPC that suspends on store I/O does not block
//! later frames. A fixed-interval ping supervises liveness: a peer that has
//! not acknowledged the previous ping by the next tick is dropped, bounding
//! dead-peer detection to twice the interval.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::extract::ws::CloseFrame;
use axum::extract::ws::Message;
use axum::extract::ws::Utf8Bytes;
use axum::extract::ws::WebSocket;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::routing::get;
use docgate_config::DocGateConfig;
use docgate_store::DocumentAdapter;
use futures::SinkExt;
use futures::StreamExt;
use futures::stream::SplitSink;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio::time::interval_at;

use crate::auth::ConnectionAuth;
use crate::auth::UNAUTHORIZED_CLOSE_CODE;
use crate::connection::ConnectionIdGenerator;
use crate::connection::ConnectionRegistry;
use crate::dispatch::Dispatcher;
use crate::statelog::FileStateLogSink;
use crate::statelog::StateLogEvent;
use crate::statelog::StateLogSink;
use crate::statelog::StderrStateLogSink;
use crate::statelog::spawn_drain;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Server name advertised by capability discovery.
pub const SERVER_NAME: &str = "docgate";
/// Depth of the per-connection reply queue.
const REPLY_QUEUE_DEPTH: usize = 64;

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// RPC gateway instance.
pub struct RpcGateway {
    /// Socket address the listener binds to.
    bind: SocketAddr,
    /// Shared connection-handling state.
    state: Arc<GatewayState>,
}

/// Shared state for connection handlers.
struct GatewayState {
    /// Frame dispatcher over the document adapter.
    dispatcher: Arc<Dispatcher>,
    /// Connect-time bearer policy.
    auth: ConnectionAuth,
    /// Live-connection registry.
    registry: ConnectionRegistry,
    /// Connection id generator.
    ids: ConnectionIdGenerator,
    /// State log sink; failures are swallowed.
    sink: Arc<dyn StateLogSink>,
    /// Liveness ping interval.
    ping_interval: Duration,
}

impl RpcGateway {
    /// Builds a gateway from configuration and a constructed adapter.
    ///
    /// The state-log composition is a bounded queue drained into the
    /// configured terminal sink by a background task, so this must be called
    /// within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the bind address is invalid or the log
    /// file cannot be opened.
    pub fn from_config(config: &DocGateConfig, adapter: DocumentAdapter) -> Result<Self, GatewayError> {
        let bind = config.bind_addr().map_err(|err| GatewayError::Config(err.to_string()))?;
        let terminal: Arc<dyn StateLogSink> = match &config.state_log.path {
            Some(path) => Arc::new(
                FileStateLogSink::new(path)
                    .map_err(|err| GatewayError::Config(format!("state log open failed: {err}")))?,
            ),
            None => Arc::new(StderrStateLogSink),
        };
        let sink: Arc<dyn StateLogSink> = Arc::new(spawn_drain(config.state_log.queue_depth, terminal));
        let descriptor = docgate_core::ServerDescriptor::new(SERVER_NAME, env!("CARGO_PKG_VERSION"), bind.port());
        let dispatcher =
            Arc::new(Dispatcher::new(adapter, config.projects.clone(), descriptor, Arc::clone(&sink)));
        let auth = ConnectionAuth::new(config.server.bearer_token.clone());
        emit_secret_warning(&auth);
        Ok(Self {
            bind,
            state: Arc::new(GatewayState {
                dispatcher,
                auth,
                registry: ConnectionRegistry::new(),
                ids: ConnectionIdGenerator::new(),
                sink,
                ping_interval: Duration::from_millis(config.server.ping_interval_ms),
            }),
        })
    }

    /// Serves connections until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the listener cannot bind or the server
    /// loop fails.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let app = Router::new()
            .route("/", get(handle_ws))
            .route("/ws", get(handle_ws))
            .with_state(Arc::clone(&self.state));
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|_| GatewayError::Transport("ws bind failed".to_string()))?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| GatewayError::Transport("ws server failed".to_string()))
    }
}

/// Warns when the configured secret cannot authenticate anyone.
fn emit_secret_warning(auth: &ConnectionAuth) {
    if !auth.has_usable_secret() {
        eprintln!(
            "docgate: WARNING: server.bearer_token is missing or too short; every connection \
             will be rejected until a long random secret is configured"
        );
    }
}

// ============================================================================
// SECTION: Connection Handling
// ============================================================================

/// How a connection ended, for lifecycle logging.
enum ConnectionEnd {
    /// The peer closed the socket or the stream ended.
    PeerClosed(Option<CloseFrame>),
    /// The previous ping was never acknowledged.
    LivenessTimeout,
    /// The transport failed mid-connection.
    TransportError(String),
}

/// Upgrades an inbound socket, deciding authentication from the handshake.
async fn handle_ws(
    State(state): State<Arc<GatewayState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    let auth_header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
    let authorized = state.auth.authorize(auth_header.as_deref());
    upgrade.on_upgrade(move |socket| handle_connection(state, socket, peer, authorized))
}

/// Runs one connection to completion.
async fn handle_connection(
    state: Arc<GatewayState>,
    mut socket: WebSocket,
    peer: SocketAddr,
    authorized: bool,
) {
    if !authorized {
        state.sink.record(&StateLogEvent::Reject {
            reason: "unauthorized".to_string(),
            ip: Some(peer.ip().to_string()),
        });
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: UNAUTHORIZED_CLOSE_CODE,
                reason: Utf8Bytes::from_static("unauthorized"),
            })))
            .await;
        return;
    }

    let cid = state.ids.issue();
    state.registry.insert(&cid);
    state.sink.record(&StateLogEvent::Connect {
        cid: cid.clone(),
        ip: Some(peer.ip().to_string()),
    });

    let end = connection_loop(&state, socket).await;

    state.registry.remove(&cid);
    match end {
        ConnectionEnd::PeerClosed(frame) => {
            let (code, reason) = frame.map_or((None, String::new()), |frame| {
                (Some(frame.code), frame.reason.to_string())
            });
            state.sink.record(&StateLogEvent::Disconnect {
                cid,
                code,
                reason,
            });
        }
        ConnectionEnd::LivenessTimeout => {
            state.sink.record(&StateLogEvent::Disconnect {
                cid,
                code: None,
                reason: "liveness timeout".to_string(),
            });
        }
        ConnectionEnd::TransportError(message) => {
            state.sink.record(&StateLogEvent::SocketError {
                cid,
                message,
            });
        }
    }
}

/// Reads frames, funnels replies, and supervises liveness for one socket.
async fn connection_loop(state: &Arc<GatewayState>, socket: WebSocket) -> ConnectionEnd {
    let (write_half, mut read_half) = socket.split();
    let (out_tx, out_rx) = mpsc::channel::<Message>(REPLY_QUEUE_DEPTH);
    let writer = tokio::spawn(write_outbound(write_half, out_rx));
    let mut alive = true;
    let mut ticker = interval_at(Instant::now() + state.ping_interval, state.ping_interval);

    let end = loop {
        tokio::select! {
            frame = read_half.next() => match frame {
                None => break ConnectionEnd::PeerClosed(None),
                Some(Err(err)) => break ConnectionEnd::TransportError(err.to_string()),
                Some(Ok(Message::Text(text))) => {
                    let dispatcher = Arc::clone(&state.dispatcher);
                    let out_tx = out_tx.clone();
                    tokio::spawn(async move {
                        let reply = dispatcher.dispatch_text(text.as_str()).await;
                        // The writer is gone once the connection ends; the
                        // late reply is dropped, not redirected.
                        let _ = out_tx.send(Message::Text(reply.into())).await;
                    });
                }
                Some(Ok(Message::Pong(_))) => {
                    alive = true;
                }
                Some(Ok(Message::Close(frame))) => break ConnectionEnd::PeerClosed(frame),
                // Pings are answered by the protocol layer; binary frames
                // are not part of the envelope and are ignored.
                Some(Ok(Message::Ping(_) | Message::Binary(_))) => {}
            },
            _ = ticker.tick() => {
                if !alive {
                    break ConnectionEnd::LivenessTimeout;
                }
                alive = false;
                if out_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break ConnectionEnd::TransportError("ping send failed".to_string());
                }
            }
        }
    };
    drop(out_tx);
    writer.abort();
    end
}

/// Drains outbound messages into the socket until the queue or socket closes.
async fn write_outbound(mut write_half: SplitSink<WebSocket, Message>, mut out_rx: mpsc::Receiver<Message>) {
    while let Some(message) = out_rx.recv().await {
        if write_half.send(message).await.is_err() {
            break;
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration errors.
    #[error("gateway config error: {0}")]
    Config(String),
    /// Transport errors.
    #[error("gateway transport error: {0}")]
    Transport(String),
}
