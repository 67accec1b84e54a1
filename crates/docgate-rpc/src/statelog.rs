// docgate-rpc/src/statelog.rs
// ============================================================================
// Module: State Log Sink
// Description: Fire-and-forget observability sink for gateway events.
// Purpose: Record RPC and connection lifecycle events off the critical path.
// Dependencies: serde_json, tokio
// ============================================================================

//! ## Overview
//! The gateway records one event per RPC invocation and per connection
//! lifecycle transition. Observability must never become a correctness or
//! availability dependency: every sink swallows its own failures, and the
//! default composition puts a bounded queue between the RPC path and the
//! terminal sink so a slow writer cannot block a reply. Events that do not
//! fit in the queue are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Connection and RPC lifecycle events recorded by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum StateLogEvent {
    /// An authenticated socket was accepted.
    #[serde(rename = "ws:connect")]
    Connect {
        /// Connection identifier.
        cid: String,
        /// Peer IP address when available.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ip: Option<String>,
    },
    /// A socket was rejected before protocol exchange.
    #[serde(rename = "ws:reject")]
    Reject {
        /// Rejection reason label.
        reason: String,
        /// Peer IP address when available.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ip: Option<String>,
    },
    /// One RPC dispatch completed (successfully or not).
    #[serde(rename = "ws:rpc")]
    Rpc {
        /// Method name as received.
        method: String,
        /// Elapsed milliseconds for the dispatch.
        ms: u64,
    },
    /// A connection ended.
    #[serde(rename = "ws:disconnect")]
    Disconnect {
        /// Connection identifier.
        cid: String,
        /// Close code when the peer sent one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
        /// Close reason label.
        reason: String,
    },
    /// A socket-level error occurred.
    #[serde(rename = "ws:error")]
    SocketError {
        /// Connection identifier.
        cid: String,
        /// Error message.
        message: String,
    },
}

/// Timestamped record written by terminal sinks.
#[derive(Debug, Clone, Serialize)]
pub struct StateLogRecord {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// The recorded event.
    #[serde(flatten)]
    pub event: StateLogEvent,
}

impl StateLogRecord {
    /// Stamps an event with the current time.
    #[must_use]
    pub fn new(event: StateLogEvent) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            event,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// One-way sink for gateway events.
///
/// Implementations swallow their own failures; callers never observe them.
pub trait StateLogSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &StateLogEvent);
}

// ============================================================================
// SECTION: Terminal Sinks
// ============================================================================

/// Sink that appends JSON lines to a file.
pub struct FileStateLogSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileStateLogSink {
    /// Opens the log file in append mode, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl StateLogSink for FileStateLogSink {
    fn record(&self, event: &StateLogEvent) {
        let record = StateLogRecord::new(event.clone());
        if let Ok(payload) = serde_json::to_string(&record)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that logs JSON lines to stderr.
pub struct StderrStateLogSink;

impl StateLogSink for StderrStateLogSink {
    fn record(&self, event: &StateLogEvent) {
        let record = StateLogRecord::new(event.clone());
        if let Ok(payload) = serde_json::to_string(&record) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op sink.
pub struct NoopStateLogSink;

impl StateLogSink for NoopStateLogSink {
    fn record(&self, _event: &StateLogEvent) {}
}

// ============================================================================
// SECTION: Channel Sink
// ============================================================================

/// Bounded-queue sink decoupling the RPC path from the terminal sink.
///
/// `record` never blocks: a full queue drops the event. The receiving end is
/// drained by [`spawn_drain`] or by a caller-owned task.
#[derive(Debug, Clone)]
pub struct ChannelStateLogSink {
    /// Sender used to enqueue events.
    sender: Sender<StateLogEvent>,
}

impl ChannelStateLogSink {
    /// Creates a channel sink over an existing sender.
    #[must_use]
    pub fn new(sender: Sender<StateLogEvent>) -> Self {
        Self {
            sender,
        }
    }
}

impl StateLogSink for ChannelStateLogSink {
    fn record(&self, event: &StateLogEvent) {
        let _ = self.sender.try_send(event.clone());
    }
}

/// Builds the default composition: a bounded queue drained into `terminal`
/// by a background task.
///
/// Must be called within a tokio runtime.
#[must_use]
pub fn spawn_drain(queue_depth: usize, terminal: Arc<dyn StateLogSink>) -> ChannelStateLogSink {
    let (sender, receiver) = tokio::sync::mpsc::channel(queue_depth);
    tokio::spawn(drain(receiver, terminal));
    ChannelStateLogSink::new(sender)
}

/// Moves events from the queue to the terminal sink until the queue closes.
async fn drain(mut receiver: Receiver<StateLogEvent>, terminal: Arc<dyn StateLogSink>) {
    while let Some(event) = receiver.recv().await {
        terminal.record(&event);
    }
}
