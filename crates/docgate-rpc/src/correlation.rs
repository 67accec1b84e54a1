// docgate-rpc/src/correlation.rs
// ============================================================================
// Module: RPC Correlation
// Description: Client-side pending-RPC correlation table.
// Purpose: Match reply frames to outstanding requests by opaque id.
// Dependencies: docgate-core, tokio
// ============================================================================

//! ## Overview
//! The gateway implements no server-side operation timeout, so any caller
//! awaiting a correlated reply must impose its own. [`PendingRpcs`] holds
//! the id-to-continuation map: an entry is removed on the matching reply or
//! when the caller discards it after timeout, whichever comes first. A reply
//! arriving after discard finds no entry and is dropped; the in-flight call
//! on the server side is not cancelled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use docgate_core::ReplyFrame;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Correlation failures observed by a caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorrelationError {
    /// The caller-imposed timeout elapsed before a reply arrived.
    #[error("rpc timed out")]
    TimedOut,
    /// The pending entry was discarded before a reply arrived.
    #[error("rpc abandoned")]
    Abandoned,
}

// ============================================================================
// SECTION: Pending Table
// ============================================================================

/// Pending-RPC correlation table.
#[derive(Debug, Default)]
pub struct PendingRpcs {
    /// Continuations keyed by normalized correlation id.
    entries: Mutex<HashMap<String, oneshot::Sender<ReplyFrame>>>,
}

impl PendingRpcs {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an outstanding request and returns its continuation.
    ///
    /// Registering an id that is already pending replaces the old entry;
    /// its continuation resolves as abandoned.
    #[must_use]
    pub fn register(&self, id: &Value) -> PendingReply {
        let (sender, receiver) = oneshot::channel();
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id_key(id), sender);
        }
        PendingReply {
            receiver,
        }
    }

    /// Routes an inbound reply frame to its continuation.
    ///
    /// Returns false when the frame carries no id, no entry matches, or the
    /// caller already gave up; the frame is dropped in every such case.
    pub fn resolve(&self, frame: ReplyFrame) -> bool {
        let Some(id) = frame.id.as_ref() else {
            return false;
        };
        let key = id_key(id);
        let Some(sender) = self.entries.lock().ok().and_then(|mut entries| entries.remove(&key)) else {
            return false;
        };
        sender.send(frame).is_ok()
    }

    /// Discards a pending entry, typically after a caller timeout.
    ///
    /// Returns false when no entry was pending for the id.
    pub fn discard(&self, id: &Value) -> bool {
        self.entries.lock().map_or(false, |mut entries| entries.remove(&id_key(id)).is_some())
    }

    /// Returns the number of outstanding requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns true when no requests are outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalizes an opaque id value into a map key.
fn id_key(id: &Value) -> String {
    match id {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Pending Reply
// ============================================================================

/// Continuation for one outstanding request.
#[derive(Debug)]
pub struct PendingReply {
    /// Receiver completed by [`PendingRpcs::resolve`].
    receiver: oneshot::Receiver<ReplyFrame>,
}

impl PendingReply {
    /// Awaits the correlated reply, bounded by the caller's timeout.
    ///
    /// On timeout the caller should also [`PendingRpcs::discard`] the id so
    /// a late reply is dropped instead of leaking the entry.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationError::TimedOut`] when the timeout elapses and
    /// [`CorrelationError::Abandoned`] when the entry was discarded or
    /// replaced.
    pub async fn await_within(self, timeout: Duration) -> Result<ReplyFrame, CorrelationError> {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(frame)) => Ok(frame),
            Ok(Err(_)) => Err(CorrelationError::Abandoned),
            Err(_) => Err(CorrelationError::TimedOut),
        }
    }
}
