// docgate-rpc/src/connection.rs
// ============================================================================
// Module: Connection Identity
// Description: Connection id generation and the live-connection registry.
// Purpose: Provide unique, boot-scoped identifiers for lifecycle logging.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Each accepted socket gets one identifier for its lifetime, generated from
//! a boot-scoped random seed plus a monotonic counter. Identifiers are never
//! reused within a process and never persisted. The registry is the
//! process-wide set of live connections, mutated only on connect and
//! disconnect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rand::RngCore;
use rand::rngs::OsRng;

// ============================================================================
// SECTION: Id Generator
// ============================================================================

/// Boot-scoped connection id generator.
///
/// # Invariants
/// - Issued identifiers are unique within the process lifetime.
#[derive(Debug)]
pub struct ConnectionIdGenerator {
    /// Boot-scoped random identifier for entropy.
    boot_id: u64,
    /// Monotonic counter for ids issued in this process.
    counter: AtomicU64,
}

impl ConnectionIdGenerator {
    /// Creates a new generator seeded from the OS RNG.
    #[must_use]
    pub fn new() -> Self {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        Self {
            boot_id: u64::from_be_bytes(bytes),
            counter: AtomicU64::new(1),
        }
    }

    /// Issues a new connection id.
    #[must_use]
    pub fn issue(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("conn-{:016x}-{:016x}", self.boot_id, seq)
    }
}

impl Default for ConnectionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Process-wide set of live connection ids.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Live connection ids.
    entries: Mutex<HashSet<String>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection; returns false when the id was already live.
    pub fn insert(&self, cid: &str) -> bool {
        self.entries.lock().map_or(false, |mut entries| entries.insert(cid.to_string()))
    }

    /// Removes a connection; returns false when the id was not live.
    pub fn remove(&self, cid: &str) -> bool {
        self.entries.lock().map_or(false, |mut entries| entries.remove(cid))
    }

    /// Returns the number of live connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns true when no connections are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::ConnectionIdGenerator;
    use super::ConnectionRegistry;

    #[test]
    fn issued_ids_are_unique_and_prefixed() {
        let generator = ConnectionIdGenerator::new();
        let first = generator.issue();
        let second = generator.issue();
        assert_ne!(first, second);
        assert!(first.starts_with("conn-"));
    }

    #[test]
    fn registry_tracks_connect_and_disconnect() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert("conn-a"));
        assert!(!registry.insert("conn-a"));
        assert_eq!(registry.len(), 1);
        assert!(registry.remove("conn-a"));
        assert!(!registry.remove("conn-a"));
        assert!(registry.is_empty());
    }
}
