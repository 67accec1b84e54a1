// docgate-core/src/document.rs
// ============================================================================
// Module: Document Model
// Description: Canonical document field payload and write outcomes.
// Purpose: Shared document vocabulary for the adapter and the gateway.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A document is identified by its `(project, slug)` pair. The backing store
//! does not enforce that identity; the adapter enforces it operationally via
//! find-before-write. Listings surface raw store field objects, so this
//! module only models the fields Docgate itself writes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default document type applied when a write omits `doctype`.
pub const DEFAULT_DOCTYPE: &str = "md";
/// Default document status applied when a write omits `status`.
pub const DEFAULT_STATUS: &str = "draft";
/// Default document body applied when a write omits `content`.
pub const DEFAULT_CONTENT: &str = "";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Canonical document field payload written to the backing store.
///
/// # Invariants
/// - `(project, slug)` is the document identity within one table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    /// Project the document belongs to.
    pub project: String,
    /// Slug identifying the document within the project.
    pub slug: String,
    /// Optional human-readable document name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Document type label (single-select in the backing store).
    pub doctype: String,
    /// Document status label (single-select in the backing store).
    pub status: String,
    /// Document body.
    pub content: String,
}

/// Write outcome reported by the document adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    /// A new record was created.
    Created,
    /// An existing record was patched in place.
    Updated,
}

impl WriteAction {
    /// Returns the stable wire label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Result of a document upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenDoc {
    /// Whether the write created or updated a record.
    pub action: WriteAction,
    /// Store-internal record identifier, when the store reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Fields as written, after enum coercion.
    pub fields: DocumentFields,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
