// docgate-store/src/lib.rs
// ============================================================================
// Module: Docgate Store Library
// Description: Store client, choice resolver, and document adapter.
// Purpose: Insulate callers from the backing store's query and enum quirks.
// Dependencies: docgate-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! This crate wraps the backing tabular store behind three layers: a minimal
//! HTTP [`client::StoreClient`], a [`choices::ChoiceResolver`] that maps
//! free-text enum values to the store's canonical choice labels, and the
//! [`adapter::DocumentAdapter`] implementing filtered listings with a
//! tolerant full-scan fallback and find-or-create upsert semantics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod choices;
pub mod client;
pub mod formula;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::DocumentAdapter;
pub use adapter::FoundDocument;
pub use choices::ChoiceCache;
pub use choices::ChoiceResolver;
pub use client::ListQuery;
pub use client::RecordPage;
pub use client::StoreClient;
pub use client::StoreClientConfig;
pub use client::StoreError;
pub use client::StoreRecord;
