// docgate-store/src/choices.rs
// ============================================================================
// Module: Choice Resolver
// Description: Canonical choice-label resolution for enumerated fields.
// Purpose: Coerce free-text enum values to the store's canonical casing.
// Dependencies: std
// ============================================================================

//! ## Overview
//! `resolve(table, field, candidate)` returns the store's canonically-cased
//! label when a case-insensitive match exists among the field's declared
//! choices, else the candidate unchanged. Coercion is best-effort and never
//! blocking: an absent field, a non-enumerated field, or an unmatched
//! candidate all pass the value through. Only metadata transport failures
//! propagate.
//!
//! Known limitation: cache entries live for the process lifetime and are
//! never invalidated, so a schema change in the backing store after the
//! first lookup is not observed until restart. This staleness is a
//! deliberate trade-off against refetching metadata on every write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::client::StoreClient;
use crate::client::StoreError;

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Cache key scoping a choice map to one store base, table, and field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChoiceKey {
    /// Store base identifier.
    base: String,
    /// Table reference (id or name, as configured).
    table: String,
    /// Lower-cased field name.
    field: String,
}

/// Injected cache of canonical choice labels.
///
/// Constructed explicitly at startup and shared by reference so tests can
/// inject an empty or pre-seeded instance; there is no process-global state.
/// Concurrent first-lookups for one key may both fetch metadata; the
/// redundant insert is benign because entries are idempotent once written.
#[derive(Debug, Default)]
pub struct ChoiceCache {
    /// Choice maps keyed by `(base, table, field)`.
    entries: Mutex<HashMap<ChoiceKey, HashMap<String, String>>>,
}

impl ChoiceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the cache with canonical labels for one field.
    ///
    /// Intended for tests; each label is keyed by its lower-cased form.
    pub fn seed(&self, base: &str, table: &str, field: &str, canonical: &[&str]) {
        let map = canonical
            .iter()
            .map(|label| ((*label).to_lowercase(), (*label).to_string()))
            .collect();
        self.insert(
            ChoiceKey {
                base: base.to_string(),
                table: table.to_string(),
                field: field.to_lowercase(),
            },
            map,
        );
    }

    /// Returns the cached choice map for `key`, if any.
    fn get(&self, key: &ChoiceKey) -> Option<HashMap<String, String>> {
        self.entries.lock().ok().and_then(|entries| entries.get(key).cloned())
    }

    /// Inserts a choice map; a poisoned lock degrades to a cache miss.
    fn insert(&self, key: ChoiceKey, map: HashMap<String, String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, map);
        }
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves free-text enum values to canonical choice labels.
#[derive(Debug, Clone)]
pub struct ChoiceResolver {
    /// Injected choice cache.
    cache: Arc<ChoiceCache>,
}

impl ChoiceResolver {
    /// Creates a resolver over an injected cache.
    #[must_use]
    pub fn new(cache: Arc<ChoiceCache>) -> Self {
        Self {
            cache,
        }
    }

    /// Resolves `candidate` against the declared choices of `field`.
    ///
    /// Returns the canonically-cased label when a case-insensitive match
    /// exists, else the candidate unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the metadata fetch itself fails.
    pub async fn resolve(
        &self,
        client: &StoreClient,
        table: &str,
        field: &str,
        candidate: &str,
    ) -> Result<String, StoreError> {
        let map = self.choice_map(client, table, field).await?;
        Ok(map.get(&candidate.to_lowercase()).cloned().unwrap_or_else(|| candidate.to_string()))
    }

    /// Returns the choice map for `(base, table, field)`, fetching metadata
    /// on a cache miss.
    ///
    /// An absent table, absent field, or non-single-select field caches an
    /// empty map, so the miss itself is remembered.
    async fn choice_map(
        &self,
        client: &StoreClient,
        table: &str,
        field: &str,
    ) -> Result<HashMap<String, String>, StoreError> {
        let key = ChoiceKey {
            base: client.base_id().to_string(),
            table: table.to_string(),
            field: field.to_lowercase(),
        };
        if let Some(map) = self.cache.get(&key) {
            return Ok(map);
        }
        let tables = client.list_tables().await?;
        let mut map = HashMap::new();
        let matched = tables.iter().find(|schema| schema.id == table || schema.name == table);
        if let Some(schema) = matched {
            let field_schema = schema
                .fields
                .iter()
                .find(|candidate| candidate.name.to_lowercase() == key.field && candidate.is_single_select());
            if let Some(field_schema) = field_schema {
                if let Some(options) = &field_schema.options {
                    for choice in &options.choices {
                        map.insert(choice.name.to_lowercase(), choice.name.clone());
                    }
                }
            }
        }
        self.cache.insert(key, map.clone());
        Ok(map)
    }
}
