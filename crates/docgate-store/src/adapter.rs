// docgate-store/src/adapter.rs
// ============================================================================
// Module: Document Adapter
// Description: Filtered document reads with fallback and upsert writes.
// Purpose: Guarantee correct results even when the store rejects a formula.
// Dependencies: docgate-core, serde_json
// ============================================================================

//! ## Overview
//! Every read and write path that depends on a server-side filter follows
//! the tolerant fallback protocol: issue the filtered, cursor-paginated
//! query; on a formula/parse-class rejection fetch the entire table
//! unfiltered and apply the equivalent predicate in-process; propagate any
//! other error class unretried. The fallback trades a full scan for
//! correctness in the rare rejection case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use docgate_core::DocumentFields;
use docgate_core::WriteAction;
use docgate_core::WrittenDoc;
use serde_json::Map;
use serde_json::Value;

use crate::choices::ChoiceResolver;
use crate::client::ListQuery;
use crate::client::StoreClient;
use crate::client::StoreError;
use crate::client::StoreRecord;
use crate::formula;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Enumerated field coerced on the write path.
const DOCTYPE_FIELD: &str = "doctype";
/// Enumerated field coerced on the write path.
const STATUS_FIELD: &str = "status";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A record located by `(project, slug)` identity.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundDocument {
    /// Store-internal record identifier.
    pub id: String,
    /// Raw field object as stored.
    pub fields: Map<String, Value>,
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Document adapter over one table of the backing store.
#[derive(Debug, Clone)]
pub struct DocumentAdapter {
    /// Store client for record and metadata endpoints.
    client: StoreClient,
    /// Table reference (id preferred, name accepted).
    table: String,
    /// Records requested per listing page.
    page_size: u32,
    /// Resolver for enumerated-field coercion on writes.
    choices: ChoiceResolver,
}

impl DocumentAdapter {
    /// Creates an adapter over `table`.
    #[must_use]
    pub fn new(client: StoreClient, table: impl Into<String>, page_size: u32, choices: ChoiceResolver) -> Self {
        Self {
            client,
            table: table.into(),
            page_size,
            choices,
        }
    }

    /// Lists the documents belonging to `project`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on any non-formula store failure.
    pub async fn list_docs(&self, project: &str) -> Result<Vec<Value>, StoreError> {
        let predicate = formula::by_project(project);
        let records = self
            .filtered_or_scan(&predicate, None, |fields| field_eq(fields, "project", project))
            .await?;
        Ok(records.into_iter().map(|record| Value::Object(record.fields)).collect())
    }

    /// Finds at most one document by `(project, slug)` identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on any non-formula store failure.
    pub async fn find_doc(&self, project: &str, slug: &str) -> Result<Option<FoundDocument>, StoreError> {
        let predicate = formula::by_project_and_slug(project, slug);
        let records = self
            .filtered_or_scan(&predicate, Some(1), |fields| {
                field_eq(fields, "project", project) && field_eq(fields, "slug", slug)
            })
            .await?;
        Ok(records.into_iter().next().map(|record| FoundDocument {
            id: record.id,
            fields: record.fields,
        }))
    }

    /// Upserts a document by `(project, slug)` identity.
    ///
    /// `doctype` and `status` are coerced to the store's canonical choice
    /// labels before the write; unmatched values pass through unchanged and
    /// the store decides their fate.
    ///
    /// This is a non-atomic read-then-write: the store offers no locking or
    /// conditional writes, so two concurrent writes for the same identity
    /// can both observe "not found" and create duplicate records. Callers
    /// needing stronger guarantees must serialize writes per identity
    /// externally.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on any non-formula store failure.
    pub async fn write_doc(&self, draft: DocumentFields) -> Result<WrittenDoc, StoreError> {
        let doctype = self
            .choices
            .resolve(&self.client, &self.table, DOCTYPE_FIELD, &draft.doctype)
            .await?;
        let status = self
            .choices
            .resolve(&self.client, &self.table, STATUS_FIELD, &draft.status)
            .await?;
        let fields = DocumentFields {
            doctype,
            status,
            ..draft
        };
        let payload = serde_json::to_value(&fields).map_err(|err| StoreError::Decode(err.to_string()))?;
        match self.find_doc(&fields.project, &fields.slug).await? {
            Some(found) => {
                let updated = self.client.update_record(&self.table, &found.id, &payload).await?;
                Ok(WrittenDoc {
                    action: WriteAction::Updated,
                    id: Some(updated.map_or(found.id, |record| record.id)),
                    fields,
                })
            }
            None => {
                let created = self.client.create_record(&self.table, &payload).await?;
                Ok(WrittenDoc {
                    action: WriteAction::Created,
                    id: created.map(|record| record.id),
                    fields,
                })
            }
        }
    }

    /// Lists documents whose status equals "approved" under any casing,
    /// optionally restricted to one project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on any non-formula store failure.
    pub async fn list_approved_docs(&self, project: Option<&str>) -> Result<Vec<Value>, StoreError> {
        let predicate = project.map_or_else(formula::approved_status, formula::approved_in_project);
        let records = self
            .filtered_or_scan(&predicate, None, |fields| {
                status_is_approved(fields) && project.is_none_or(|project| field_eq(fields, "project", project))
            })
            .await?;
        Ok(records.into_iter().map(|record| Value::Object(record.fields)).collect())
    }

    /// Runs the tolerant fallback protocol for one predicate.
    ///
    /// `in_process` must be the exact in-process equivalent of `predicate`;
    /// it is applied over the full-table scan when the store rejects the
    /// formula.
    async fn filtered_or_scan<P>(
        &self,
        predicate: &str,
        max_records: Option<u32>,
        in_process: P,
    ) -> Result<Vec<StoreRecord>, StoreError>
    where
        P: Fn(&Map<String, Value>) -> bool,
    {
        match self.list_filtered(Some(predicate), max_records).await {
            Ok(records) => Ok(records),
            Err(err) if err.is_formula_rejection() => {
                let all = self.list_filtered(None, None).await?;
                Ok(all.into_iter().filter(|record| in_process(&record.fields)).collect())
            }
            Err(err) => Err(err),
        }
    }

    /// Paginates one listing to exhaustion via the opaque offset cursor.
    async fn list_filtered(
        &self,
        predicate: Option<&str>,
        max_records: Option<u32>,
    ) -> Result<Vec<StoreRecord>, StoreError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let query = ListQuery {
                formula: predicate.map(str::to_string),
                max_records,
                page_size: Some(self.page_size),
                fields: Vec::new(),
                offset: offset.take(),
            };
            let page = self.client.list_records(&self.table, &query).await?;
            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(records)
    }
}

// ============================================================================
// SECTION: In-Process Predicates
// ============================================================================

/// Returns true when `fields[key]` is a string equal to `expected`.
fn field_eq(fields: &Map<String, Value>, key: &str, expected: &str) -> bool {
    fields.get(key).and_then(Value::as_str) == Some(expected)
}

/// Returns true when the status field equals "approved" ignoring case.
fn status_is_approved(fields: &Map<String, Value>) -> bool {
    fields
        .get(STATUS_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|status| status.eq_ignore_ascii_case(formula::APPROVED_STATUS))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
