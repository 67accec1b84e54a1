// docgate-store/src/client.rs
// ============================================================================
// Module: Store Client
// Description: Minimal HTTP wrapper for the backing store's REST surface.
// Purpose: Decode JSON bodies and raise structured errors on non-2xx status.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The store client covers exactly three endpoints: paginated record
//! listing, record create/patch with a `records` array body, and the schema
//! metadata listing consumed by the choice resolver. Every non-2xx response
//! carries the HTTP status and the parsed body so the adapter can classify
//! formula rejections without re-fetching.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field type label for single-select (enumerated) fields.
pub(crate) const SINGLE_SELECT_FIELD_TYPE: &str = "singleSelect";

/// Error-body markers classified as formula/parse-class rejections.
const FORMULA_REJECTION_MARKERS: &[&str] = &[
    "invalid_filter_by_formula",
    "invalid formula",
    "expected to find a '}' to match the '{' token",
];

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the store client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreClientConfig {
    /// API key presented as a bearer credential.
    pub api_key: String,
    /// Store base identifier.
    pub base_id: String,
    /// Store endpoint root.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for StoreClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            base_url: "https://api.airtable.com/v0".to_string(),
            timeout_ms: 10_000,
            user_agent: "docgate/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store client errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with a non-2xx status.
    #[error("store http {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Parsed response body, or `{"raw": <text>}` when not JSON.
        body: Value,
    },
    /// The request could not be sent or the response could not be read.
    #[error("store transport error: {0}")]
    Transport(String),
    /// The response body did not match the expected shape.
    #[error("store response decode failed: {0}")]
    Decode(String),
    /// A request URL could not be constructed.
    #[error("store url invalid: {0}")]
    Url(String),
}

impl StoreError {
    /// Returns true for formula/parse-class rejections.
    ///
    /// These are the only store failures the adapter retries (by falling
    /// back to an unfiltered scan); every other class propagates.
    #[must_use]
    pub fn is_formula_rejection(&self) -> bool {
        let Self::Http {
            body, ..
        } = self
        else {
            return false;
        };
        let haystack = body.to_string().to_ascii_lowercase();
        FORMULA_REJECTION_MARKERS.iter().any(|marker| haystack.contains(marker))
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// One record as returned by the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreRecord {
    /// Store-internal record identifier.
    pub id: String,
    /// Raw field object; listings surface this verbatim.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// One page of a record listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPage {
    /// Records on this page.
    #[serde(default)]
    pub records: Vec<StoreRecord>,
    /// Opaque cursor for the next page, absent on the last page.
    #[serde(default)]
    pub offset: Option<String>,
}

/// Parameters for one record-listing call.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Server-side filter formula.
    pub formula: Option<String>,
    /// Cap on the total records returned across pages.
    pub max_records: Option<u32>,
    /// Records per page.
    pub page_size: Option<u32>,
    /// Field projection; empty requests all fields.
    pub fields: Vec<String>,
    /// Opaque page cursor from the previous page.
    pub offset: Option<String>,
}

/// Table schema as returned by the metadata endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSchema {
    /// Table identifier.
    #[serde(default)]
    pub id: String,
    /// Table display name.
    #[serde(default)]
    pub name: String,
    /// Declared fields.
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// Field schema as returned by the metadata endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSchema {
    /// Field name.
    #[serde(default)]
    pub name: String,
    /// Field type label.
    #[serde(rename = "type", default)]
    pub field_type: String,
    /// Type-specific options.
    #[serde(default)]
    pub options: Option<FieldOptions>,
}

impl FieldSchema {
    /// Returns true when the field is an enumerated single-select field.
    #[must_use]
    pub fn is_single_select(&self) -> bool {
        self.field_type == SINGLE_SELECT_FIELD_TYPE
    }
}

/// Options block for enumerated fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldOptions {
    /// Declared choices.
    #[serde(default)]
    pub choices: Vec<ChoiceSchema>,
}

/// One declared choice of an enumerated field.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceSchema {
    /// Canonically-cased choice label.
    #[serde(default)]
    pub name: String,
}

/// Envelope of the metadata tables listing.
#[derive(Debug, Deserialize)]
struct TablesEnvelope {
    /// Declared tables for the base.
    #[serde(default)]
    tables: Vec<TableSchema>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Minimal HTTP client for the backing store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    /// HTTP client used for outbound requests.
    http: reqwest::Client,
    /// Store endpoint root.
    base_url: Url,
    /// API key presented as a bearer credential.
    api_key: String,
    /// Store base identifier.
    base_id: String,
}

impl StoreClient {
    /// Creates a new store client.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the endpoint root does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: StoreClientConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| StoreError::Url(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|_| StoreError::Transport("http client build failed".to_string()))?;
        Ok(Self {
            http,
            base_url,
            api_key: config.api_key,
            base_id: config.base_id,
        })
    }

    /// Returns the store base identifier this client is bound to.
    #[must_use]
    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    /// Fetches one page of records from `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure, non-2xx status, or an
    /// unexpected body shape.
    pub async fn list_records(&self, table: &str, query: &ListQuery) -> Result<RecordPage, StoreError> {
        let mut url = self.records_url(table)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(page_size) = query.page_size {
                pairs.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(formula) = &query.formula {
                pairs.append_pair("filterByFormula", formula);
            }
            if let Some(max_records) = query.max_records {
                pairs.append_pair("maxRecords", &max_records.to_string());
            }
            if let Some(offset) = &query.offset {
                pairs.append_pair("offset", offset);
            }
            for field in &query.fields {
                pairs.append_pair("fields[]", field);
            }
        }
        let body = self.execute(self.http.get(url)).await?;
        serde_json::from_value(body).map_err(|err| StoreError::Decode(err.to_string()))
    }

    /// Creates one record in `table`, returning it when the store echoes it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure or non-2xx status.
    pub async fn create_record(&self, table: &str, fields: &Value) -> Result<Option<StoreRecord>, StoreError> {
        let url = self.records_url(table)?;
        let payload = json!({ "records": [ { "fields": fields } ] });
        let body = self.execute(self.http.post(url).json(&payload)).await?;
        Ok(first_record(body))
    }

    /// Patches one record in `table` by its store-internal identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure or non-2xx status.
    pub async fn update_record(
        &self,
        table: &str,
        id: &str,
        fields: &Value,
    ) -> Result<Option<StoreRecord>, StoreError> {
        let url = self.records_url(table)?;
        let payload = json!({ "records": [ { "id": id, "fields": fields } ] });
        let body = self.execute(self.http.patch(url).json(&payload)).await?;
        Ok(first_record(body))
    }

    /// Fetches the schema metadata for every table in the base.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure, non-2xx status, or an
    /// unexpected body shape.
    pub async fn list_tables(&self) -> Result<Vec<TableSchema>, StoreError> {
        let url = self.meta_url()?;
        let body = self.execute(self.http.get(url)).await?;
        let envelope: TablesEnvelope =
            serde_json::from_value(body).map_err(|err| StoreError::Decode(err.to_string()))?;
        Ok(envelope.tables)
    }

    /// Builds the records endpoint URL for `table`.
    fn records_url(&self, table: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Url("store base url cannot be a base".to_string()))?
            .push(&self.base_id)
            .push(table);
        Ok(url)
    }

    /// Builds the schema metadata endpoint URL.
    fn meta_url(&self) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Url("store base url cannot be a base".to_string()))?
            .push("meta")
            .push("bases")
            .push(&self.base_id)
            .push("tables");
        Ok(url)
    }

    /// Sends a request and decodes the response body.
    ///
    /// Bodies that are not valid JSON are wrapped as `{"raw": <text>}` so a
    /// non-2xx error always carries something inspectable.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, StoreError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| StoreError::Transport(err.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }));
        if !(200..300).contains(&status) {
            return Err(StoreError::Http {
                status,
                body,
            });
        }
        Ok(body)
    }
}

/// Extracts the first record from a create/patch response body.
fn first_record(body: Value) -> Option<StoreRecord> {
    let page: RecordPage = serde_json::from_value(body).ok()?;
    page.records.into_iter().next()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
