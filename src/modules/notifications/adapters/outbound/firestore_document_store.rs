// DocumentStore backed by the Firestore REST API (`documents:runQuery`).
//
// Responsibilities
// - Query one collection ordered by the timestamp field and read the whole result.
// - Return it sorted by the parsed creation timestamp, whatever value type carried it.
// - Map Firestore typed values onto Document: id from the resource name, title, creation timestamp.
//
// Mapping rules
// - The timestamp is a `timestampValue`, or a `stringValue` holding RFC 3339. Anything else counts as missing.
// - The title is a `stringValue`. Anything else counts as missing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::modules::notifications::core::collection::Collection;
use crate::modules::notifications::core::document::Document;
use crate::modules::notifications::core::ports::{DocumentStore, DocumentStoreError};
use crate::shared::infrastructure::google_auth::AccessTokenSource;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub timestamp: String,
    pub title: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            timestamp: "timestamp".to_string(),
            title: "title".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest<'a> {
    structured_query: StructuredQuery<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredQuery<'a> {
    from: [CollectionSelector<'a>; 1],
    order_by: [Order<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector<'a> {
    collection_id: &'a str,
}

#[derive(Debug, Serialize)]
struct Order<'a> {
    field: FieldReference<'a>,
    direction: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldReference<'a> {
    field_path: &'a str,
}

#[derive(Debug, Deserialize)]
struct RunQueryResult {
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreValue {
    string_value: Option<String>,
    timestamp_value: Option<String>,
}

impl<'a> RunQueryRequest<'a> {
    fn ordered_scan(collection: Collection, timestamp_field: &'a str) -> Self {
        Self {
            structured_query: StructuredQuery {
                from: [CollectionSelector {
                    collection_id: collection.as_str(),
                }],
                order_by: [Order {
                    field: FieldReference {
                        field_path: timestamp_field,
                    },
                    direction: "ASCENDING",
                }],
            },
        }
    }
}

fn parse_run_query(body: &str, fields: &FieldNames) -> Result<Vec<Document>, DocumentStoreError> {
    let results: Vec<RunQueryResult> =
        serde_json::from_str(body).map_err(|e| DocumentStoreError::Decode(e.to_string()))?;

    // Firestore orders by value type before value, so string timestamps arrive after all
    // timestampValue ones and compare as text.
    let mut documents: Vec<Document> = results
        .into_iter()
        .filter_map(|r| r.document)
        .map(|d| to_document(d, fields))
        .collect();
    documents.sort_by_key(|d| d.created_at);
    Ok(documents)
}

fn to_document(document: FirestoreDocument, fields: &FieldNames) -> Document {
    let id = document
        .name
        .rsplit('/')
        .next()
        .unwrap_or(&document.name)
        .to_string();
    let title = document
        .fields
        .get(&fields.title)
        .and_then(|v| v.string_value.clone());
    let created_at = document.fields.get(&fields.timestamp).and_then(|v| {
        v.timestamp_value
            .as_deref()
            .or(v.string_value.as_deref())
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|at| at.with_timezone(&Utc))
    });

    Document::new(id, title, created_at)
}

pub struct FirestoreDocumentStore {
    project_id: String,
    database_id: String,
    fields: FieldNames,
    http: reqwest::Client,
    tokens: AccessTokenSource,
}

impl FirestoreDocumentStore {
    pub fn new(
        project_id: impl Into<String>,
        database_id: impl Into<String>,
        fields: FieldNames,
        http: reqwest::Client,
        tokens: AccessTokenSource,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: database_id.into(),
            fields,
            http,
            tokens,
        }
    }

    fn run_query_url(&self) -> String {
        format!(
            "{FIRESTORE_BASE_URL}/v1/projects/{}/databases/{}/documents:runQuery",
            self.project_id,
            self.database_id
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, DocumentStoreError> {
        let access_token = self.tokens.token().await?;
        let request = RunQueryRequest::ordered_scan(collection, &self.fields.timestamp);

        let response = self
            .http
            .post(self.run_query_url())
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocumentStoreError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocumentStoreError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(DocumentStoreError::Rejected {
                collection,
                status: status.as_u16(),
                body,
            });
        }

        let documents = parse_run_query(&body, &self.fields)?;
        tracing::debug!(%collection, count = documents.len(), "collection scanned");
        Ok(documents)
    }
}
