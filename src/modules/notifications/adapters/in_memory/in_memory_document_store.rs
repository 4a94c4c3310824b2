// In memory implementation of the DocumentStore port.
//
// Purpose
// - Drive the poller in tests and local development without Firestore.
//
// Responsibilities
// - Keep documents per collection and hand them out ascending by creation timestamp.
// - Record which collections were scanned, and simulate an unreachable store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

use crate::modules::notifications::core::collection::Collection;
use crate::modules::notifications::core::document::Document;
use crate::modules::notifications::core::ports::{DocumentStore, DocumentStoreError};

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Collection, Vec<Document>>>,
    scans: Mutex<Vec<Collection>>,
    is_offline: bool,
    unreachable: Option<Collection>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// Fails every scan of `collection` while the other collections keep working.
    pub fn make_unreachable(&mut self, collection: Collection) {
        self.unreachable = Some(collection);
    }

    pub async fn insert(&self, collection: Collection, document: Document) {
        self.documents
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);
    }

    pub async fn scans(&self) -> Vec<Collection> {
        self.scans.lock().await.clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, DocumentStoreError> {
        self.scans.lock().await.push(collection);
        if self.is_offline || self.unreachable == Some(collection) {
            return Err(DocumentStoreError::Backend("Document store offline".into()));
        }

        let mut documents = self
            .documents
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        documents.sort_by_key(|d| d.created_at);
        Ok(documents)
    }
}
