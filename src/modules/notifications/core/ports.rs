// Ports define what the poller needs from the outside world, without implementing it.
//
// Purpose
// - Describe the document store, the notification dispatcher and the watermark storage as traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - In memory implementations live under adapters::in_memory.

use async_trait::async_trait;
use thiserror::Error;

use crate::modules::notifications::core::collection::Collection;
use crate::modules::notifications::core::document::Document;
use crate::modules::notifications::core::notification::Notification;
use crate::modules::notifications::core::watermark::Watermark;
use crate::shared::infrastructure::google_auth::AuthError;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("document store rejected the query for {collection}: {status} {body}")]
    Rejected {
        collection: Collection,
        status: u16,
        body: String,
    },

    #[error("document store unreachable: {0}")]
    Transport(String),

    #[error("unexpected document store response: {0}")]
    Decode(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("watermark storage failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored watermark {value:?} is not an RFC 3339 timestamp")]
    Corrupt { value: String },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Result of handing one notification to the messaging API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered { message_id: Option<String> },
    Rejected { status: u16, body: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of the collection, ascending by creation timestamp.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, DocumentStoreError>;
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Refreshes the delivery credential when it is missing or expired.
    async fn ensure_credential(&self) -> Result<(), DispatchError>;
    async fn send(&self, notification: &Notification) -> Result<DispatchOutcome, DispatchError>;
}

#[async_trait]
pub trait WatermarkRepository: Send + Sync {
    async fn get(&self) -> Result<Option<Watermark>, WatermarkError>;
    async fn set(&self, watermark: Watermark) -> Result<(), WatermarkError>;
}
