// A record read from the document store.
//
// Purpose
// - Carry only what the poller needs to decide on and describe a notification.
//
// Ownership
// - Documents belong to the store. The poller reads them and never writes back.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Unique within its collection.
    pub id: String,
    pub title: Option<String>,
    /// Documents without a creation timestamp are never notified.
    pub created_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            title,
            created_at,
        }
    }

    pub fn display_title<'a>(&'a self, default: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(default)
    }
}
