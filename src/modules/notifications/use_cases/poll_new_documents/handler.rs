// One tick of the watermark poller.
//
// Flow
// - Load the watermark (or resolve the initial one), ensure the delivery credential.
// - Scan news, events, files in that order and send one notification per new document.
// - Persist the newest creation timestamp that reached dispatch.
//
// Failure handling
// - A failed send is logged and still advances the watermark (at most one attempt per document).
// - Any store, credential or watermark error aborts the tick before the watermark is written.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::modules::notifications::core::collection::{Collection, PRIORITY_ORDER};
use crate::modules::notifications::core::notification::NotificationTemplate;
use crate::modules::notifications::core::ports::{
    DispatchError, DispatchOutcome, DocumentStore, DocumentStoreError, NotificationDispatcher,
    WatermarkError, WatermarkRepository,
};
use crate::modules::notifications::core::watermark::InitialWatermark;
use crate::modules::notifications::use_cases::poll_new_documents::decide::{Candidate, select_new};
use crate::modules::notifications::use_cases::poll_new_documents::report::TickReport;

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error("could not obtain a delivery credential: {0}")]
    Credential(#[from] DispatchError),

    #[error(transparent)]
    DocumentStore(#[from] DocumentStoreError),
}

pub struct PollNewDocumentsHandler<TStore, TDispatcher, TWatermarks>
where
    TStore: DocumentStore + 'static,
    TDispatcher: NotificationDispatcher + 'static,
    TWatermarks: WatermarkRepository + 'static,
{
    store: Arc<TStore>,
    dispatcher: Arc<TDispatcher>,
    watermarks: Arc<TWatermarks>,
    template: NotificationTemplate,
    initial_watermark: InitialWatermark,
}

impl<TStore, TDispatcher, TWatermarks> PollNewDocumentsHandler<TStore, TDispatcher, TWatermarks>
where
    TStore: DocumentStore + 'static,
    TDispatcher: NotificationDispatcher + 'static,
    TWatermarks: WatermarkRepository + 'static,
{
    pub fn new(
        store: Arc<TStore>,
        dispatcher: Arc<TDispatcher>,
        watermarks: Arc<TWatermarks>,
        template: NotificationTemplate,
        initial_watermark: InitialWatermark,
    ) -> Self {
        Self {
            store,
            dispatcher,
            watermarks,
            template,
            initial_watermark,
        }
    }

    pub async fn handle(&self) -> Result<TickReport, PollError> {
        self.handle_at(Utc::now()).await
    }

    /// Runs a tick; `now` only matters when no watermark has been persisted yet.
    pub async fn handle_at(&self, now: DateTime<Utc>) -> Result<TickReport, PollError> {
        let watermark = match self.watermarks.get().await? {
            Some(watermark) => watermark,
            None => {
                let watermark = self.initial_watermark.resolve(now);
                tracing::info!(
                    policy = ?self.initial_watermark,
                    %watermark,
                    "no stored watermark, starting fresh"
                );
                watermark
            }
        };

        self.dispatcher.ensure_credential().await?;

        let mut report = TickReport::starting_at(watermark);
        let mut newest = watermark;
        for collection in PRIORITY_ORDER {
            let documents = self.store.list(collection).await?;
            let selection = select_new(&watermark, &documents);
            if selection.skipped_without_timestamp > 0 {
                tracing::debug!(
                    %collection,
                    skipped = selection.skipped_without_timestamp,
                    "documents without a timestamp skipped"
                );
            }
            report.skipped_without_timestamp += selection.skipped_without_timestamp;

            for candidate in selection.candidates {
                if self.dispatch(collection, &candidate).await {
                    report.delivered += 1;
                } else {
                    report.failed += 1;
                }
                newest = newest.advance(candidate.created_at);
            }
        }

        self.watermarks.set(newest).await?;
        report.watermark_after = newest;
        Ok(report)
    }

    async fn dispatch(&self, collection: Collection, candidate: &Candidate<'_>) -> bool {
        let notification = self.template.render(collection, candidate.document);
        let doc_id = candidate.document.id.as_str();

        match self.dispatcher.send(&notification).await {
            Ok(DispatchOutcome::Delivered { message_id }) => {
                tracing::info!(
                    %collection,
                    doc_id,
                    title = %notification.body,
                    message_id = message_id.as_deref().unwrap_or("-"),
                    "notification sent"
                );
                true
            }
            Ok(DispatchOutcome::Rejected { status, body }) => {
                tracing::warn!(
                    %collection,
                    doc_id,
                    title = %notification.body,
                    status,
                    body = %body,
                    "notification rejected"
                );
                false
            }
            Err(error) => {
                tracing::warn!(
                    %collection,
                    doc_id,
                    title = %notification.body,
                    error = %error,
                    "notification failed"
                );
                false
            }
        }
    }
}
