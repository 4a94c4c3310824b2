use std::sync::Arc;

use crate::modules::notifications::adapters::outbound::fcm_notification_dispatcher::{
    FcmNotificationDispatcher, MESSAGING_SCOPE,
};
use crate::modules::notifications::adapters::outbound::file_watermark_repository::FileWatermarkRepository;
use crate::modules::notifications::adapters::outbound::firestore_document_store::{
    DATASTORE_SCOPE, FirestoreDocumentStore,
};
use crate::modules::notifications::use_cases::poll_new_documents::handler::PollNewDocumentsHandler;
use crate::modules::notifications::use_cases::run_poller::runner::PollerRunner;
use crate::shared::infrastructure::google_auth::{AccessTokenSource, ServiceAccountKey};
use crate::shell::settings::Settings;

pub type NotifierRunner =
    PollerRunner<FirestoreDocumentStore, FcmNotificationDispatcher, FileWatermarkRepository>;

/// Everything the poller needs, built once at startup.
pub struct AppContext {
    pub settings: Settings,
    pub store: Arc<FirestoreDocumentStore>,
    pub dispatcher: Arc<FcmNotificationDispatcher>,
    pub watermarks: Arc<FileWatermarkRepository>,
}

impl AppContext {
    pub fn build(settings: Settings, key: ServiceAccountKey) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        let key = Arc::new(key);

        let store = FirestoreDocumentStore::new(
            key.project_id.clone(),
            settings.database_id.clone(),
            settings.field_names(),
            http.clone(),
            AccessTokenSource::new(key.clone(), DATASTORE_SCOPE, http.clone()),
        );
        let dispatcher = FcmNotificationDispatcher::new(
            key.project_id.clone(),
            http.clone(),
            AccessTokenSource::new(key, MESSAGING_SCOPE, http),
        );
        let watermarks = FileWatermarkRepository::new(&settings.watermark_path);

        Ok(Self {
            settings,
            store: Arc::new(store),
            dispatcher: Arc::new(dispatcher),
            watermarks: Arc::new(watermarks),
        })
    }

    pub fn runner(&self) -> NotifierRunner {
        let handler = PollNewDocumentsHandler::new(
            self.store.clone(),
            self.dispatcher.clone(),
            self.watermarks.clone(),
            self.settings.notification_template(),
            self.settings.initial_watermark,
        );
        PollerRunner::new(Arc::new(handler), self.settings.poll_interval())
    }
}
