// In memory implementation of the NotificationDispatcher port.
//
// Purpose
// - Collect every notification handed to it so tests can inspect order and content.
//
// Responsibilities
// - Reject or fail the send for chosen document ids.
// - Simulate a credential that cannot be refreshed.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::modules::notifications::core::notification::Notification;
use crate::modules::notifications::core::ports::{
    DispatchError, DispatchOutcome, NotificationDispatcher,
};

#[derive(Default)]
pub struct InMemoryNotificationDispatcher {
    pub attempts: Mutex<Vec<Notification>>,
    rejected: HashSet<String>,
    unreachable: HashSet<String>,
    credential_offline: bool,
}

impl InMemoryNotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The messaging API answers with a 500 for this document.
    pub fn reject(&mut self, doc_id: impl Into<String>) {
        self.rejected.insert(doc_id.into());
    }

    /// The messaging API cannot be reached while sending this document.
    pub fn fail_transport(&mut self, doc_id: impl Into<String>) {
        self.unreachable.insert(doc_id.into());
    }

    pub fn toggle_credential_offline(&mut self) {
        self.credential_offline = !self.credential_offline;
    }

    pub async fn delivered_doc_ids(&self) -> Vec<String> {
        self.attempts
            .lock()
            .await
            .iter()
            .filter_map(|n| n.doc_id())
            .filter(|id| !self.rejected.contains(*id) && !self.unreachable.contains(*id))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotificationDispatcher {
    async fn ensure_credential(&self) -> Result<(), DispatchError> {
        if self.credential_offline {
            return Err(DispatchError::Backend("Credential refresh offline".into()));
        }
        Ok(())
    }

    async fn send(&self, notification: &Notification) -> Result<DispatchOutcome, DispatchError> {
        self.attempts.lock().await.push(notification.clone());
        let doc_id = notification.doc_id().unwrap_or_default();

        if self.unreachable.contains(doc_id) {
            return Err(DispatchError::Transport("Messaging API offline".into()));
        }
        if self.rejected.contains(doc_id) {
            return Ok(DispatchOutcome::Rejected {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(DispatchOutcome::Delivered {
            message_id: Some(format!("messages/{doc_id}")),
        })
    }
}

#[cfg(test)]
mod in_memory_notification_dispatcher_tests {
    use super::*;
    use crate::modules::notifications::core::collection::Collection;
    use crate::modules::notifications::core::notification::NotificationTemplate;
    use crate::tests::fixtures::documents::document;
    use rstest::{fixture, rstest};

    #[fixture]
    fn notification() -> Notification {
        NotificationTemplate::default().render(Collection::News, &document("doc-1", Some(1)))
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_record_and_deliver_the_notification(notification: Notification) {
        let dispatcher = InMemoryNotificationDispatcher::new();
        let outcome = dispatcher.send(&notification).await.unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Delivered {
                message_id: Some("messages/doc-1".into())
            }
        );
        assert_eq!(dispatcher.delivered_doc_ids().await, vec!["doc-1"]);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_chosen_document(notification: Notification) {
        let mut dispatcher = InMemoryNotificationDispatcher::new();
        dispatcher.reject("doc-1");
        let outcome = dispatcher.send(&notification).await.unwrap();
        assert!(!outcome.is_delivered());
        assert_eq!(dispatcher.attempts.lock().await.len(), 1);
        assert!(dispatcher.delivered_doc_ids().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_the_transport_for_a_chosen_document(notification: Notification) {
        let mut dispatcher = InMemoryNotificationDispatcher::new();
        dispatcher.fail_transport("doc-1");
        assert!(dispatcher.send(&notification).await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_to_ensure_an_offline_credential() {
        let mut dispatcher = InMemoryNotificationDispatcher::new();
        assert!(dispatcher.ensure_credential().await.is_ok());
        dispatcher.toggle_credential_offline();
        let result = dispatcher.ensure_credential().await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Credential refresh offline")
        );
    }
}
