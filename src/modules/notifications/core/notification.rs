// Notification derived from one new document.
//
// Purpose
// - Describe the push message independently of the delivery API.
//
// Lifecycle
// - Built right before dispatch and dropped afterwards. Never persisted.

use std::collections::BTreeMap;

use crate::modules::notifications::core::collection::Collection;
use crate::modules::notifications::core::document::Document;

pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidHints {
    pub channel_id: String,
    pub default_sound: bool,
    pub default_vibrate_timings: bool,
    pub sound: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub topic: String,
    pub title: String,
    pub body: String,
    pub android: AndroidHints,
    /// Routing data for the client: source collection and document id.
    pub data: BTreeMap<String, String>,
}

impl Notification {
    pub fn collection(&self) -> Option<&str> {
        self.data.get("collection").map(String::as_str)
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.data.get("doc_id").map(String::as_str)
    }
}

/// Fixed parts of every notification, taken from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub topic: String,
    pub title: String,
    pub default_body: String,
    pub android_channel_id: String,
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            topic: "allUsers".to_string(),
            title: "📢 Campus Update".to_string(),
            default_body: "Something New - Tap to Read".to_string(),
            android_channel_id: "high_importance_channel".to_string(),
        }
    }
}

impl NotificationTemplate {
    pub fn render(&self, collection: Collection, document: &Document) -> Notification {
        let data = BTreeMap::from([
            ("click_action".to_string(), CLICK_ACTION.to_string()),
            ("collection".to_string(), collection.as_str().to_string()),
            ("doc_id".to_string(), document.id.clone()),
        ]);

        Notification {
            topic: self.topic.clone(),
            title: self.title.clone(),
            body: document.display_title(&self.default_body).to_string(),
            android: AndroidHints {
                channel_id: self.android_channel_id.clone(),
                default_sound: true,
                default_vibrate_timings: true,
                sound: "default".to_string(),
            },
            data,
        }
    }
}

#[cfg(test)]
mod notification_template_tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn template() -> NotificationTemplate {
        NotificationTemplate::default()
    }

    #[rstest]
    fn it_should_render_the_document_title_as_body(template: NotificationTemplate) {
        let document = Document::new("doc-1", Some("Exam Schedule".into()), None);
        let notification = template.render(Collection::News, &document);

        assert_eq!(notification.topic, "allUsers");
        assert_eq!(notification.title, "📢 Campus Update");
        assert_eq!(notification.body, "Exam Schedule");
        assert_eq!(notification.android.channel_id, "high_importance_channel");
        assert_eq!(notification.collection(), Some("news"));
        assert_eq!(notification.doc_id(), Some("doc-1"));
        assert_eq!(
            notification.data.get("click_action").map(String::as_str),
            Some(CLICK_ACTION)
        );
    }

    #[rstest]
    fn it_should_use_the_default_body_without_a_title(template: NotificationTemplate) {
        let document = Document::new("doc-2", None, None);
        let notification = template.render(Collection::Files, &document);
        assert_eq!(notification.body, "Something New - Tap to Read");
        assert_eq!(notification.collection(), Some("files"));
    }
}
