// NotificationDispatcher backed by the Firebase Cloud Messaging HTTP v1 API.
//
// Responsibilities
// - Translate a Notification into the FCM `messages:send` body.
// - Authenticate with a lazily refreshed service-account access token.
// - Report non-2xx answers as a rejected outcome carrying status and body, never as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::modules::notifications::core::notification::Notification;
use crate::modules::notifications::core::ports::{
    DispatchError, DispatchOutcome, NotificationDispatcher,
};
use crate::shared::infrastructure::google_auth::AccessTokenSource;

pub const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const FCM_BASE_URL: &str = "https://fcm.googleapis.com";
const ANDROID_PRIORITY: &str = "HIGH";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    topic: &'a str,
    notification: FcmNotification<'a>,
    android: FcmAndroidConfig<'a>,
    data: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmAndroidConfig<'a> {
    priority: &'static str,
    notification: FcmAndroidNotification<'a>,
}

#[derive(Debug, Serialize)]
struct FcmAndroidNotification<'a> {
    channel_id: &'a str,
    default_sound: bool,
    default_vibrate_timings: bool,
    sound: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: Option<String>,
}

impl<'a> From<&'a Notification> for SendRequest<'a> {
    fn from(notification: &'a Notification) -> Self {
        SendRequest {
            message: FcmMessage {
                topic: &notification.topic,
                notification: FcmNotification {
                    title: &notification.title,
                    body: &notification.body,
                },
                android: FcmAndroidConfig {
                    priority: ANDROID_PRIORITY,
                    notification: FcmAndroidNotification {
                        channel_id: &notification.android.channel_id,
                        default_sound: notification.android.default_sound,
                        default_vibrate_timings: notification.android.default_vibrate_timings,
                        sound: &notification.android.sound,
                    },
                },
                data: &notification.data,
            },
        }
    }
}

pub struct FcmNotificationDispatcher {
    project_id: String,
    base_url: String,
    http: reqwest::Client,
    tokens: AccessTokenSource,
}

impl FcmNotificationDispatcher {
    pub fn new(project_id: impl Into<String>, http: reqwest::Client, tokens: AccessTokenSource) -> Self {
        Self {
            project_id: project_id.into(),
            base_url: FCM_BASE_URL.to_string(),
            http,
            tokens,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

#[async_trait]
impl NotificationDispatcher for FcmNotificationDispatcher {
    async fn ensure_credential(&self) -> Result<(), DispatchError> {
        self.tokens.token().await?;
        Ok(())
    }

    async fn send(&self, notification: &Notification) -> Result<DispatchOutcome, DispatchError> {
        let access_token = self.tokens.token().await?;

        let response = self
            .http
            .post(self.send_url())
            .bearer_auth(&access_token)
            .json(&SendRequest::from(notification))
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let message_id = response
                .json::<SendResponse>()
                .await
                .ok()
                .and_then(|r| r.name);
            return Ok(DispatchOutcome::Delivered { message_id });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Ok(DispatchOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
