// Process configuration.
//
// Sources
// - Optional settings from `CAMPUS_NOTIFIER_*` environment variables, defaults otherwise.
// - The required service-account bundle from `FIREBASE_SERVICE_ACCOUNT`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::modules::notifications::adapters::outbound::firestore_document_store::FieldNames;
use crate::modules::notifications::core::notification::NotificationTemplate;
use crate::modules::notifications::core::watermark::InitialWatermark;
use crate::shared::infrastructure::google_auth::{AuthError, ServiceAccountKey};

pub const ENV_PREFIX: &str = "CAMPUS_NOTIFIER";
pub const SERVICE_ACCOUNT_VAR: &str = "FIREBASE_SERVICE_ACCOUNT";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("FIREBASE_SERVICE_ACCOUNT environment variable not found")]
    MissingServiceAccount,

    #[error("FIREBASE_SERVICE_ACCOUNT is invalid: {0}")]
    InvalidServiceAccount(#[from] AuthError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub watermark_path: String,
    pub initial_watermark: InitialWatermark,
    pub topic: String,
    pub notification_title: String,
    pub default_body: String,
    pub android_channel_id: String,
    pub timestamp_field: String,
    pub title_field: String,
    pub database_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        let template = NotificationTemplate::default();
        let fields = FieldNames::default();
        Self {
            poll_interval_secs: 60,
            request_timeout_secs: 20,
            watermark_path: "last_timestamp.txt".to_string(),
            initial_watermark: InitialWatermark::Now,
            topic: template.topic,
            notification_title: template.title,
            default_body: template.default_body,
            android_channel_id: template.android_channel_id,
            timestamp_field: fields.timestamp,
            title_field: fields.title,
            database_id: "(default)".to_string(),
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_template(&self) -> NotificationTemplate {
        NotificationTemplate {
            topic: self.topic.clone(),
            title: self.notification_title.clone(),
            default_body: self.default_body.clone(),
            android_channel_id: self.android_channel_id.clone(),
        }
    }

    pub fn field_names(&self) -> FieldNames {
        FieldNames {
            timestamp: self.timestamp_field.clone(),
            title: self.title_field.clone(),
        }
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.poll_interval_secs == 0 {
            return Err(SettingsError::NotPositive("poll_interval_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::NotPositive("request_timeout_secs"));
        }
        Ok(self)
    }
}

/// Loads settings from the process environment.
pub fn load_settings() -> Result<Settings, SettingsError> {
    load_settings_from(Environment::with_prefix(ENV_PREFIX))
}

fn load_settings_from(environment: Environment) -> Result<Settings, SettingsError> {
    let config = Config::builder()
        .add_source(environment.try_parsing(true))
        .build()?;

    config.try_deserialize::<Settings>()?.validate()
}

pub fn service_account_from_env() -> Result<ServiceAccountKey, SettingsError> {
    let bundle =
        std::env::var(SERVICE_ACCOUNT_VAR).map_err(|_| SettingsError::MissingServiceAccount)?;
    Ok(ServiceAccountKey::from_json(&bundle)?)
}

#[cfg(test)]
mod settings_tests {
    use super::*;
    use rstest::rstest;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let mut source = config::Map::new();
        for (key, value) in vars {
            source.insert(key.to_string(), value.to_string());
        }
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[rstest]
    fn it_should_fall_back_to_defaults() {
        let settings = load_settings_from(environment(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.poll_interval(), Duration::from_secs(60));
        assert_eq!(settings.request_timeout(), Duration::from_secs(20));
        assert_eq!(settings.watermark_path, "last_timestamp.txt");
        assert_eq!(settings.initial_watermark, InitialWatermark::Now);
        assert_eq!(settings.notification_template(), NotificationTemplate::default());
        assert_eq!(settings.field_names(), FieldNames::default());
    }

    #[rstest]
    fn it_should_read_overrides_from_the_environment() {
        let settings = load_settings_from(environment(&[
            ("CAMPUS_NOTIFIER_POLL_INTERVAL_SECS", "15"),
            ("CAMPUS_NOTIFIER_INITIAL_WATERMARK", "epoch"),
            ("CAMPUS_NOTIFIER_WATERMARK_PATH", "/var/lib/notifier/watermark"),
            ("CAMPUS_NOTIFIER_TOPIC", "students"),
        ]))
        .unwrap();

        assert_eq!(settings.poll_interval_secs, 15);
        assert_eq!(settings.initial_watermark, InitialWatermark::Epoch);
        assert_eq!(settings.watermark_path, "/var/lib/notifier/watermark");
        assert_eq!(settings.notification_template().topic, "students");
        assert_eq!(settings.request_timeout_secs, 20);
    }

    #[rstest]
    fn it_should_reject_a_zero_poll_interval() {
        let result = load_settings_from(environment(&[("CAMPUS_NOTIFIER_POLL_INTERVAL_SECS", "0")]));
        assert!(matches!(
            result,
            Err(SettingsError::NotPositive("poll_interval_secs"))
        ));
    }

    #[rstest]
    fn it_should_reject_an_unknown_initial_watermark_policy() {
        let result =
            load_settings_from(environment(&[("CAMPUS_NOTIFIER_INITIAL_WATERMARK", "yesterday")]));
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[rstest]
    fn it_should_name_the_missing_service_account_variable() {
        assert_eq!(
            SettingsError::MissingServiceAccount.to_string(),
            "FIREBASE_SERVICE_ACCOUNT environment variable not found"
        );
    }
}
