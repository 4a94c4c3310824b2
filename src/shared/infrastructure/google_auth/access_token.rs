// OAuth2 access tokens for a service account (JWT bearer grant).
//
// Responsibilities
// - Sign an RS256 assertion with the service-account key and exchange it at the token endpoint.
// - Cache the token with its expiry and refresh it only when it is missing or about to expire.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{AuthError, ServiceAccountKey};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: i64 = 3600;
const REFRESH_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_SKEW_SECS) < self.expires_at
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

pub struct AccessTokenSource {
    key: Arc<ServiceAccountKey>,
    scope: String,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl AccessTokenSource {
    pub fn new(key: Arc<ServiceAccountKey>, scope: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            key,
            scope: scope.into(),
            http,
            cached: Mutex::new(None),
        }
    }

    /// Returns a bearer token that is valid for at least the refresh skew.
    pub async fn token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh_at(now)) {
            return Ok(token.value.clone());
        }

        tracing::debug!(scope = %self.scope, "refreshing access token");
        let token = self.fetch(now).await?;
        tracing::info!(scope = %self.scope, expires_at = %token.expires_at, "access token refreshed");
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_TTL_SECS,
        };
        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| AuthError::InvalidKey(e.to_string()))
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        let assertion = self.assertion(now)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed token response: {e}")))?;

        Ok(AccessToken::new(
            body.access_token,
            expiry_after(now, body.expires_in)?,
        ))
    }

    #[cfg(test)]
    async fn seed(&self, token: AccessToken) {
        *self.cached.lock().await = Some(token);
    }
}

fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, AuthError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| AuthError::Transport(format!("token expires_in out of range: {expires_in}")))
}

#[cfg(test)]
mod access_token_source_tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn source() -> AccessTokenSource {
        let key = ServiceAccountKey::from_json(
            r#"{"project_id":"p","client_email":"e","private_key":"not a pem","token_uri":"http://127.0.0.1:9/token"}"#,
        )
        .unwrap();
        AccessTokenSource::new(
            Arc::new(key),
            "https://www.googleapis.com/auth/firebase.messaging",
            reqwest::Client::new(),
        )
    }

    #[rstest]
    fn it_should_consider_a_token_stale_inside_the_refresh_skew() {
        let now = Utc::now();
        assert!(AccessToken::new("t", now + Duration::minutes(10)).is_fresh_at(now));
        assert!(!AccessToken::new("t", now + Duration::seconds(30)).is_fresh_at(now));
        assert!(!AccessToken::new("t", now - Duration::seconds(1)).is_fresh_at(now));
    }

    #[rstest]
    fn it_should_compute_the_expiry_from_the_token_lifetime() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 3599).unwrap(), now + Duration::seconds(3599));
    }

    #[rstest]
    #[case(i64::MAX)]
    #[case(i64::MIN)]
    #[case(i64::MAX / 1_000)]
    fn it_should_reject_an_out_of_range_token_lifetime(#[case] expires_in: i64) {
        assert!(matches!(
            expiry_after(Utc::now(), expires_in),
            Err(AuthError::Transport(_))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reuse_a_fresh_cached_token(source: AccessTokenSource) {
        source
            .seed(AccessToken::new("cached-token", Utc::now() + Duration::minutes(30)))
            .await;
        assert_eq!(source.token().await.unwrap(), "cached-token");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refresh_an_expired_token(source: AccessTokenSource) {
        source
            .seed(AccessToken::new("expired-token", Utc::now() - Duration::minutes(1)))
            .await;
        let result = source.token().await;
        assert!(matches!(result, Err(AuthError::InvalidKey(_))));
    }
}
