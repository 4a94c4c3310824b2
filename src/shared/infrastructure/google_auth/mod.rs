// Google service-account authentication shared by the Firestore and FCM adapters.
//
// Responsibilities
// - Parse the service-account bundle handed to the process at startup.
// - Mint and cache OAuth2 access tokens per scope, refreshing them lazily.

pub mod access_token;
pub mod service_account;

pub use access_token::{AccessToken, AccessTokenSource};
pub use service_account::ServiceAccountKey;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("service account bundle is not valid JSON: {0}")]
    MalformedBundle(#[from] serde_json::Error),

    #[error("service account bundle is missing `{0}`")]
    MissingField(&'static str),

    #[error("service account private key rejected: {0}")]
    InvalidKey(String),

    #[error("token endpoint unreachable: {0}")]
    Transport(String),

    #[error("token endpoint rejected the assertion: {status} {body}")]
    Rejected { status: u16, body: String },
}
