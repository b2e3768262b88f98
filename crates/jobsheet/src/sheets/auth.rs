use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to read service account file {}: {source}", .path.display())]
    ReadCredentials {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid service account file: {0}")]
    InvalidCredentials(#[from] serde_json::Error),
    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("Token request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Token endpoint rejected the assertion ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Mints bearer tokens for Google APIs.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, scope: &str) -> Result<String, AuthError>;
}

/// The fields of a Google service-account key file this crate uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|source| AuthError::ReadCredentials {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Signs the RS256 assertion exchanged for an access token.
    pub fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Service-account token exchange. The key file is read on every call so a
/// missing or broken credential shows up as an upload failure, not at
/// start-up.
#[derive(Debug, Clone)]
pub struct ServiceAccountAuth {
    client: Client,
    key_file: PathBuf,
}

impl ServiceAccountAuth {
    pub fn new(key_file: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            key_file: key_file.into(),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self, scope: &str) -> Result<String, AuthError> {
        let key = ServiceAccountKey::from_file(&self.key_file)?;
        let assertion = key.assertion(scope, Utc::now())?;

        log::debug!("Requesting access token for {}", key.client_email);
        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenResponse>().await?.access_token)
    }
}
