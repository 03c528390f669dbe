//! Service-account authentication with end-user impersonation.
//!
//! Signs an RS256 JWT assertion for the impersonated user and exchanges it
//! for a bearer token at the key's token endpoint.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{PrioritizerError, PrioritizerResult};

/// Read/write scope for the tasks API
pub const TASKS_SCOPE: &str = "https://www.googleapis.com/auth/tasks";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion
const ASSERTION_TTL_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a service-account key file we rely on.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// A bearer token for one impersonated user.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Service-account credentials able to mint tokens for users in its domain.
pub struct ServiceAccount {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: Client,
}

impl ServiceAccount {
    /// Load from a key file on disk.
    pub fn from_file(path: &Path) -> PrioritizerResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PrioritizerError::CredentialsUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_json(&content)
    }

    /// Parse a key file's JSON contents.
    pub fn from_json(content: &str) -> PrioritizerResult<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(content).map_err(|e| PrioritizerError::InvalidCredentials {
                reason: e.to_string(),
            })?;

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            PrioritizerError::InvalidCredentials {
                reason: format!("private_key is not a usable RSA key: {e}"),
            }
        })?;

        Ok(Self {
            key,
            encoding_key,
            client: Client::new(),
        })
    }

    /// Send token requests somewhere other than the key's `token_uri`.
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.key.token_uri = uri.into();
        self
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Build a signed assertion impersonating `subject`.
    pub fn assertion(&self, subject: &str, now: DateTime<Utc>) -> PrioritizerResult<String> {
        let claims = Claims {
            iss: self.key.client_email.clone(),
            sub: subject.to_string(),
            scope: TASKS_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            PrioritizerError::InvalidCredentials {
                reason: format!("failed to sign assertion: {e}"),
            }
        })
    }

    /// Exchange a fresh assertion for an access token acting as `subject`.
    pub async fn access_token_for(&self, subject: &str) -> PrioritizerResult<AccessToken> {
        let now = Utc::now();
        let assertion = self.assertion(subject, now)?;

        debug!(token_uri = %self.key.token_uri, subject = %subject, "Exchanging assertion");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| PrioritizerError::TokenExchange {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PrioritizerError::TokenExchange {
                reason: format!("failed to read response: {e}"),
            })?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{} ({status}): {desc}", err.error),
                    None => format!("{} ({status})", err.error),
                },
                Err(_) => format!("({status}): {body}"),
            };
            return Err(PrioritizerError::TokenExchange { reason });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| PrioritizerError::TokenExchange {
                reason: format!("unexpected token response: {e}"),
            })?;

        info!(subject = %subject, "Obtained access token");

        Ok(AccessToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_TTL_SECS)),
        })
    }
}
