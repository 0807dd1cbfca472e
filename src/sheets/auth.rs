use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::debug;
use url_escape::encode_component;

use super::client::SheetsError;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens this close to expiry are renewed before use.
const RENEW_MARGIN: Duration = Duration::from_secs(60);

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// OAuth access tokens for a Google service account (the JWT bearer flow).
///
/// A token is minted on first use and reused until it gets close to expiring. Clones share the
/// cached token.
#[derive(Clone)]
pub struct ServiceAccountTokens {
    client: Client,
    email: String,
    private_key: String,
    token_uri: String,
    cached: Arc<Mutex<Option<CachedToken>>>,
}

impl ServiceAccountTokens {
    pub fn new(client: Client, email: &str, private_key: &str, token_uri: &str) -> Self {
        Self {
            client,
            email: email.to_string(),
            private_key: private_key.to_string(),
            token_uri: token_uri.to_string(),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    fn claims(&self, now: i64) -> Claims {
        Claims {
            iss: self.email.clone(),
            scope: SHEETS_READONLY_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    /// The RS256-signed JWT exchanged for an access token.
    fn assertion(&self, now: i64) -> Result<String, SheetsError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)?)
    }

    fn grant_body(assertion: &str) -> String {
        format!(
            "grant_type={}&assertion={}",
            encode_component(JWT_BEARER_GRANT),
            encode_component(assertion)
        )
    }

    async fn request_token(&self) -> Result<CachedToken, SheetsError> {
        let body = Self::grant_body(&self.assertion(Utc::now().timestamp())?);
        let response = self
            .client
            .post(&self.token_uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(SheetsError::TokenRequest)?;

        if !response.status().is_success() {
            return Err(SheetsError::TokenStatus(response.status().as_u16()));
        }

        let token: TokenResponse = response.json().await.map_err(SheetsError::TokenRequest)?;
        debug!(expires_in = token.expires_in, "minted service account token");
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    pub async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;
        if let Some(current) = cached
            .as_ref()
            .filter(|current| current.expires_at > Instant::now() + RENEW_MARGIN)
        {
            return Ok(current.token.clone());
        }
        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
