use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use url_escape::encode_component;

use crate::config::{Config, SheetsAuth};

use super::auth::{ServiceAccountTokens, GOOGLE_TOKEN_URI};

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Request for range '{range}' failed.\n{source}")]
    Request {
        range: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Range '{range}' returned status {status}.")]
    Status { range: String, status: u16 },

    #[error("Could not deserialize range '{range}'.\n{source}")]
    Body {
        range: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not sign the service account assertion.\n{0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Token request failed.\n{0}")]
    TokenRequest(#[source] reqwest::Error),

    #[error("Token endpoint returned status {0}.")]
    TokenStatus(u16),
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Reads cell values out of one spreadsheet through the Sheets v4 REST API.
///
/// Build it once and hand it to whoever needs it, the underlying `reqwest::Client` keeps its
/// connection pool for as long as this lives.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    auth: SheetsAuth,
    tokens: Option<ServiceAccountTokens>,
}

impl SheetsClient {
    pub fn new(api_base: &str, spreadsheet_id: &str, auth: SheetsAuth) -> Self {
        let client = Client::new();
        let tokens = match &auth {
            SheetsAuth::ServiceAccount { email, private_key } => Some(ServiceAccountTokens::new(
                client.clone(),
                email,
                private_key,
                GOOGLE_TOKEN_URI,
            )),
            _ => None,
        };
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            auth,
            tokens,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.sheets_api_base, &config.spreadsheet_id, config.sheets_auth.clone())
    }

    pub fn range_url(&self, range: &str) -> String {
        let mut url = format!(
            "{}/v4/spreadsheets/{}/values/{}?majorDimension=ROWS",
            self.api_base,
            encode_component(&self.spreadsheet_id),
            encode_component(range)
        );
        if let SheetsAuth::ApiKey(key) = &self.auth {
            url.push_str("&key=");
            url.push_str(&encode_component(key));
        }
        url
    }

    async fn get_request(&self, range: &str) -> Result<RequestBuilder, SheetsError> {
        let request = self.client.get(self.range_url(range));
        if let Some(tokens) = &self.tokens {
            return Ok(request.bearer_auth(tokens.access_token().await?));
        }
        Ok(match &self.auth {
            SheetsAuth::AccessToken(token) => request.bearer_auth(token),
            _ => request,
        })
    }

    /// Fetches a range as rows of strings. Numbers and booleans are stringified, blanks become "".
    pub async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let response = self
            .get_request(range)
            .await?
            .send()
            .await
            .map_err(|source| SheetsError::Request {
                range: range.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(SheetsError::Status {
                range: range.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: ValueRange = response.json().await.map_err(|source| SheetsError::Body {
            range: range.to_string(),
            source,
        })?;
        Ok(stringify_rows(body.values))
    }
}

fn stringify_rows(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Value::String(text) => text,
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}
