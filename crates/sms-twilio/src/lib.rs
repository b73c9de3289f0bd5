//! # Twilio SMS Provider
//!
//! Twilio REST implementation of [`SmsClient`], plus the [`ClientFactory`]
//! the send endpoint uses to build a client from configured credentials.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//! use sms_twilio::TwilioClient;
//!
//! let client = TwilioClient::new("AC...", "auth_token")?;
//! let response = client.send(SendRequest {
//!     to: "+15062345678",
//!     from: "+12015550123",
//!     text: "Hello from Twilio!"
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sms_core::{ClientFactory, Credentials, SendRequest, SendResponse, SmsClient, SmsError};
use std::sync::Arc;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;
use tracing::{debug, error, info};
use url::Url;

const PROVIDER: &str = "twilio";
const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio REST client.
#[derive(Clone, Debug)]
pub struct TwilioClient {
    /// Twilio Account SID, always starting with `AC`.
    account_sid: String,
    auth_token: String,
    /// API base URL; override for testing/mocking.
    base_url: Url,
    http: reqwest::Client,
}

impl TwilioClient {
    pub fn new<S: Into<String>>(account_sid: S, auth_token: S) -> Result<Self, SmsError> {
        Self::with_base_url(account_sid, auth_token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url<S: Into<String>>(
        account_sid: S,
        auth_token: S,
        base_url: &str,
    ) -> Result<Self, SmsError> {
        let account_sid = account_sid.into();
        let auth_token = auth_token.into();

        if account_sid.is_empty() {
            return Err(SmsError::Auth("account SID is required".into()));
        }
        if !account_sid.starts_with("AC") {
            return Err(SmsError::Auth("account SID must start with AC".into()));
        }
        if auth_token.is_empty() {
            return Err(SmsError::Auth("auth token is required".into()));
        }
        let base_url = Url::parse(base_url)
            .map_err(|e| SmsError::Invalid(format!("base url {}: {}", base_url, e)))?;

        Ok(Self {
            account_sid,
            auth_token,
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn messages_url(&self) -> Result<Url, SmsError> {
        self.base_url
            .join(&format!(
                "2010-04-01/Accounts/{}/Messages.json",
                self.account_sid
            ))
            .map_err(|e| SmsError::Invalid(format!("messages url: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct TwilioSendRequest<'a> {
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct TwilioSendResponse {
    sid: Option<String>,
    date_created: Option<String>,
}

fn parse_created(raw: &serde_json::Value) -> Option<OffsetDateTime> {
    let parsed: TwilioSendResponse = serde_json::from_value(raw.clone()).ok()?;
    parsed
        .date_created
        .as_deref()
        .and_then(|s| OffsetDateTime::parse(s, &Rfc2822).ok())
}

#[async_trait]
impl SmsClient for TwilioClient {
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError> {
        let url = self.messages_url()?;
        let payload = TwilioSendRequest {
            to: req.to,
            from: req.from,
            body: req.text,
        };
        info!("Sending SMS via Twilio to {}", req.to);

        let res = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&payload)
            .send()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!("Twilio returned {}: {}", status, body);
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(SmsError::Auth(format!("HTTP {}: {}", status, body)));
            }
            return Err(SmsError::Provider(format!("HTTP {}: {}", status, body)));
        }

        let raw_text = res
            .text()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;
        let raw_json: serde_json::Value = serde_json::from_str(&raw_text)
            .unwrap_or_else(|_| serde_json::json!({ "raw": raw_text }));

        let id = raw_json
            .get("sid")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(sms_core::fallback_id);
        debug!("Twilio accepted message {}", id);

        Ok(SendResponse {
            id,
            provider: PROVIDER,
            created_at: parse_created(&raw_json),
            raw: raw_json,
        })
    }
}

/// Builds [`TwilioClient`]s for the send endpoint.
#[derive(Clone, Debug)]
pub struct TwilioClientFactory {
    base_url: String,
}

impl TwilioClientFactory {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for TwilioClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientFactory for TwilioClientFactory {
    fn build(&self, credentials: &Credentials) -> Result<Arc<dyn SmsClient>, SmsError> {
        let client = TwilioClient::with_base_url(
            credentials.account_sid.as_str(),
            credentials.auth_token.as_str(),
            &self.base_url,
        )?;
        Ok(Arc::new(client))
    }
}
