//! # SMS Core
//!
//! Core traits and types shared by the SMS form service.
//!
//! This crate provides the fundamental building blocks:
//! - [`SmsClient`] trait for sending SMS messages through a provider
//! - [`ClientFactory`] trait for building provider clients from credentials
//! - [`PhoneValidator`] trait for region-aware phone number validation
//! - Wire types for the send endpoint ([`SendTextRequest`], [`SendTextResponse`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//!
//! // Any SMS provider implements SmsClient
//! let response = client.send(SendRequest {
//!     to: "+15062345678",
//!     from: "+12015550123",
//!     text: "Hello world!"
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod phone;

pub use phone::{to_e164, PhoneNumberValidator};

/// The only error text the send endpoint ever returns to a caller.
pub const GENERIC_ERROR: &str = "Unable to send, please speak an Elder Bros representative";

/// Errors that can occur during SMS operations
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// Authentication/authorization error
    #[error("authentication error: {0}")]
    Auth(String),
    /// Invalid request parameters
    #[error("invalid request: {0}")]
    Invalid(String),
    /// SMS provider returned an error
    #[error("provider error: {0}")]
    Provider(String),
    /// Unexpected error occurred
    #[error("unexpected: {0}")]
    Unexpected(String),
}

/// HTTP status code for web responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok = 200,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResponse {
    pub id: String,
    /// Name of the backend/provider that produced the response, e.g. "twilio".
    pub provider: &'static str,
    /// Provider-side creation time, when reported.
    pub created_at: Option<OffsetDateTime>,
    /// Raw provider payload for debugging / audit.
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait SmsClient: Send + Sync {
    /// Send a single text SMS.
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError>;
}

/// Utility to create a pseudo id if a provider doesn't return one.
pub fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}

/// Provider credentials plus the number messages are sent from.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .finish()
    }
}

/// Builds a provider client from credentials. Construction may fail.
pub trait ClientFactory: Send + Sync {
    fn build(&self, credentials: &Credentials) -> Result<Arc<dyn SmsClient>, SmsError>;
}

/// Regions the service accepts destination numbers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "CA")]
    Ca,
    #[serde(rename = "US")]
    Us,
}

impl Region {
    pub const SUPPORTED: [Region; 2] = [Region::Ca, Region::Us];

    pub fn code(self) -> &'static str {
        match self {
            Region::Ca => "CA",
            Region::Us => "US",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Region-aware phone number validation.
pub trait PhoneValidator: Send + Sync {
    /// Whether `number` is valid when parsed with `region` as the default country.
    fn is_valid(&self, number: &str, region: Region) -> Result<bool, SmsError>;
}

/// Body of `POST /api/sendText`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest {
    pub phone_number: String,
}

/// Body of a send endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendTextResponse {
    Sent { message: String },
    Failed { error: String },
}

impl SendTextResponse {
    pub fn sent_to(number: &str) -> Self {
        SendTextResponse::Sent {
            message: format!("Text message sent successfully to {}", number),
        }
    }

    pub fn failed() -> Self {
        SendTextResponse::Failed {
            error: GENERIC_ERROR.to_string(),
        }
    }
}

/// Framework-agnostic response that adapters convert into their own type
#[derive(Debug, Clone)]
pub struct WebResponse {
    pub status: HttpStatus,
    pub body: String,
    pub content_type: String,
}

impl WebResponse {
    pub fn json(status: HttpStatus, payload: &SendTextResponse) -> Self {
        Self {
            status,
            body: serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string()),
            content_type: "application/json".to_string(),
        }
    }

    pub fn success(number: &str) -> Self {
        Self::json(HttpStatus::Ok, &SendTextResponse::sent_to(number))
    }

    pub fn error() -> Self {
        Self::json(HttpStatus::InternalServerError, &SendTextResponse::failed())
    }
}
