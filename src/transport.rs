//! How the form reaches the send endpoint.

use crate::form::FormError;
use async_trait::async_trait;
use sms_core::{SendTextRequest, SendTextResponse};
use sms_web_generic::SendTextProcessor;
use tracing::debug;
use url::Url;

#[async_trait]
pub trait SendTransport: Send + Sync {
    /// POST `request` once. Returns the endpoint's success message.
    async fn send(&self, request: &SendTextRequest) -> Result<String, FormError>;
}

fn interpret(status: u16, body: &str) -> Result<String, FormError> {
    let parsed: Option<SendTextResponse> = serde_json::from_str(body).ok();
    match (status, parsed) {
        (200..=299, Some(SendTextResponse::Sent { message })) => Ok(message),
        (200..=299, _) => Ok(String::new()),
        (_, Some(SendTextResponse::Failed { error })) => Err(FormError::Rejected { status, error }),
        (_, _) => Err(FormError::Rejected {
            status,
            error: body.to_string(),
        }),
    }
}

/// Posts JSON to a remote send endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: &str) -> Result<Self, FormError> {
        let url = Url::parse(url).map_err(|e| FormError::Transport(format!("{}: {}", url, e)))?;
        Ok(Self {
            url,
            http: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl SendTransport for HttpTransport {
    async fn send(&self, request: &SendTextRequest) -> Result<String, FormError> {
        debug!("POST {} for {}", self.url, request.phone_number);
        let res = self
            .http
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| FormError::Transport(e.to_string()))?;
        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| FormError::Transport(e.to_string()))?;
        interpret(status, &body)
    }
}

/// Calls the send endpoint processor in-process.
#[derive(Clone)]
pub struct LocalTransport {
    processor: SendTextProcessor,
}

impl LocalTransport {
    pub fn new(processor: SendTextProcessor) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl SendTransport for LocalTransport {
    async fn send(&self, request: &SendTextRequest) -> Result<String, FormError> {
        let body = serde_json::to_vec(request).map_err(|e| FormError::Transport(e.to_string()))?;
        let res = self.processor.process_send(&body).await;
        interpret(res.status.as_u16(), &res.body)
    }
}
