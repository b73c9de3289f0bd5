use futures::FutureExt;
use sms_core::{
    ClientFactory, Credentials, PhoneValidator, Region, SendRequest, SendTextRequest, SmsClient,
    SmsError, WebResponse,
};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Why a send was refused. Callers only ever see the generic error.
#[derive(Debug, thiserror::Error)]
pub enum SendTextError {
    #[error("provider credentials are not configured")]
    MissingCredentials,
    #[error("unable to create provider client: {0}")]
    ClientConstruction(#[source] SmsError),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("{0} is not a valid Canadian or US phone number")]
    InvalidPhoneNumber(String),
    #[error("phone number validation failed: {0}")]
    Validator(#[source] SmsError),
    #[error("error sending message to {to}: {source}")]
    Provider {
        to: String,
        #[source]
        source: SmsError,
    },
    #[error("handler panicked")]
    Panicked,
}

/// Everything the send endpoint needs from configuration.
#[derive(Debug, Clone)]
pub struct SendTextSettings {
    /// `None` when any of the three provider values is missing.
    pub credentials: Option<Credentials>,
    /// Body of every outbound message.
    pub template: String,
    /// Log the outbound message instead of calling the provider.
    pub dry_run: bool,
}

/// Framework-agnostic processor behind `POST /api/sendText`
#[derive(Clone)]
pub struct SendTextProcessor {
    settings: Arc<SendTextSettings>,
    clients: Arc<dyn ClientFactory>,
    validator: Arc<dyn PhoneValidator>,
}

impl SendTextProcessor {
    pub fn new(
        settings: SendTextSettings,
        clients: Arc<dyn ClientFactory>,
        validator: Arc<dyn PhoneValidator>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            clients,
            validator,
        }
    }

    /// Process a raw request body and return a framework-agnostic response
    pub async fn process_send(&self, body: &[u8]) -> WebResponse {
        info!("Request received to api/sendText");
        let outcome = AssertUnwindSafe(self.process_send_internal(body))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(number)) => WebResponse::success(&number),
            Ok(Err(e)) => self.error_to_response(e),
            Err(_) => self.error_to_response(SendTextError::Panicked),
        }
    }

    async fn process_send_internal(&self, body: &[u8]) -> Result<String, SendTextError> {
        debug!("Checking provider credentials");
        let credentials = self
            .settings
            .credentials
            .as_ref()
            .ok_or(SendTextError::MissingCredentials)?;
        debug!("Provider credentials are present");

        let client = self
            .clients
            .build(credentials)
            .map_err(SendTextError::ClientConstruction)?;

        let request: SendTextRequest = serde_json::from_slice(body)
            .map_err(|e| SendTextError::MalformedBody(e.to_string()))?;
        let number = request.phone_number;
        info!("Received phone number {}", number);

        self.validate(&number)?;
        info!("Phone number {} is a valid Canadian or US phone number", number);

        self.deliver(client.as_ref(), credentials, &number).await?;
        Ok(number)
    }

    fn validate(&self, number: &str) -> Result<(), SendTextError> {
        for region in Region::SUPPORTED {
            if self
                .validator
                .is_valid(number, region)
                .map_err(SendTextError::Validator)?
            {
                debug!("{} accepted for region {}", number, region);
                return Ok(());
            }
        }
        Err(SendTextError::InvalidPhoneNumber(number.to_string()))
    }

    async fn deliver(
        &self,
        client: &dyn SmsClient,
        credentials: &Credentials,
        number: &str,
    ) -> Result<(), SendTextError> {
        if self.settings.dry_run {
            info!(
                body = %self.settings.template,
                from = %credentials.from_number,
                to = %number,
                "Dry run, provider call skipped"
            );
            return Ok(());
        }

        let res = client
            .send(SendRequest {
                to: number,
                from: &credentials.from_number,
                text: &self.settings.template,
            })
            .await
            .map_err(|source| SendTextError::Provider {
                to: number.to_string(),
                source,
            })?;
        info!(id = %res.id, provider = res.provider, "Text message sent to {}", number);
        Ok(())
    }

    fn error_to_response(&self, error: SendTextError) -> WebResponse {
        match &error {
            SendTextError::Provider { .. } | SendTextError::Panicked => {
                error!("{}", error)
            }
            _ => warn!("{}", error),
        }
        WebResponse::error()
    }
}

/// Helper trait for framework adapters to convert responses
pub trait ResponseConverter {
    type ResponseType;

    fn from_web_response(response: WebResponse) -> Self::ResponseType;
}
