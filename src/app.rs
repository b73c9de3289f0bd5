//! HTTP surface: the form page plus the send endpoint.

use crate::config::AppConfig;
use crate::form::{FormAction, FormController, FormError, PhoneForm};
use crate::page::PageRenderer;
use crate::transport::{HttpTransport, LocalTransport, SendTransport};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use sms_core::PhoneNumberValidator;
use sms_twilio::TwilioClientFactory;
use sms_web_generic::{SendTextProcessor, SendTextSettings};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("form transport: {0}")]
    Transport(#[from] FormError),
}

#[derive(Clone)]
pub struct FormState {
    controller: FormController,
    pages: Arc<PageRenderer>,
}

impl FormState {
    pub fn new(controller: FormController, pages: PageRenderer) -> Self {
        Self {
            controller,
            pages: Arc::new(pages),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FormSubmission {
    #[serde(default)]
    pub phone_number: String,
    pub action: FormAction,
}

fn render(state: &FormState, form: &PhoneForm) -> Response {
    match state.pages.render(form) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Unable to render form page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Unable to render page").into_response()
        }
    }
}

/// GET /
pub async fn index(State(state): State<FormState>) -> Response {
    render(&state, &PhoneForm::new())
}

/// POST /
pub async fn submit(State(state): State<FormState>, Form(sub): Form<FormSubmission>) -> Response {
    let form = state.controller.handle(sub.action, &sub.phone_number).await;
    render(&state, &form)
}

/// Router for the form page alone.
pub fn form_router(state: FormState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .with_state(state)
}

/// Send endpoint processor wired to Twilio and libphonenumber metadata.
pub fn processor_from_config(config: &AppConfig) -> SendTextProcessor {
    SendTextProcessor::new(
        SendTextSettings {
            credentials: config.twilio.credentials(),
            template: config.message.template.clone(),
            dry_run: config.message.dry_run,
        },
        Arc::new(TwilioClientFactory::new()),
        Arc::new(PhoneNumberValidator),
    )
}

/// Assemble the full application from its parts.
pub fn app(
    processor: SendTextProcessor,
    transport: Arc<dyn SendTransport>,
    config: &AppConfig,
) -> Result<Router, AppError> {
    let controller = FormController::new(transport, config.form.default_region);
    let form = FormState::new(controller, PageRenderer::new()?);
    let api = sms_web_axum::AppState { processor };

    Ok(form_router(form)
        .merge(sms_web_axum::router(api))
        .layer(TraceLayer::new_for_http()))
}

/// Build the application described by `config`.
pub fn build_app(config: &AppConfig) -> Result<Router, AppError> {
    if config.twilio.credentials().is_none() {
        info!("Twilio credentials are not present; sends will be refused");
    }
    if config.message.dry_run {
        info!("Dry run enabled; messages are logged instead of sent");
    }

    let processor = processor_from_config(config);
    let transport: Arc<dyn SendTransport> = match &config.form.endpoint_url {
        Some(url) => {
            info!("Form posts to {}", url);
            Arc::new(HttpTransport::new(url)?)
        }
        None => Arc::new(LocalTransport::new(processor.clone())),
    };
    app(processor, transport, config)
}
