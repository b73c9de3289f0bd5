use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::post,
    Router,
};
use bytes::Bytes;
use sms_web_generic::{ResponseConverter, SendTextProcessor};

pub const SEND_TEXT_PATH: &str = "/api/sendText";

#[derive(Clone)]
pub struct AppState {
    pub processor: SendTextProcessor,
}

/// Axum-specific response converter
pub struct AxumResponseConverter;

impl ResponseConverter for AxumResponseConverter {
    type ResponseType = axum::response::Response;

    fn from_web_response(response: sms_core::WebResponse) -> Self::ResponseType {
        let status = axum::http::StatusCode::from_u16(response.status.as_u16())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            [(header::CONTENT_TYPE, response.content_type)],
            response.body,
        )
            .into_response()
    }
}

/// Send handler: POST /api/sendText
pub async fn send_text(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let response = state.processor.process_send(&body).await;
    AxumResponseConverter::from_web_response(response)
}

/// Router exposing the send endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(SEND_TEXT_PATH, post(send_text))
        .with_state(state)
}
