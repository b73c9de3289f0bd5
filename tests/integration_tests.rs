use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use sms_core::*;
use sms_form::app::{app, build_app};
use sms_form::config::AppConfig;
use sms_form::transport::{HttpTransport, LocalTransport, SendTransport};
use sms_twilio::TwilioClientFactory;
use sms_web_generic::{SendTextProcessor, SendTextSettings};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct AnyNanp;

impl PhoneValidator for AnyNanp {
    fn is_valid(&self, number: &str, region: Region) -> Result<bool, SmsError> {
        Ok(region == Region::Ca && number.starts_with("+1") && number.len() == 12)
    }
}

fn credentials() -> Credentials {
    Credentials {
        account_sid: "AC0123456789".into(),
        auth_token: "token".into(),
        from_number: "+12015550123".into(),
    }
}

fn processor(
    credentials: Option<Credentials>,
    validator: Arc<dyn PhoneValidator>,
) -> SendTextProcessor {
    SendTextProcessor::new(
        SendTextSettings {
            credentials,
            template: "Thanks for visiting Elder Bros".into(),
            dry_run: true,
        },
        Arc::new(TwilioClientFactory::new()),
        validator,
    )
}

fn local_app(processor: SendTextProcessor) -> Router {
    let transport = Arc::new(LocalTransport::new(processor.clone()));
    app(processor, transport, &AppConfig::default()).unwrap()
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn send_text(app: Router, phone_number: &str) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "phoneNumber": phone_number }).to_string();
    let res = app
        .oneshot(
            Request::post("/api/sendText")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn submit_form(app: Router, phone_number: &str, action: &str) -> (StatusCode, String) {
    let body = format!("phone_number={}&action={}", phone_number, action);
    let res = app
        .oneshot(
            Request::post("/")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_valid_numbers_in_either_region_are_accepted() {
    let app = local_app(processor(Some(credentials()), Arc::new(PhoneNumberValidator)));

    for number in ["+15062345678", "+12015550123"] {
        let (status, body) = send_text(app.clone(), number).await;
        assert_eq!(status, StatusCode::OK, "{}", number);
        assert!(body["message"].as_str().unwrap().contains(number));
    }
}

#[tokio::test]
async fn test_numbers_invalid_in_both_regions_are_refused() {
    let app = local_app(processor(Some(credentials()), Arc::new(PhoneNumberValidator)));

    for number in ["123", "", "not a number"] {
        let (status, body) = send_text(app.clone(), number).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", number);
        assert_eq!(body["error"], GENERIC_ERROR);
    }
}

#[tokio::test]
async fn test_valid_international_numbers_are_accepted() {
    let app = local_app(processor(Some(credentials()), Arc::new(PhoneNumberValidator)));

    for number in ["+442079460018", "+18765230123"] {
        let (status, body) = send_text(app.clone(), number).await;
        assert_eq!(status, StatusCode::OK, "{}", number);
        assert!(body["message"].as_str().unwrap().contains(number));
    }
}

#[tokio::test]
async fn test_missing_credentials_refuse_valid_numbers() {
    let app = local_app(processor(None, Arc::new(PhoneNumberValidator)));

    let (status, body) = send_text(app, "+12015550123").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Unable to send, please speak an Elder Bros representative"
    );
}

#[tokio::test]
async fn test_default_config_has_no_credentials() {
    let app = build_app(&AppConfig::default()).unwrap();

    let (status, body) = send_text(app, "+12015550123").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], GENERIC_ERROR);
}

#[tokio::test]
async fn test_identical_requests_are_not_deduplicated() {
    let app = local_app(processor(Some(credentials()), Arc::new(AnyNanp)));

    let first = send_text(app.clone(), "+14161234567").await;
    let second = send_text(app, "+14161234567").await;
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert_eq!(first.1, second.1);
}

#[tokio::test]
async fn test_form_page_renders() {
    let app = local_app(processor(Some(credentials()), Arc::new(AnyNanp)));
    let res = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(html.to_vec()).unwrap();
    assert!(html.contains("Phone Number"));
    assert!(html.contains("Confirm"));
}

#[tokio::test]
async fn test_short_number_never_opens_confirmation() {
    let app = local_app(processor(Some(credentials()), Arc::new(AnyNanp)));

    let (status, html) = submit_form(app, "123", "confirm").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!html.contains("Confirm Phone Number"));
}

#[tokio::test]
async fn test_confirm_then_send_scenario() {
    let app = local_app(processor(Some(credentials()), Arc::new(AnyNanp)));

    let (_, html) = submit_form(app.clone(), "4161234567", "confirm").await;
    assert!(html.contains("Confirm Phone Number (416) 123-4567"));

    let (status, html) = submit_form(app, "4161234567", "send").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Text sent to +14161234567"));
    assert!(!html.contains("Confirm Phone Number"));
    assert!(html.contains(r#"value="""#));
}

#[tokio::test]
async fn test_failed_send_leaves_dialog_open() {
    let app = local_app(processor(None, Arc::new(AnyNanp)));

    let (status, html) = submit_form(app, "4161234567", "send").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Confirm Phone Number (416) 123-4567"));
    assert!(!html.contains("Text sent to"));
}

#[tokio::test]
async fn test_http_transport_posts_normalized_number() {
    let seen: Arc<Mutex<Vec<Bytes>>> = Arc::default();
    let recorder = {
        let seen = seen.clone();
        Router::new().route(
            "/api/sendText",
            post(move |body: Bytes| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(body);
                    axum::Json(SendTextResponse::sent_to("+14161234567"))
                }
            }),
        )
    };
    let base = serve(recorder).await;

    let transport: Arc<dyn SendTransport> =
        Arc::new(HttpTransport::new(&format!("{}/api/sendText", base)).unwrap());
    let app = app(
        processor(Some(credentials()), Arc::new(AnyNanp)),
        transport,
        &AppConfig::default(),
    )
    .unwrap();

    let (_, html) = submit_form(app, "4161234567", "send").await;
    assert!(html.contains("Text sent to +14161234567"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(&seen[0][..], br#"{"phoneNumber":"+14161234567"}"#);
}

#[tokio::test]
async fn test_http_transport_against_real_endpoint() {
    let endpoint = local_app(processor(None, Arc::new(AnyNanp)));
    let base = serve(endpoint).await;

    let transport = HttpTransport::new(&format!("{}/api/sendText", base)).unwrap();
    let err = transport
        .send(&SendTextRequest {
            phone_number: "+14161234567".into(),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains(GENERIC_ERROR));
}

#[tokio::test]
async fn test_concurrent_sends_are_independent() {
    use futures::future;

    let app = local_app(processor(Some(credentials()), Arc::new(AnyNanp)));
    let sends = (0..10).map(|i| {
        let app = app.clone();
        let number = format!("+1416555{:04}", i);
        async move { send_text(app, &number).await }
    });

    let results = future::join_all(sends).await;
    assert_eq!(results.len(), 10);
    for (status, _) in results {
        assert_eq!(status, StatusCode::OK);
    }
}
