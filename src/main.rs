use sms_form::app::build_app;
use sms_form::config::AppConfig;
use sms_form::telemetry::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    let app = build_app(&config)?;
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
