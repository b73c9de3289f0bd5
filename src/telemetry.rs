use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };
    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init()?,
        _ => registry
            .with(fmt::layer().with_target(true).with_level(true).pretty())
            .try_init()?,
    }

    tracing::info!(format = %logging.format, "Logging initialized");
    Ok(())
}
