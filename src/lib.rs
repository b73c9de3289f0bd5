//! # SMS Form
//!
//! A single-page form that collects a phone number, asks the user to confirm
//! it, and sends a fixed text message to it through Twilio.
//!
//! ## Features
//!
//! - **Masked input**: the number is fitted to `(#00) 000-0000` as it is entered
//! - **Confirmation**: a dialog shows the number before anything is sent
//! - **Send endpoint**: `POST /api/sendText` validates the number for Canada or the United States
//! - **Opaque failures**: every refusal returns the same error to the caller
//! - **Dry run**: log the outbound message instead of calling the provider
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sms_form::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let app = build_app(&config)?;
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Credentials come from `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and
//! `TWILIO_PHONE_NUMBER`; everything else from `config/default.toml` and
//! `SMSFORM__*` variables:
//!
//! ```rust,ignore
//! use sms_form::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("Dry run: {}", config.message.dry_run);
//! ```

pub mod app;
pub mod config;
pub mod form;
pub mod page;
pub mod telemetry;
pub mod transport;

pub use crate::config::*;

/// Common imports for SMS Form usage
pub mod prelude {
    pub use crate::app::{build_app, AppError};
    pub use crate::config::{
        AppConfig, FormConfig, LoggingConfig, MessageConfig, ServerConfig, TwilioConfig,
    };
    pub use crate::form::{FormAction, FormController, FormError, PhoneForm};
    pub use crate::transport::{HttpTransport, LocalTransport, SendTransport};
    pub use sms_core::*;
}
