use config::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};
use sms_core::{Credentials, Region};
use std::env;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Twilio credentials and sender number
    pub twilio: TwilioConfig,
    /// Outbound message configuration
    pub message: MessageConfig,
    /// Form page configuration
    pub form: FormConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 3000)
    pub port: u16,
}

/// Twilio provider configuration. Every value may be absent; the send
/// endpoint refuses to send until all three are set.
#[derive(Deserialize, Serialize, Clone, Default)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: Option<String>,
    /// Twilio Auth Token
    pub auth_token: Option<String>,
    /// Number messages are sent from
    pub phone_number: Option<String>,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

impl TwilioConfig {
    /// All three values, or `None` if any is missing or empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Some(Credentials {
            account_sid: present(&self.account_sid)?,
            auth_token: present(&self.auth_token)?,
            from_number: present(&self.phone_number)?,
        })
    }
}

/// Outbound message configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MessageConfig {
    /// Body of every outbound text
    pub template: String,
    /// Log the outbound message instead of calling Twilio (default: true)
    pub dry_run: bool,
}

/// Form page configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FormConfig {
    /// Send endpoint the form posts to; in-process when unset
    pub endpoint_url: Option<String>,
    /// Region assumed when normalizing input without a country code (default: US)
    pub default_region: Region,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: pretty)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            template: String::new(),
            dry_run: true,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            default_region: Region::Us,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Like [`AppConfig::load`], reading variables from `vars` instead of the
    /// process environment when given.
    pub fn load_from(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let var = |key: &str| match &vars {
            Some(vars) => vars.get(key).cloned(),
            None => env::var(key).ok(),
        };
        let run_mode = var("RUN_MODE").unwrap_or_else(|| "development".into());

        Self::builder(&run_mode, vars.clone())?
            .set_override_option("twilio.account_sid", var("TWILIO_ACCOUNT_SID"))?
            .set_override_option("twilio.auth_token", var("TWILIO_AUTH_TOKEN"))?
            .set_override_option("twilio.phone_number", var("TWILIO_PHONE_NUMBER"))?
            .build()?
            .try_deserialize()
    }

    fn builder(
        run_mode: &str,
        vars: Option<Map<String, String>>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Static configuration, including the message template
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with SMSFORM__)
            .add_source(
                Environment::with_prefix("SMSFORM")
                    .separator("__")
                    .source(vars),
            ))
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            twilio: TwilioConfig::default(),
            message: MessageConfig::default(),
            form: FormConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
