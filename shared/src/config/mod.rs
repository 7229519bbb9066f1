//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `environment` - Environment detection and logging configuration
//! - `notifier` - Notification provider selection for SMS and email
//! - `otp` - OTP timing windows and message template defaults
//! - `server` - HTTP server configuration

pub mod environment;
pub mod notifier;
pub mod otp;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use notifier::{NotifierConfig, NotifierProvider};
pub use otp::OtpConfig;
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// OTP timing configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Notifier selection
    #[serde(default)]
    pub notifiers: NotifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            otp: OtpConfig::default(),
            notifiers: NotifierConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1", 8080),
            otp: OtpConfig::default(),
            notifiers: NotifierConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            otp: OtpConfig::default(),
            notifiers: NotifierConfig {
                console_output: false,
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    ///
    /// The environment picks the base profile; `OTP_*`, `SMS_*`, `EMAIL_*`,
    /// `SERVER_*` and `LOG_*` variables then override individual values.
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };
        config.server = config.server.merge_env();
        config.otp = OtpConfig::from_env();
        config.notifiers = config.notifiers.merge_env();
        config.logging = config.logging.merge_env();
        config
    }
}
