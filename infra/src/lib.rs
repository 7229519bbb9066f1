//! # Infrastructure Layer
//!
//! Concrete delivery channels for the OTP verification engine. Provider
//! services send a rendered message to one destination; adapters turn them
//! into the engine's `Notifier` seam.
//!
//! ## Providers
//!
//! - **Mock**: console output for development, with simulated failure and latency
//! - **Failing**: a mock that never delivers, for exercising failure paths
//! - **Failover**: a primary provider backed by a secondary one

use std::sync::Arc;

use otp_core::{ChannelKind, Notifier};
use otp_shared::config::NotifierConfig;

/// Notifier module - provider services, adapters and the factory
pub mod notifier;

/// Configuration module for infrastructure services
pub mod config {
    //! Notifier configuration loaded from the environment

    use otp_shared::config::NotifierConfig;
    use serde::{Deserialize, Serialize};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Notifier selection for both channels
        pub notifiers: NotifierConfig,
    }
}

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Notifier used for the SMS channel
    pub sms_notifier: Arc<dyn Notifier>,
    /// Notifier used for the email channel
    pub email_notifier: Arc<dyn Notifier>,
}

impl InfrastructureServices {
    /// Build notifiers for both channels from configuration
    pub fn new(config: &NotifierConfig) -> Self {
        Self {
            sms_notifier: notifier::create_notifier(ChannelKind::Sms, config),
            email_notifier: notifier::create_notifier(ChannelKind::Email, config),
        }
    }

    /// Notifier for one channel kind
    pub fn notifier(&self, kind: ChannelKind) -> Arc<dyn Notifier> {
        match kind {
            ChannelKind::Sms => Arc::clone(&self.sms_notifier),
            ChannelKind::Email => Arc::clone(&self.email_notifier),
        }
    }
}

/// Initialize infrastructure services
///
/// Loads `.env` if present, reads notifier configuration from the
/// environment and creates one notifier per channel.
pub fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let config = load_config()?;
    let services = InfrastructureServices::new(&config.notifiers);

    tracing::info!(
        sms = services.sms_notifier.provider_name(),
        email = services.email_notifier.provider_name(),
        "Infrastructure services initialized successfully"
    );

    Ok(services)
}

/// Load infrastructure configuration from environment
fn load_config() -> Result<config::InfrastructureConfig, InfrastructureError> {
    dotenvy::dotenv().ok();

    let notifiers = NotifierConfig::default().merge_env();
    if notifiers.failover_timeout_secs == 0 {
        return Err(InfrastructureError::Config(
            "NOTIFIER_FAILOVER_TIMEOUT must be greater than zero".to_string(),
        ));
    }

    Ok(config::InfrastructureConfig { notifiers })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message delivery error
    #[error("Notifier error: {0}")]
    Notifier(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
