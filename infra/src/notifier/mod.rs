//! Notifier Module
//!
//! Message services for delivering one-time passwords over SMS and email,
//! and the adapter exposing them to the verification engine.
//!
//! ## Features
//!
//! - **Message Service Trait**: common interface for all providers
//! - **Mock Implementation**: console output for development
//! - **Failover**: automatic switch from a primary to a backup provider
//! - **Security**: destinations are masked in logs

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use otp_core::{ChannelKind, Notifier};
use otp_shared::config::{NotifierConfig, NotifierProvider};

use crate::InfrastructureError;

pub mod adapter;
pub mod failover;
pub mod mock;

pub use adapter::MessageNotifier;
pub use failover::FailoverMessageService;
pub use mock::MockMessageService;

#[cfg(test)]
mod tests;

/// A provider able to deliver a rendered message to one destination
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Send a message, returning the provider's message id
    async fn send_message(
        &self,
        destination: &str,
        message: &str,
        tag: Option<&str>,
    ) -> Result<String, InfrastructureError>;

    /// Name of the provider for logging
    fn provider_name(&self) -> &str;

    /// Whether the provider is currently able to send
    async fn is_available(&self) -> bool {
        true
    }
}

macro_rules! forward_message_service {
    ($wrapper:ident) => {
        #[async_trait]
        impl<T: MessageService + ?Sized> MessageService for $wrapper<T> {
            async fn send_message(
                &self,
                destination: &str,
                message: &str,
                tag: Option<&str>,
            ) -> Result<String, InfrastructureError> {
                (**self).send_message(destination, message, tag).await
            }

            fn provider_name(&self) -> &str {
                (**self).provider_name()
            }

            async fn is_available(&self) -> bool {
                (**self).is_available().await
            }
        }
    };
}

forward_message_service!(Box);
forward_message_service!(Arc);

fn mock_service(kind: ChannelKind, config: &NotifierConfig, fail: bool) -> MockMessageService {
    MockMessageService::with_options(kind, config.console_output, fail)
        .with_latency(Duration::from_millis(config.simulated_latency_ms))
}

/// Create the message service for one channel kind from configuration
pub fn create_message_service(
    kind: ChannelKind,
    config: &NotifierConfig,
) -> Box<dyn MessageService> {
    let provider = match kind {
        ChannelKind::Sms => config.sms_provider,
        ChannelKind::Email => config.email_provider,
    };

    match provider {
        NotifierProvider::Mock => Box::new(mock_service(kind, config, false)),
        NotifierProvider::Failing => {
            tracing::warn!(channel = %kind, "Using failing notifier; no message will be delivered");
            Box::new(mock_service(kind, config, true).named("failing"))
        }
        NotifierProvider::Failover => {
            let primary = mock_service(kind, config, true).named("primary");
            let backup = mock_service(kind, config, false).named("backup");
            Box::new(FailoverMessageService::new(
                Box::new(primary),
                Box::new(backup),
                Duration::from_secs(config.failover_timeout_secs),
            ))
        }
    }
}

/// Create the engine notifier for one channel kind from configuration
pub fn create_notifier(kind: ChannelKind, config: &NotifierConfig) -> Arc<dyn Notifier> {
    Arc::new(MessageNotifier::new(kind, create_message_service(kind, config)))
}
