//! Mock message service for development and testing
//!
//! Prints messages to the console instead of contacting a provider.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use otp_core::ChannelKind;
use otp_shared::contact::{is_valid_email, is_valid_phone_number, mask_destination};
use uuid::Uuid;

use super::MessageService;
use crate::InfrastructureError;

/// A message recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    pub message: String,
    pub tag: Option<String>,
}

/// Console-backed message service for one channel kind
pub struct MockMessageService {
    kind: ChannelKind,
    name: String,
    console_output: bool,
    simulate_failure: AtomicBool,
    latency: Duration,
    message_count: AtomicUsize,
    last_messages: Mutex<HashMap<String, RecordedMessage>>,
}

impl MockMessageService {
    /// Create a mock with console output enabled
    pub fn new(kind: ChannelKind) -> Self {
        Self::with_options(kind, true, false)
    }

    pub fn with_options(kind: ChannelKind, console_output: bool, simulate_failure: bool) -> Self {
        Self {
            kind,
            name: "mock".to_string(),
            console_output,
            simulate_failure: AtomicBool::new(simulate_failure),
            latency: Duration::ZERO,
            message_count: AtomicUsize::new(0),
            last_messages: Mutex::new(HashMap::new()),
        }
    }

    /// Delay every send by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Override the provider name shown in logs
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_simulate_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    pub fn get_message_count(&self) -> usize {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Last message delivered to `destination`
    pub fn last_message(&self, destination: &str) -> Option<RecordedMessage> {
        self.last_messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(destination)
            .cloned()
    }

    fn validate(&self, destination: &str) -> Result<(), InfrastructureError> {
        let valid = match self.kind {
            ChannelKind::Sms => is_valid_phone_number(destination),
            ChannelKind::Email => is_valid_email(destination),
        };
        if valid {
            Ok(())
        } else {
            Err(InfrastructureError::Notifier(format!(
                "Invalid {} destination: {}",
                self.kind,
                mask_destination(destination)
            )))
        }
    }
}

#[async_trait]
impl MessageService for MockMessageService {
    async fn send_message(
        &self,
        destination: &str,
        message: &str,
        tag: Option<&str>,
    ) -> Result<String, InfrastructureError> {
        self.validate(destination)?;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err(InfrastructureError::Notifier(format!(
                "Simulated {} failure ({})",
                self.kind, self.name
            )));
        }

        if self.console_output {
            println!("========================================");
            println!("MOCK {} ({})", self.kind.as_str().to_uppercase(), self.name);
            println!("To: {}", destination);
            if let Some(tag) = tag {
                println!("Tag: {}", tag);
            }
            println!("Message: {}", message);
            println!("========================================");
        }

        self.message_count.fetch_add(1, Ordering::SeqCst);
        self.last_messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                destination.to_string(),
                RecordedMessage {
                    message: message.to_string(),
                    tag: tag.map(str::to_string),
                },
            );

        Ok(format!("mock_{}", Uuid::new_v4()))
    }

    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        !self.simulate_failure.load(Ordering::SeqCst)
    }
}
