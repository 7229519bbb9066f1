//! Adapter exposing a message service as an engine notifier

use async_trait::async_trait;

use otp_core::{render_payload, ChannelKind, Notifier};
use otp_shared::contact::mask_destination;

use super::MessageService;

/// Renders the message template and reports delivery as a boolean
pub struct MessageNotifier<S> {
    channel: ChannelKind,
    service: S,
}

impl<S: MessageService> MessageNotifier<S> {
    pub fn new(channel: ChannelKind, service: S) -> Self {
        Self { channel, service }
    }

    pub fn channel(&self) -> ChannelKind {
        self.channel
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

#[async_trait]
impl<S: MessageService> Notifier for MessageNotifier<S> {
    async fn send(
        &self,
        destination: &str,
        message_template: &str,
        secret_payload: &str,
        custom_tag: Option<&str>,
    ) -> bool {
        let message = render_payload(message_template, secret_payload);
        match self.service.send_message(destination, &message, custom_tag).await {
            Ok(message_id) => {
                tracing::info!(
                    channel = %self.channel,
                    destination = %mask_destination(destination),
                    provider = self.service.provider_name(),
                    message_id = %message_id,
                    event = "otp_message_sent",
                    "Message accepted by provider"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    channel = %self.channel,
                    destination = %mask_destination(destination),
                    provider = self.service.provider_name(),
                    error = %e,
                    event = "otp_message_failed",
                    "Provider failed to send message"
                );
                false
            }
        }
    }

    fn provider_name(&self) -> &str {
        self.service.provider_name()
    }
}
