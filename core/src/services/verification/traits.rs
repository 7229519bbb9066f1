//! Seams to the outside world: message delivery and message templates

use async_trait::async_trait;

use crate::domain::entities::ChannelKind;

/// Delivers one message to one destination
///
/// Implementations may take arbitrarily long; the session enforces its own
/// dispatch timeout and drops results that arrive late.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message_template` with the `<OTP>` placeholder replaced by
    /// `secret_payload`. Returns whether delivery succeeded.
    async fn send(
        &self,
        destination: &str,
        message_template: &str,
        secret_payload: &str,
        custom_tag: Option<&str>,
    ) -> bool;

    /// Name used in logs
    fn provider_name(&self) -> &str;
}

/// Lookup of message templates by name and channel kind
pub trait MessageTemplates: Send + Sync {
    fn find(&self, name: &str, channel: ChannelKind) -> Option<String>;
}
