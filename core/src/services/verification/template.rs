//! Message templates and placeholder substitution

use std::collections::HashMap;

use crate::domain::entities::{ChannelKind, OtpSecret};
use crate::services::verification::traits::MessageTemplates;

/// Placeholder replaced with the prefix and code
pub const OTP_PLACEHOLDER: &str = "<OTP>";

/// Message used when no template is configured or found
pub const DEFAULT_TEMPLATE: &str = "Your OTP is <OTP>";

const LEGACY_PLACEHOLDER: &str = "<1>";

/// Rewrite the legacy `<1>` placeholder to `<OTP>`
pub fn normalize_template(template: &str) -> String {
    template.replace(LEGACY_PLACEHOLDER, OTP_PLACEHOLDER)
}

/// Substitute the placeholder of a template with a payload
pub fn render_payload(template: &str, payload: &str) -> String {
    normalize_template(template).replace(OTP_PLACEHOLDER, payload)
}

/// Substitute the placeholder of a template with a secret
pub fn render_message(template: &str, secret: &OtpSecret) -> String {
    render_payload(template, &secret.payload())
}

/// Pick the template text for a channel
pub(crate) fn resolve_template(
    templates: Option<&dyn MessageTemplates>,
    name: Option<&str>,
    channel: ChannelKind,
) -> String {
    match (templates, name) {
        (Some(templates), Some(name)) => templates
            .find(name, channel)
            .map(|t| normalize_template(&t))
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
        _ => DEFAULT_TEMPLATE.to_string(),
    }
}

/// In-memory template set keyed by name and channel kind
#[derive(Debug, Clone, Default)]
pub struct StaticTemplates {
    entries: HashMap<(String, ChannelKind), String>,
}

impl StaticTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, returning `self` for chaining
    pub fn with(mut self, name: &str, channel: ChannelKind, template: &str) -> Self {
        self.insert(name, channel, template);
        self
    }

    pub fn insert(&mut self, name: &str, channel: ChannelKind, template: &str) {
        self.entries
            .insert((name.to_string(), channel), template.to_string());
    }
}

impl MessageTemplates for StaticTemplates {
    fn find(&self, name: &str, channel: ChannelKind) -> Option<String> {
        self.entries.get(&(name.to_string(), channel)).cloned()
    }
}
