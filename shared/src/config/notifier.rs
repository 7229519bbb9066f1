//! Notifier provider configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Which notifier implementation backs a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierProvider {
    /// Console output, always delivers
    #[default]
    Mock,
    /// Always reports a delivery failure
    Failing,
    /// Failing primary with a mock backup
    Failover,
}

impl std::str::FromStr for NotifierProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" | "console" => Ok(NotifierProvider::Mock),
            "failing" | "fail" => Ok(NotifierProvider::Failing),
            "failover" => Ok(NotifierProvider::Failover),
            other => Err(format!("Unknown notifier provider: {}", other)),
        }
    }
}

/// Notifier selection for both channels
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Provider for the SMS channel
    #[serde(default)]
    pub sms_provider: NotifierProvider,

    /// Provider for the email channel
    #[serde(default)]
    pub email_provider: NotifierProvider,

    /// Print delivered messages to stdout
    #[serde(default = "default_console_output")]
    pub console_output: bool,

    /// Artificial latency added by mock notifiers, in milliseconds
    #[serde(default)]
    pub simulated_latency_ms: u64,

    /// Seconds the failover notifier stays on its backup
    #[serde(default = "default_failover_timeout")]
    pub failover_timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sms_provider: NotifierProvider::Mock,
            email_provider: NotifierProvider::Mock,
            console_output: default_console_output(),
            simulated_latency_ms: 0,
            failover_timeout_secs: default_failover_timeout(),
        }
    }
}

impl NotifierConfig {
    /// Override values from `SMS_PROVIDER`, `EMAIL_PROVIDER`,
    /// `NOTIFIER_CONSOLE_OUTPUT`, `NOTIFIER_LATENCY_MS` and
    /// `NOTIFIER_FAILOVER_TIMEOUT`.
    pub fn merge_env(mut self) -> Self {
        if let Some(provider) = env::var("SMS_PROVIDER").ok().and_then(|p| p.parse().ok()) {
            self.sms_provider = provider;
        }
        if let Some(provider) = env::var("EMAIL_PROVIDER").ok().and_then(|p| p.parse().ok()) {
            self.email_provider = provider;
        }
        if let Some(console) = env::var("NOTIFIER_CONSOLE_OUTPUT").ok().and_then(|c| c.parse().ok()) {
            self.console_output = console;
        }
        if let Some(latency) = env::var("NOTIFIER_LATENCY_MS").ok().and_then(|l| l.parse().ok()) {
            self.simulated_latency_ms = latency;
        }
        if let Some(timeout) = env::var("NOTIFIER_FAILOVER_TIMEOUT").ok().and_then(|t| t.parse().ok()) {
            self.failover_timeout_secs = timeout;
        }
        self
    }
}

fn default_console_output() -> bool {
    true
}

fn default_failover_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("mock".parse::<NotifierProvider>().unwrap(), NotifierProvider::Mock);
        assert_eq!(" Failover ".parse::<NotifierProvider>().unwrap(), NotifierProvider::Failover);
        assert_eq!("fail".parse::<NotifierProvider>().unwrap(), NotifierProvider::Failing);
        assert!("twilio".parse::<NotifierProvider>().is_err());
    }

    #[test]
    fn test_deserialize_lowercase() {
        let config: NotifierConfig =
            serde_json::from_str(r#"{"sms_provider": "failing"}"#).unwrap();
        assert_eq!(config.sms_provider, NotifierProvider::Failing);
        assert_eq!(config.email_provider, NotifierProvider::Mock);
        assert!(config.console_output);
        assert_eq!(config.failover_timeout_secs, 30);
    }
}
