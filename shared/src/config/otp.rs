//! OTP timing configuration
//!
//! All durations are whole seconds, matching how they are presented to
//! users in countdown displays.

use serde::{Deserialize, Serialize};
use std::env;

/// Timing windows and template defaults for OTP verification sessions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Seconds a delivered code stays valid before the session hard-expires
    #[serde(default = "default_user_timeout")]
    pub user_timeout_secs: u64,

    /// Seconds to wait for the SMS notifier to report delivery
    #[serde(default = "default_sender_timeout")]
    pub sender_timeout_sms_secs: u64,

    /// Seconds to wait for the email notifier to report delivery
    #[serde(default = "default_sender_timeout")]
    pub sender_timeout_email_secs: u64,

    /// Seconds after first delivery before a resend is offered
    #[serde(default = "default_resend_timeout")]
    pub resend_timeout_secs: u64,

    /// Template used when a session does not name one
    #[serde(default)]
    pub default_template: Option<String>,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            user_timeout_secs: default_user_timeout(),
            sender_timeout_sms_secs: default_sender_timeout(),
            sender_timeout_email_secs: default_sender_timeout(),
            resend_timeout_secs: default_resend_timeout(),
            default_template: None,
        }
    }
}

impl OtpConfig {
    /// Load OTP configuration from environment variables
    ///
    /// Reads `OTP_USER_TIMEOUT`, `OTP_SENDER_TIMEOUT_SMS`,
    /// `OTP_SENDER_TIMEOUT_EMAIL`, `OTP_RESEND_TIMEOUT` and
    /// `OTP_DEFAULT_TEMPLATE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let seconds = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Self {
            user_timeout_secs: seconds("OTP_USER_TIMEOUT", default_user_timeout()),
            sender_timeout_sms_secs: seconds("OTP_SENDER_TIMEOUT_SMS", default_sender_timeout()),
            sender_timeout_email_secs: seconds("OTP_SENDER_TIMEOUT_EMAIL", default_sender_timeout()),
            resend_timeout_secs: seconds("OTP_RESEND_TIMEOUT", default_resend_timeout()),
            default_template: lookup("OTP_DEFAULT_TEMPLATE").filter(|t| !t.trim().is_empty()),
        }
    }
}

fn default_user_timeout() -> u64 {
    180
}

fn default_sender_timeout() -> u64 {
    10
}

fn default_resend_timeout() -> u64 {
    120
}
