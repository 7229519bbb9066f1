//! Timing configuration of a verification session

use std::time::Duration;

use otp_shared::config::OtpConfig;

use crate::domain::entities::ChannelKind;
use crate::errors::ConfigError;

/// Default hard-expiry window in seconds
pub const DEFAULT_USER_TIMEOUT_SECS: u64 = 180;
/// Default dispatch timeout per channel in seconds
pub const DEFAULT_SENDER_TIMEOUT_SECS: u64 = 10;
/// Default resend window in seconds
pub const DEFAULT_RESEND_TIMEOUT_SECS: u64 = 120;
/// Lower bound of the expiry countdown that follows a resend offer
pub const DEFAULT_MIN_EXPIRY_SECS: u64 = 5;

/// Timeouts of a verification session
///
/// Immutable once the session is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    /// Hard expiry after a resent code was delivered
    pub user_timeout_secs: u64,
    /// Dispatch timeout of the SMS sender
    pub sender_timeout_sms_secs: u64,
    /// Dispatch timeout of the email sender
    pub sender_timeout_email_secs: u64,
    /// Delay after delivery before a resend is offered
    pub resend_timeout_secs: u64,
    /// Floor of the expiry countdown started when a resend is offered
    pub min_expiry_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            user_timeout_secs: DEFAULT_USER_TIMEOUT_SECS,
            sender_timeout_sms_secs: DEFAULT_SENDER_TIMEOUT_SECS,
            sender_timeout_email_secs: DEFAULT_SENDER_TIMEOUT_SECS,
            resend_timeout_secs: DEFAULT_RESEND_TIMEOUT_SECS,
            min_expiry_secs: DEFAULT_MIN_EXPIRY_SECS,
        }
    }
}

impl VerificationConfig {
    /// Reject zero durations
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("user_timeout", self.user_timeout_secs),
            ("sender_timeout_sms", self.sender_timeout_sms_secs),
            ("sender_timeout_email", self.sender_timeout_email_secs),
            ("resend_timeout", self.resend_timeout_secs),
            ("min_expiry", self.min_expiry_secs),
        ];
        match durations.iter().find(|(_, secs)| *secs == 0) {
            Some((name, _)) => Err(ConfigError::InvalidTimeout { name }),
            None => Ok(()),
        }
    }

    /// Dispatch timeout for one channel kind
    pub fn sender_timeout(&self, kind: ChannelKind) -> Duration {
        let secs = match kind {
            ChannelKind::Sms => self.sender_timeout_sms_secs,
            ChannelKind::Email => self.sender_timeout_email_secs,
        };
        Duration::from_secs(secs)
    }

    /// Dispatch timeout of a combined sender: the longer of the two
    pub fn combined_sender_timeout(&self) -> Duration {
        Duration::from_secs(self.sender_timeout_sms_secs.max(self.sender_timeout_email_secs))
    }

    pub fn resend_window(&self) -> Duration {
        Duration::from_secs(self.resend_timeout_secs)
    }

    pub fn user_timeout(&self) -> Duration {
        Duration::from_secs(self.user_timeout_secs)
    }

    /// Expiry countdown once a resend is offered but unused:
    /// `max(user_timeout - resend_timeout, min_expiry)`
    pub fn post_offer_expiry(&self) -> Duration {
        let secs = self
            .user_timeout_secs
            .saturating_sub(self.resend_timeout_secs)
            .max(self.min_expiry_secs);
        Duration::from_secs(secs)
    }
}

impl From<&OtpConfig> for VerificationConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            user_timeout_secs: config.user_timeout_secs,
            sender_timeout_sms_secs: config.sender_timeout_sms_secs,
            sender_timeout_email_secs: config.sender_timeout_email_secs,
            resend_timeout_secs: config.resend_timeout_secs,
            ..Self::default()
        }
    }
}
