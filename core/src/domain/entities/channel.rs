//! Channel kinds, verification modes and the per-channel lifecycle enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A contact method a code can be delivered over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Text message to a phone number
    Sms,
    /// Message to an email address
    Email,
}

impl ChannelKind {
    /// Lowercase name used in logs and the API
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Sms => "sms",
            ChannelKind::Email => "email",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sms" | "phone" | "mobile" => Ok(ChannelKind::Sms),
            "email" | "mail" => Ok(ChannelKind::Email),
            other => Err(format!("Unknown channel: {}", other)),
        }
    }
}

/// How the destinations of a session are verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// Only a phone number was given
    SinglePhoneOnly,
    /// Only an email address was given
    SingleEmailOnly,
    /// Both given; each receives its own code and both must be verified
    DualIndependent,
    /// Both given; one code is sent to both and either delivery suffices
    DualSharedCode,
}

impl VerificationMode {
    /// Pick the mode for the given destinations
    ///
    /// Returns `None` when neither destination is present.
    pub fn resolve(has_phone: bool, has_email: bool, single_shared_code: bool) -> Option<Self> {
        match (has_phone, has_email) {
            (true, false) => Some(VerificationMode::SinglePhoneOnly),
            (false, true) => Some(VerificationMode::SingleEmailOnly),
            (true, true) if single_shared_code => Some(VerificationMode::DualSharedCode),
            (true, true) => Some(VerificationMode::DualIndependent),
            (false, false) => None,
        }
    }
}

/// Stage of one channel in its send / resend / verify lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStage {
    /// Nothing sent yet
    Idle,
    /// First code handed to the sender, delivery not confirmed
    Dispatching,
    /// First code delivered; resend window running
    Delivered,
    /// Resend window elapsed; resend offered while the expiry countdown runs
    ResendOffered,
    /// Fresh code handed to the sender after a resend request
    Redispatching,
    /// Resent code delivered; expiry countdown running
    RedeliveredAwaitingExpiry,
    /// The last dispatch failed or timed out; only a resend can recover
    DispatchFailed,
}

impl ChannelStage {
    /// Whether a delivered code is outstanding and submissions are checked
    pub fn accepts_code(&self) -> bool {
        matches!(
            self,
            ChannelStage::Delivered
                | ChannelStage::ResendOffered
                | ChannelStage::RedeliveredAwaitingExpiry
        )
    }

    /// Whether the user may ask for a fresh code
    pub fn allows_resend(&self) -> bool {
        matches!(self, ChannelStage::ResendOffered | ChannelStage::DispatchFailed)
    }

    /// Whether a dispatch is in flight
    pub fn is_dispatching(&self) -> bool {
        matches!(self, ChannelStage::Dispatching | ChannelStage::Redispatching)
    }
}

impl fmt::Display for ChannelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelStage::Idle => "idle",
            ChannelStage::Dispatching => "dispatching",
            ChannelStage::Delivered => "delivered",
            ChannelStage::ResendOffered => "resend_offered",
            ChannelStage::Redispatching => "redispatching",
            ChannelStage::RedeliveredAwaitingExpiry => "redelivered_awaiting_expiry",
            ChannelStage::DispatchFailed => "dispatch_failed",
        };
        f.write_str(name)
    }
}

/// Status of one dispatch attempt
///
/// Moves `NotStarted -> Started -> Delivered | Failed` within an attempt; a
/// new attempt resets it to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    NotStarted,
    Started,
    Delivered,
    Failed,
}

impl SendStatus {
    /// Numeric status code (-1 not started, 0 started, 1 delivered, 2 failed)
    pub fn code(&self) -> i8 {
        match self {
            SendStatus::NotStarted => -1,
            SendStatus::Started => 0,
            SendStatus::Delivered => 1,
            SendStatus::Failed => 2,
        }
    }

    /// Whether the attempt has finished
    pub fn is_final(&self) -> bool {
        matches!(self, SendStatus::Delivered | SendStatus::Failed)
    }
}
