//! Value objects describing session results and display state.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::{ChannelKind, ChannelStage, SendStatus, VerificationMode};

/// Why a session could not complete verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No channel could deliver a code
    DispatchFailed,
    /// The hard-expiry countdown elapsed with a channel still unverified
    Expired,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DispatchFailed => f.write_str("dispatch_failed"),
            FailureReason::Expired => f.write_str("expired"),
        }
    }
}

/// Terminal result of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum SessionOutcome {
    /// Every required channel was verified
    Verified,
    /// The user cancelled
    Cancelled,
    /// Dispatch failure or expiry
    Failed(FailureReason),
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Verified => f.write_str("verified"),
            SessionOutcome::Cancelled => f.write_str("cancelled"),
            SessionOutcome::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Display state of one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Contact methods this channel delivers over (two in shared-code mode)
    pub kinds: Vec<ChannelKind>,
    /// Hint such as `OTP sent to +1...34`
    pub hint: String,
    pub stage: ChannelStage,
    pub send_status: SendStatus,
    /// Prefix of the outstanding code, shown next to the input field
    pub prefix: Option<String>,
    pub verified: bool,
    pub accepts_code: bool,
    pub resend_available: bool,
    /// Whether the running countdown ends the session when it fires
    pub expiry_countdown: bool,
    /// Whole seconds left on the running countdown
    pub seconds_remaining: Option<u64>,
}

/// Display state of a whole session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub mode: VerificationMode,
    pub closed: bool,
    pub outcome: Option<SessionOutcome>,
    pub channels: Vec<ChannelSnapshot>,
}
