use otp_core::{ChannelKind, SessionOutcome, SessionSnapshot};
use otp_shared::contact::{is_valid_email, is_valid_phone_number};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Request body for POST /api/v1/otp/sessions
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CreateSessionRequest {
    /// Phone number to verify, E.164 format
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    /// Email address to verify
    #[validate(custom = "validate_email")]
    pub email: Option<String>,

    /// Send one code to both destinations when both are given
    #[serde(default)]
    pub single_shared_code: bool,

    /// Name of a registered message template
    #[validate(length(min = 1, max = 64))]
    pub template_name: Option<String>,

    /// Opaque tag passed through to the notifier
    #[validate(length(min = 1, max = 64))]
    pub custom_tag: Option<String>,
}

/// Response body for a created session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub session: SessionSnapshot,
}

/// Request body for POST /api/v1/otp/sessions/{id}/verify
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct VerifyCodeRequest {
    pub channel: ChannelKind,

    /// The six digit code as typed by the user
    #[validate(length(equal = 6, message = "Code must be exactly 6 digits"))]
    pub code: String,
}

/// Response body for a code submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    /// Whether the submitted code matched
    pub verified: bool,
    /// Set once the session has closed
    pub outcome: Option<SessionOutcome>,
}

/// Request body for POST /api/v1/otp/sessions/{id}/resend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResendCodeRequest {
    pub channel: ChannelKind,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone_number(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone_format"))
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email_format"))
    }
}
