//! Error types of the verification engine.

mod types;

pub use types::ConfigError;

use thiserror::Error;

use crate::domain::entities::{ChannelKind, ChannelStage};

/// Errors returned by sessions and their helpers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Session has already been started")]
    AlreadyStarted,

    #[error("Session has not been started")]
    NotStarted,

    #[error("Session is closed")]
    SessionClosed,

    #[error("Channel {channel} is not part of this session")]
    ChannelNotConfigured { channel: ChannelKind },

    #[error("Resend is not available for {channel} while {stage}")]
    ResendUnavailable {
        channel: ChannelKind,
        stage: ChannelStage,
    },

    #[error("Invalid code: {reason}")]
    InvalidCode { reason: String },
}

impl OtpError {
    /// Whether the error comes from building the session
    pub fn is_configuration(&self) -> bool {
        matches!(self, OtpError::Configuration(_))
    }
}

pub type OtpResult<T> = Result<T, OtpError>;
