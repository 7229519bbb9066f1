//! Maps engine and request errors to HTTP responses

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use otp_core::OtpError;
use otp_shared::{error_codes, ErrorResponse};
use uuid::Uuid;
use validator::ValidationErrors;

/// Errors returned by route handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ApiError {
    /// Error code sent to the client
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Otp(error) => match error {
                OtpError::Configuration(_) => error_codes::CONFIGURATION_ERROR,
                OtpError::InvalidCode { .. } => error_codes::VERIFICATION_CODE_INVALID,
                OtpError::ChannelNotConfigured { .. } => error_codes::CHANNEL_NOT_CONFIGURED,
                OtpError::ResendUnavailable { .. } => error_codes::RESEND_UNAVAILABLE,
                OtpError::AlreadyStarted | OtpError::NotStarted => {
                    error_codes::SESSION_STATE_CONFLICT
                }
                OtpError::SessionClosed => error_codes::SESSION_CLOSED,
            },
            ApiError::SessionNotFound(_) => error_codes::SESSION_NOT_FOUND,
            ApiError::Validation(_) => error_codes::VALIDATION_ERROR,
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.code(), self.to_string());
        match self {
            ApiError::Otp(OtpError::ChannelNotConfigured { channel }) => {
                response.add_detail("channel", channel)
            }
            ApiError::Otp(OtpError::ResendUnavailable { channel, stage }) => response
                .add_detail("channel", channel)
                .add_detail("stage", stage),
            ApiError::SessionNotFound(id) => response.add_detail("session_id", id),
            ApiError::Validation(errors) => {
                let fields: Vec<&str> = errors.field_errors().keys().copied().collect();
                response.add_detail("fields", fields)
            }
            _ => response,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Otp(error) => match error {
                OtpError::Configuration(_)
                | OtpError::InvalidCode { .. }
                | OtpError::ChannelNotConfigured { .. } => StatusCode::BAD_REQUEST,
                OtpError::AlreadyStarted
                | OtpError::NotStarted
                | OtpError::ResendUnavailable { .. } => StatusCode::CONFLICT,
                OtpError::SessionClosed => StatusCode::GONE,
            },
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("API error: {}", self);
        } else {
            log::debug!("Request rejected with {}: {}", status, self);
        }
        HttpResponse::build(status).json(self.to_error_response())
    }
}
