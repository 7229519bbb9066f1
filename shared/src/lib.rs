//! Shared utilities and common types for the OTP verification server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Contact utilities (phone/email masking, destination hints)
//! - Common response wrappers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, LogFormat, LoggingConfig, NotifierConfig, OtpConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::ApiResponse;
pub use utils::contact;
