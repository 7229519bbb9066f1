//! Domain entities

pub mod channel;
pub mod otp_code;

#[cfg(test)]
mod tests;

pub use channel::{ChannelKind, ChannelStage, SendStatus, VerificationMode};
pub use otp_code::{
    is_denylisted_prefix, parse_code, OtpGenerator, OtpSecret, CODE_LENGTH, CODE_MAX, CODE_MIN,
    PREFIX_DENYLIST, PREFIX_LENGTH, PREFIX_SEPARATOR,
};
