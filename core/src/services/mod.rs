//! Services containing the verification engine.

pub mod verification;

pub use verification::{
    normalize_template, render_message, render_payload, ChannelSender, CombinedSender, Countdown,
    MessageTemplates, Notifier, OtpSender, SessionBuilder, StaticTemplates, VerificationConfig,
    VerificationSession, DEFAULT_TEMPLATE, OTP_PLACEHOLDER,
};
