//! OTP verification over one or two notification channels
//!
//! A [`VerificationSession`] owns one channel per verified
//! contact point. Each channel generates a code and prefix, hands them to a
//! [`ChannelSender`] (or a [`CombinedSender`] in shared-code mode), and runs
//! its countdowns. Sender completions, countdown fires and user requests all
//! travel through the session's single event queue, so state transitions
//! never run concurrently and anything arriving after close is dropped.

mod channel;
mod config;
mod events;
mod sender;
mod session;
mod template;
mod timer;
mod traits;

#[cfg(test)]
mod tests;

pub use config::{
    VerificationConfig, DEFAULT_MIN_EXPIRY_SECS, DEFAULT_RESEND_TIMEOUT_SECS,
    DEFAULT_SENDER_TIMEOUT_SECS, DEFAULT_USER_TIMEOUT_SECS,
};
pub use sender::{ChannelSender, CombinedSender, OtpSender, StatusCell};
pub use session::{SessionBuilder, VerificationSession};
pub use template::{
    normalize_template, render_message, render_payload, StaticTemplates, DEFAULT_TEMPLATE,
    OTP_PLACEHOLDER,
};
pub use timer::Countdown;
pub use traits::{MessageTemplates, Notifier};
