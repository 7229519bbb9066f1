//! # OTP Core
//!
//! Core verification engine for one-time-password checks over one or two
//! notification channels. This crate contains the domain entities (codes,
//! prefixes, channel kinds), the notifier and template seams, the channel
//! senders, the per-channel state machine and the verification session that
//! aggregates them.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
