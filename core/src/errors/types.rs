//! Construction-time configuration errors

use thiserror::Error;

use crate::domain::entities::ChannelKind;

/// A session could not be built from the supplied configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("At least one destination (phone or email) is required")]
    MissingDestination,

    #[error("Destination for {channel} is empty")]
    EmptyDestination { channel: ChannelKind },

    #[error("Callback '{name}' is required")]
    MissingCallback { name: &'static str },

    #[error("No notifier available for {channel}")]
    NotifierUnavailable { channel: ChannelKind },

    #[error("Timeout '{name}' must be greater than zero")]
    InvalidTimeout { name: &'static str },
}
