//! Common utility functions

pub mod contact;

// Re-export commonly used utilities
pub use contact::*;
