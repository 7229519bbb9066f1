//! Error mapping shared by all route handlers

pub mod error;

pub use error::ApiError;
