//! Type definitions shared by API responses

pub mod response;

pub use response::ApiResponse;
