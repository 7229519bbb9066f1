//! # OTP API
//!
//! HTTP host for OTP verification sessions. Each session created through the
//! API runs inside the server process; clients poll its snapshot, submit
//! codes, request resends and cancel it.
//!
//! ## Routes
//!
//! - `GET /health`
//! - `POST /api/v1/otp/sessions`
//! - `GET /api/v1/otp/sessions/{id}`
//! - `POST /api/v1/otp/sessions/{id}/verify`
//! - `POST /api/v1/otp/sessions/{id}/resend`
//! - `DELETE /api/v1/otp/sessions/{id}`

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod routes;
