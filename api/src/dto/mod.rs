//! Request and response bodies of the HTTP API

pub mod otp;

pub use otp::{
    CreateSessionRequest, CreateSessionResponse, ResendCodeRequest, VerifyCodeRequest,
    VerifyCodeResponse,
};
