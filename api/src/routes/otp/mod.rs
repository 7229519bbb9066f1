//! OTP session routes
//!
//! - `POST /otp/sessions` creates and starts a session
//! - `GET /otp/sessions/{id}` returns its snapshot
//! - `POST /otp/sessions/{id}/verify` submits a code
//! - `POST /otp/sessions/{id}/resend` requests a fresh code
//! - `DELETE /otp/sessions/{id}` cancels it

pub mod cancel_session;
pub mod create_session;
pub mod get_session;
pub mod resend_code;
pub mod verify_code;

pub use cancel_session::cancel_session;
pub use create_session::create_session;
pub use get_session::get_session;
pub use resend_code::resend_code;
pub use verify_code::verify_code;

use std::sync::Arc;

use actix_web::{error::InternalError, web, HttpResponse};
use otp_core::{
    MessageTemplates, OtpGenerator, SessionBuilder, StaticTemplates, VerificationSession,
};
use otp_infra::InfrastructureServices;
use otp_shared::{error_codes, ErrorResponse};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::handlers::ApiError;
use crate::registry::SessionRegistry;

/// Shared state of the OTP routes
pub struct AppState {
    pub config: ApiConfig,
    pub notifiers: InfrastructureServices,
    pub registry: SessionRegistry,
    templates: Arc<StaticTemplates>,
    generator: Arc<OtpGenerator>,
}

impl AppState {
    pub fn new(config: ApiConfig, notifiers: InfrastructureServices) -> Self {
        let templates = Arc::new(config.templates());
        Self {
            config,
            notifiers,
            registry: SessionRegistry::new(),
            templates,
            generator: Arc::new(OtpGenerator::new()),
        }
    }

    /// Builder preloaded with the configured notifiers, templates and timeouts
    pub fn session_builder(&self) -> SessionBuilder {
        VerificationSession::builder()
            .sms_notifier(Arc::clone(&self.notifiers.sms_notifier))
            .email_notifier(Arc::clone(&self.notifiers.email_notifier))
            .templates(Arc::clone(&self.templates) as Arc<dyn MessageTemplates>)
            .generator(Arc::clone(&self.generator))
            .config(self.config.verification.clone())
    }

    pub fn session(&self, id: Uuid) -> Result<Arc<VerificationSession>, ApiError> {
        self.registry.get(&id).ok_or(ApiError::SessionNotFound(id))
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4096)
        .error_handler(|err, _req| {
            let body = ErrorResponse::new(error_codes::BAD_REQUEST, err.to_string());
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/otp/sessions")
            .app_data(json_config())
            .route("", web::post().to(create_session))
            .route("/{id}", web::get().to(get_session))
            .route("/{id}", web::delete().to(cancel_session))
            .route("/{id}/verify", web::post().to(verify_code))
            .route("/{id}/resend", web::post().to(resend_code)),
    );
}
