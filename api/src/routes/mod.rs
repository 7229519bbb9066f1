//! Route handlers and their registration

pub mod health;
pub mod otp;

pub use otp::AppState;

use actix_web::web;

/// Register every route of the API
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(web::scope("/api/v1").configure(otp::configure));
}
