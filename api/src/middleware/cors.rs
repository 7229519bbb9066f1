//! CORS configuration for browser clients of the OTP API.
//!
//! Development allows any origin. Production only allows the origins listed
//! in `ALLOWED_ORIGINS`.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use otp_shared::Environment;
use std::env;

const DEFAULT_MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance for the current environment.
///
/// # Environment Variables
/// - `OTP_ENV` or `ENVIRONMENT`: "production" selects the restrictive settings
/// - `ALLOWED_ORIGINS`: comma-separated list of allowed origins (production only)
/// - `CORS_MAX_AGE`: max age for the preflight cache in seconds (default: 3600)
pub fn create_cors() -> Cors {
    let max_age = env::var("CORS_MAX_AGE")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_AGE);

    if Environment::from_env().is_production() {
        let origins = env::var("ALLOWED_ORIGINS").unwrap_or_default();
        create_production_cors(&allowed_origins(&origins), max_age)
    } else {
        create_development_cors(max_age)
    }
}

fn allowed_origins(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn create_development_cors(max_age: usize) -> Cors {
    log::info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .max_age(max_age)
}

fn create_production_cors(origins: &[&str], max_age: usize) -> Cors {
    log::info!("Configuring CORS for production environment");

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(max_age);

    for origin in origins {
        log::info!("Adding allowed origin: {}", origin);
        cors = cors.allowed_origin(origin);
    }
    if origins.is_empty() {
        log::warn!("ALLOWED_ORIGINS is empty; cross-origin requests will be rejected");
    }

    cors
}
