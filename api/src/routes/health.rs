use actix_web::{web, HttpResponse};

use super::AppState;

/// Handler for GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "otp-api",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": state.registry.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
