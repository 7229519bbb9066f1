use actix_web::{web, HttpResponse};
use otp_shared::ApiResponse;
use uuid::Uuid;

use super::AppState;
use crate::handlers::ApiError;

/// Handler for GET /api/v1/otp/sessions/{id}
///
/// Returns the session snapshot: per-channel stage, prefix, countdown and
/// the outcome once closed.
pub async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let session = state.session(path.into_inner())?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(session.snapshot().await)))
}
