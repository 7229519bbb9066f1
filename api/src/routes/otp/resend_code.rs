use actix_web::{web, HttpResponse};
use otp_shared::ApiResponse;
use uuid::Uuid;

use super::AppState;
use crate::dto::ResendCodeRequest;
use crate::handlers::ApiError;

/// Handler for POST /api/v1/otp/sessions/{id}/resend
///
/// Only accepted once the resend window has elapsed or the last dispatch
/// failed; otherwise `409 Conflict`.
pub async fn resend_code(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    request: web::Json<ResendCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();
    let session = state.session(session_id)?;

    session.request_resend(request.channel).await?;
    log::info!("Resend requested for session {} on {}", session_id, request.channel);

    Ok(HttpResponse::Accepted().json(ApiResponse::success(session.snapshot().await)))
}
