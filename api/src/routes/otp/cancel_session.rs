use actix_web::{web, HttpResponse};
use otp_shared::ApiResponse;
use uuid::Uuid;

use super::AppState;
use crate::handlers::ApiError;

/// Handler for DELETE /api/v1/otp/sessions/{id}
///
/// Cancelling a closed session leaves its outcome unchanged.
pub async fn cancel_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();
    let session = state.session(session_id)?;

    session.cancel().await?;
    let outcome = session.wait_for_outcome().await?;
    log::info!("Session {} closed: {}", session_id, outcome);

    Ok(HttpResponse::Ok().json(ApiResponse::success(session.snapshot().await)))
}
