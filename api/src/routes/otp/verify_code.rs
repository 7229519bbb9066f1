use actix_web::{web, HttpResponse};
use otp_core::parse_code;
use otp_shared::ApiResponse;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/otp/sessions/{id}/verify
///
/// A mismatching code is not an error: the response carries
/// `verified: false` and the session stays open.
pub async fn verify_code(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let session_id = path.into_inner();
    let session = state.session(session_id)?;

    let code = parse_code(&request.code)?;
    let verified = session.submit_code(request.channel, code).await?;
    log::info!(
        "Code submitted for session {} on {}: verified={}",
        session_id,
        request.channel,
        verified
    );

    let response = VerifyCodeResponse {
        verified,
        outcome: session.outcome(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}
