use actix_web::{web, HttpResponse};
use otp_shared::contact::{mask_destination, normalize_phone_number};
use otp_shared::ApiResponse;
use std::sync::Arc;
use validator::Validate;

use super::AppState;
use crate::config::DEFAULT_TEMPLATE_NAME;
use crate::dto::{CreateSessionRequest, CreateSessionResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/otp/sessions
///
/// Builds a session for the given phone number and/or email address,
/// starts it and returns its first snapshot.
///
/// # Request Body
///
/// ```json
/// {
///     "phone": "+14155552671",
///     "email": "user@example.com",
///     "single_shared_code": false
/// }
/// ```
///
/// # Responses
///
/// - `201 Created` with the session id and snapshot
/// - `400 Bad Request` for invalid contacts or missing destinations
pub async fn create_session(
    state: web::Data<AppState>,
    request: web::Json<CreateSessionRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let request = request.into_inner();

    let pruned = state.registry.prune(state.config.session_retention);
    if pruned > 0 {
        log::debug!("Pruned {} closed OTP sessions", pruned);
    }

    let mut builder = state
        .session_builder()
        .single_shared_code(request.single_shared_code)
        .template_name(
            request
                .template_name
                .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string()),
        );
    if let Some(phone) = &request.phone {
        builder = builder.phone(normalize_phone_number(phone));
    }
    if let Some(email) = &request.email {
        builder = builder.email(email.trim());
    }
    if let Some(tag) = request.custom_tag {
        builder = builder.custom_tag(tag);
    }

    let session = builder
        .on_verified(|| log::info!("OTP session verified"))
        .on_cancelled(|| log::info!("OTP session cancelled"))
        .on_dispatch_failed(|reason| log::warn!("OTP session failed: {}", reason))
        .build()?;
    let session = Arc::new(session);
    session.start()?;

    let session_id = state.registry.insert(Arc::clone(&session));
    log::info!(
        "Created OTP session {} ({:?}) for phone={} email={}",
        session_id,
        session.mode(),
        request.phone.as_deref().map(mask_destination).unwrap_or_default(),
        request.email.as_deref().map(mask_destination).unwrap_or_default(),
    );

    let response = CreateSessionResponse {
        session_id,
        session: session.snapshot().await,
    };
    Ok(HttpResponse::Created().json(ApiResponse::success(response)))
}
