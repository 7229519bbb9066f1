//! Application factory
//!
//! Wires the shared state, middleware and routes into an Actix-web `App`.

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, HttpResponse,
};
use otp_shared::{error_codes, ErrorResponse};

use crate::middleware::cors::create_cors;
use crate::routes::{self, AppState};

/// Create and configure the application
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .wrap(create_cors())
        .wrap(Logger::default())
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
