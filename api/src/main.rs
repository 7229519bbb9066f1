use actix_web::{web, HttpServer};
use log::info;

use otp_api::app::create_app;
use otp_api::config::ApiConfig;
use otp_api::logging;
use otp_api::routes::AppState;
use otp_shared::Environment;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    dotenvy::from_filename(Environment::from_env().env_file()).ok();

    let config = ApiConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    logging::init(&config.app.logging);
    info!("Starting OTP API server ({})", config.app.environment);

    let notifiers = otp_infra::initialize()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let bind_address = config.app.server.bind_address();
    let workers = config.app.server.workers;
    info!("Server will bind to: {}", bind_address);

    let state = web::Data::new(AppState::new(config, notifiers));

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if workers > 0 {
        server = server.workers(workers);
    }
    server.bind(&bind_address)?.run().await
}
