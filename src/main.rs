use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;
use std::path::Path;

use dinner_seeker::config::AppConfig;
use dinner_seeker::{logging, server, utils, GeminiClient};

fn log_configuration(config: &AppConfig) {
    let summary = serde_json::json!({
        "GEMINI_API_KEY": utils::mask_api_key(&config.api_key),
        "GEMINI_MODEL": config.model,
        "GEMINI_API_BASE": config.api_base,
        "BIND_ADDR": config.bind_addr,
        "LOG_LEVEL": config.log_level.to_string(),
        "RATE_LIMIT_PER_SECOND": config.rate_limit_per_second,
        "RATE_LIMIT_BURST": config.rate_limit_burst,
    });
    info!("Configuration: {:#}", summary);
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    if let Err(e) = logging::setup_logging(config.log_level, Path::new("logs")) {
        eprintln!("Failed to set up logging: {}", e);
        return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
    }

    log_configuration(&config);

    let client = GeminiClient::with_base_url(&config.api_key, &config.model, &config.api_base)
        .map_err(|e| {
            error!("Failed to build Gemini client: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        })?;

    let governor_config = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_second)
        .burst_size(config.rate_limit_burst)
        .finish()
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "rate limits must be greater than zero")
        })?;

    info!("Starting DinnerSeeker server on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Governor::new(&governor_config))
            .app_data(web::Data::new(client.clone()))
            .configure(server::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
