use std::time::Instant;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{debug, info};

use crate::{
    config::{Config, Environment, UglifierConfig},
    errors::AppError,
    middleware::RequestLogger,
    routes, services,
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> Result<(), AppError> {
    // Configure log level based on environment and config
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

/// Registers configuration, services and routes on an app.
///
/// Shared by the server and the HTTP tests so both see the same wiring.
pub fn configure(cfg: &mut web::ServiceConfig, config: &UglifierConfig) {
    cfg.app_data(web::Data::new(config.clone()));
    services::register(config, cfg);
    routes::configure_routes(cfg);
}

pub async fn server() -> AppResult<()> {
    // Load application configuration
    let config = Config::load()?;

    // Setup enhanced logging based on configuration
    setup_logging(&config)?;

    // Capture start time for uptime calculation
    let start_time = Instant::now();

    // Log startup information
    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );
    match &config.uglifier.base_url {
        Some(base) => info!("Ugly URLs will be built on {}", base),
        None => info!("Ugly URLs will be built on the requesting host"),
    }

    if config.app.environment == Environment::Development {
        debug!("Debug logging enabled");
        debug!("Full configuration: {:?}", config);
    }

    // Determine if we should enable more verbose logging
    let enable_debug_logging = config.app.environment != Environment::Production;

    // Create a cloned config for the closure
    let app_config = config.clone();

    // Never log full request lines: ugly URLs are kilobytes of query string
    let log_format = if enable_debug_logging {
        "%a \"%U\" %s %b %T"
    } else {
        "%a \"%U\" %s %b %T \"%{User-Agent}i\" %{X-Request-ID}o"
    };

    // Start the HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                start_time,
                version: app_config.app.version.clone(),
            }))
            .configure(|cfg| configure(cfg, &app_config.uglifier))
            // Innermost, so `Logger` sees the request id it sets
            .wrap(RequestLogger::new(enable_debug_logging))
            .wrap(Logger::new(log_format))
            .wrap(cors)
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
