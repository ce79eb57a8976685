use std::process;

use log::error;

use ugly_url::{app, errors::AppError};

#[actix_web::main]
async fn main() {
    // Run the server with error handling for critical failures
    if let Err(err) = app::server().await {
        match err {
            AppError::Server(e) => {
                error!("Critical server error: {}", e);
                process::exit(1);
            }
            AppError::Config(e) => {
                // The logger may not be up yet
                eprintln!("Critical configuration error: {}", e);
                process::exit(2);
            }
            AppError::Logger(e) => {
                eprintln!("Critical logger error: {}", e);
                process::exit(3);
            }
            _ => {
                // Log unexpected errors, but don't exit
                error!("Unexpected error: {}", err);
            }
        }
    }
}
