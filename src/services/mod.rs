use actix_web::web;

pub mod decoder;
pub mod uglifier;

pub use decoder::DecoderService;
pub use uglifier::UglifierService;

use crate::config::UglifierConfig;

/// Service Register
pub fn register(config: &UglifierConfig, cfg: &mut web::ServiceConfig) {
    // Both pipelines share the same pools
    let uglifier_service = UglifierService::new(config.pools.clone());
    let decoder_service = DecoderService::new(config.pools.clone(), config.security.clone());
    cfg.app_data(web::Data::new(uglifier_service));
    cfg.app_data(web::Data::new(decoder_service));
}
