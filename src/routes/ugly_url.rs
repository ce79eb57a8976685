use actix_web::{web, HttpRequest, Responder};

use crate::{
    config::UglifierConfig,
    handlers::{redirect_handler, uglify_handler},
    models::UglifyRequestDto,
    services::{DecoderService, UglifierService},
    types::Result,
};

// Uglify route handler
async fn uglify_url(
    req: HttpRequest,
    form: web::Form<UglifyRequestDto>,
    service: web::Data<UglifierService>,
    config: web::Data<UglifierConfig>,
) -> Result<impl Responder> {
    uglify_handler(req, form, service, config).await
}

// Ugly URL redirect route handler
async fn follow_ugly_url(
    req: HttpRequest,
    path: web::Path<String>,
    service: web::Data<DecoderService>,
) -> Result<impl Responder> {
    redirect_handler(req, path, service).await
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/uglify", web::post().to(uglify_url));
    cfg.route("/{ugly_path:.*}", web::get().to(follow_ugly_url));
}
