use actix_web::{http::header::LOCATION, web, HttpRequest, HttpResponse, Responder};
use log::{debug, info};
use serde_json::json;
use validator::Validate;

use crate::{
    config::UglifierConfig,
    models::{QueryParams, UglifyRequestDto, UglifyResponseDto, UglinessLevel},
    services::{DecoderService, UglifierService},
    types::Result,
    validations::sanitize_url,
};

/// Base URL ugly links are built on: configured, or taken from the request.
fn base_url(req: &HttpRequest, config: &UglifierConfig) -> String {
    match &config.base_url {
        Some(base) => base.clone(),
        None => {
            let info = req.connection_info();
            format!("{}://{}", info.scheme(), info.host())
        }
    }
}

/// Uglify route handler
pub async fn uglify_handler(
    req: HttpRequest,
    form: web::Form<UglifyRequestDto>,
    service: web::Data<UglifierService>,
    config: web::Data<UglifierConfig>,
) -> Result<impl Responder> {
    let mut dto = form.into_inner();
    dto.url = dto.url.trim().to_string();
    dto.validate()?;

    let ugliness = dto.ugliness_or(config.default_ugliness);
    let original_url = sanitize_url(&dto.url);
    let base = base_url(&req, &config);

    let ugly_url = service.uglify(&original_url, ugliness, &base, &mut rand::rng());
    let response = UglifyResponseDto::new(original_url, ugly_url, UglinessLevel::clamped(ugliness));

    info!(
        "Uglified URL at level {}: {} -> {} characters",
        response.ugliness_level, response.original_length, response.ugly_length
    );

    Ok(HttpResponse::Ok().json(json!({
        "data": response,
        "message": "Successfully uglified URL",
    })))
}

/// Redirect route handler. The path is decoration; only the query matters.
pub async fn redirect_handler(
    req: HttpRequest,
    path: web::Path<String>,
    service: web::Data<DecoderService>,
) -> Result<impl Responder> {
    debug!("Redirect requested via decoy path '/{}'", path.into_inner());

    let params = QueryParams::parse(req.query_string());
    let original_url = service.decode(&params)?;

    info!("Redirecting ugly URL to '{}'", original_url);

    Ok(HttpResponse::Found()
        .insert_header((LOCATION, original_url))
        .finish())
}
