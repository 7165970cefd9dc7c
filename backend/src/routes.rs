use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use shared::{ComparisonReport, ModelFamily};

use crate::classify::decision;
use crate::classify::model::Engines;
use crate::classify::preprocess;
use crate::error::ApiError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/compare").route(web::post().to(compare)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct PredictQuery {
    model: Option<ModelFamily>,
}

async fn predict(
    engines: web::Data<Engines>,
    query: web::Query<PredictQuery>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let family = query.model.unwrap_or(ModelFamily::Mobilenet);
    let image_data = read_image_field(&mut payload).await?;
    let image = decode_upload(&image_data)?;

    let tensor = preprocess::normalize(&image, family);
    let probs = engines.classifier(family).probabilities(&tensor)?;
    let report = decision::single_report(&probs);

    info!(
        "/predict [{}] -> {} ({:.2}%)",
        family, report.prediction, report.confidence
    );
    Ok(HttpResponse::Ok().json(report))
}

async fn compare(
    engines: web::Data<Engines>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let image_data = read_image_field(&mut payload).await?;
    // One structural decode feeds both normalization policies.
    let image = decode_upload(&image_data)?;

    let mob_tensor = preprocess::normalize(&image, ModelFamily::Mobilenet);
    let eff_tensor = preprocess::normalize(&image, ModelFamily::Efficientnet);

    let mob_probs = engines.mobilenet.probabilities(&mob_tensor)?;
    let eff_probs = engines.efficientnet.probabilities(&eff_tensor)?;

    let report = decision::compare_reports(&mob_probs, &eff_probs);
    match &report {
        ComparisonReport::Invalid { .. } => info!("/compare -> invalid upload"),
        ComparisonReport::Resolved { best_model, .. } => info!(
            "/compare -> {} via {} ({})",
            best_model.prediction, best_model.model, best_model.verdict
        ),
    }
    Ok(HttpResponse::Ok().json(report))
}

fn decode_upload(image_data: &[u8]) -> Result<image::DynamicImage, ApiError> {
    preprocess::decode(image_data).map_err(|e| {
        warn!("Rejecting undecodable upload: {e}");
        ApiError::InvalidImage
    })
}

/// Drains the multipart stream until the `image` field is found and
/// buffered. An absent or empty field is a missing upload.
async fn read_image_field(payload: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(mut field) = payload.try_next().await.map_err(ApiError::Upload)? {
        if field.name() != Some("image") {
            continue;
        }
        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(ApiError::Upload)?;
            image_data.extend_from_slice(&data);
        }
        if image_data.is_empty() {
            break;
        }
        return Ok(image_data);
    }
    Err(ApiError::MissingImage)
}
