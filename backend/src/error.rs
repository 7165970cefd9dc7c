use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;

use crate::classify::model::InferenceError;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Request-local failure taxonomy. Display strings double as the wire
/// error bodies, so internal detail stays out of them.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No image uploaded")]
    MissingImage,
    #[error("Invalid image file")]
    InvalidImage,
    #[error("Malformed upload")]
    Upload(#[source] actix_multipart::MultipartError),
    #[error("Inference failed")]
    Inference(#[from] InferenceError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::InvalidImage | ApiError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Inference(source) => error!("Inference failure: {source}"),
            ApiError::Upload(source) => error!("Rejected malformed upload: {source}"),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn missing_image_maps_to_400_with_wire_message() {
        let err = ApiError::MissingImage;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "No image uploaded");
    }

    #[actix_web::test]
    async fn invalid_image_maps_to_400() {
        let err = ApiError::InvalidImage;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Invalid image file");
    }

    #[actix_web::test]
    async fn inference_failures_stay_generic() {
        let err = ApiError::Inference(InferenceError::UnexpectedOutput(1000));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        // The internal shape mismatch is logged, never surfaced.
        assert_eq!(value["error"], "Inference failed");
    }
}
