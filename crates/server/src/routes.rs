use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use laoslip_core::SlipResult;
use laoslip_ocr::PipelineError;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::AppState;

/// Multipart field carrying the slip image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct SlipResponse {
    pub success: bool,
    pub data: SlipResult,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image file provided")]
    NoFile,
    #[error("Only image files are allowed")]
    NotAnImage,
    #[error("Image file must be less than {}", format_limit(.limit_bytes))]
    TooLarge { limit_bytes: usize },
    #[error("Malformed upload: {0}")]
    BadUpload(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Worker task failed: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::NoFile => (StatusCode::BAD_REQUEST, "No image file provided"),
            ApiError::NotAnImage => (StatusCode::BAD_REQUEST, "Invalid file type"),
            ApiError::TooLarge { .. } => (StatusCode::BAD_REQUEST, "File too large"),
            ApiError::BadUpload(_) => (StatusCode::BAD_REQUEST, "Invalid upload"),
            ApiError::Pipeline(_) => (StatusCode::INTERNAL_SERVER_ERROR, "OCR processing failed"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        let message = match &self {
            ApiError::NoFile => "Please upload an image file".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Whole mebibytes print as `NMB`; anything else falls back to a byte count.
fn format_limit(bytes: &usize) -> String {
    const MB: usize = 1024 * 1024;
    let bytes = *bytes;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Handler for `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK", message: "Lao Slip OCR API is running" })
}

/// Handler for `POST /ocr/slip`
pub async fn ocr_slip(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SlipResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::NoFile)?;
    let limit_bytes = state.max_upload_bytes;

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::TooLarge { limit_bytes }
        } else {
            ApiError::BadUpload(e.body_text())
        }
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let is_image = field.content_type().is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(ApiError::NotAnImage);
        }
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::TooLarge { limit_bytes }
            } else {
                ApiError::BadUpload(e.body_text())
            }
        })?;
        if bytes.len() > state.max_upload_bytes {
            return Err(ApiError::TooLarge { limit_bytes });
        }
        image = Some(bytes);
        break;
    }
    let image = image.ok_or(ApiError::NoFile)?;

    let pipeline = state.pipeline.clone();
    let size = image.len();
    let result = tokio::task::spawn_blocking(move || pipeline.run(&image))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    match result {
        Ok(slip) => {
            info!(
                bytes = size,
                institution = %slip.institution,
                amount = slip.amount.is_some(),
                date = slip.date.is_some(),
                "slip processed"
            );
            Ok(Json(SlipResponse { success: true, data: slip }))
        }
        Err(e) => {
            warn!(bytes = size, "OCR processing error: {e}");
            Err(e.into())
        }
    }
}
