pub mod config;
pub mod routes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use laoslip_ocr::{MockRecognizer, OcrBackend, RecognitionProgress, SlipPipeline, TesseractCli};
use tower_http::trace::TraceLayer;

use crate::config::{BackendKind, ServerConfig};

/// Slack on top of the file limit for multipart headers and boundaries.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub type SharedPipeline = Arc<SlipPipeline<Box<dyn OcrBackend>>>;

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SharedPipeline,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(backend: Box<dyn OcrBackend>, max_upload_bytes: usize) -> Self {
        Self { pipeline: Arc::new(SlipPipeline::new(backend)), max_upload_bytes }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let backend: Box<dyn OcrBackend> = match config.backend {
            BackendKind::Tesseract => {
                let mut cli = TesseractCli::new(config.tessdata_dir.clone())
                    .with_observer(Arc::new(log_progress));
                if let Some(bin) = &config.tesseract_bin {
                    cli = cli.with_binary(bin);
                }
                Box::new(cli)
            }
            BackendKind::Mock => Box::new(MockRecognizer::new(config.mock_text.clone())),
            #[cfg(feature = "tesseract")]
            BackendKind::Leptess => Box::new(laoslip_ocr::TesseractRecognizer::new(
                config.tessdata_dir.as_ref().map(|p| p.to_string_lossy().into_owned()),
            )),
        };
        let pipeline = SlipPipeline::new(backend).with_options(config.preprocess);
        Self { pipeline: Arc::new(pipeline), max_upload_bytes: config.max_upload_bytes }
    }
}

fn log_progress(event: &RecognitionProgress) {
    tracing::trace!(?event, "tesseract");
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/health", get(routes::health))
        .route("/ocr/slip", post(routes::ocr_slip))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_backend_from_config_answers_with_preset_text() {
        let config = ServerConfig {
            backend: BackendKind::Mock,
            mock_text: "BCEL One".into(),
            ..ServerConfig::default()
        };
        let state = AppState::from_config(&config);
        let mut png = Vec::new();
        image::DynamicImage::new_luma8(4, 4)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let result = state.pipeline.run(&png).unwrap();
        assert_eq!(result.raw_text, "BCEL One");
    }

    #[cfg(feature = "tesseract")]
    #[test]
    fn leptess_backend_builds_from_config() {
        let config = ServerConfig { backend: BackendKind::Leptess, ..ServerConfig::default() };
        let state = AppState::from_config(&config);
        assert_eq!(state.max_upload_bytes, config.max_upload_bytes);
    }
}
