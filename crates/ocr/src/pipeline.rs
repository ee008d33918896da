use laoslip_core::SlipResult;
use thiserror::Error;

use crate::extract::Extractor;
use crate::preprocess::{self, NormalizeOptions, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Orchestrates: preprocess → OCR → classify / extract amount / extract date.
///
/// Holds no per-request state, so one instance can serve concurrent callers.
/// Nothing here retries or times out; callers wrap `run` if they need either.
pub struct SlipPipeline<R: OcrBackend> {
    recognizer: R,
    options: NormalizeOptions,
}

impl<R: OcrBackend> SlipPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer, options: NormalizeOptions::default() }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Process one encoded slip image. The first failing stage aborts the run.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = data.len()))]
    pub fn run(&self, data: &[u8]) -> Result<SlipResult, PipelineError> {
        let image_bytes = preprocess::prepare_for_ocr_from_bytes(data, &self.options)?;
        let ocr_text = self.recognizer.recognize(&image_bytes)?;
        tracing::debug!(chars = ocr_text.len(), "recognized text");
        Ok(Extractor::extract(ocr_text))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockRecognizer;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use laoslip_core::InstitutionTag;
    use std::io::Cursor;
    use std::sync::Mutex;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    struct FailingRecognizer;

    impl OcrBackend for FailingRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            Err(OcrError::Engine("traineddata missing".into()))
        }
    }

    /// Records the bytes it was handed so tests can inspect the normalized image.
    struct RecordingRecognizer {
        seen: Mutex<Vec<u8>>,
    }

    impl OcrBackend for RecordingRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            *self.seen.lock().unwrap() = image_bytes.to_vec();
            Ok(String::new())
        }
    }

    #[test]
    fn run_produces_slip_result() {
        let pipeline = SlipPipeline::new(MockRecognizer::new(
            "MoneyGram\nAmount 150,000 LAK\n25/09/24 22:43:06",
        ));
        let r = pipeline.run(&tiny_png()).unwrap();
        assert_eq!(r.institution, InstitutionTag::MoneyGram);
        assert_eq!(r.amount.unwrap().as_str(), "150000");
        assert_eq!(r.date.unwrap().to_string(), "09/25/2024");
    }

    #[test]
    fn unknown_slip_is_still_a_success() {
        let pipeline = SlipPipeline::new(MockRecognizer::new("Payment\n-25,000 LAK"));
        let r = pipeline.run(&tiny_png()).unwrap();
        assert_eq!(r.institution, InstitutionTag::Unknown);
        assert_eq!(r.amount.unwrap().as_str(), "25000");
        assert!(r.date.is_none());
        assert_eq!(r.raw_text, "Payment\n-25,000 LAK");
    }

    #[test]
    fn undecodable_image_fails_before_ocr() {
        let pipeline = SlipPipeline::new(MockRecognizer::new("MoneyGram"));
        let err = pipeline.run(b"not an image").unwrap_err();
        assert!(matches!(err, PipelineError::Preprocess(PreprocessError::Decode(_))));
    }

    #[test]
    fn engine_failure_is_wrapped() {
        let pipeline = SlipPipeline::new(FailingRecognizer);
        let err = pipeline.run(&tiny_png()).unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::Engine(_))));
        assert!(err.to_string().contains("traineddata missing"));
    }

    #[test]
    fn recognizer_receives_capped_grayscale_png() {
        let img: GrayImage = ImageBuffer::from_fn(300, 50, |x, _| Luma([x as u8]));
        let mut src = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut src), image::ImageFormat::Png)
            .unwrap();

        let recorder = RecordingRecognizer { seen: Mutex::new(Vec::new()) };
        let pipeline = SlipPipeline::new(recorder)
            .with_options(NormalizeOptions { max_width: 150, ..Default::default() });
        pipeline.run(&src).unwrap();

        let seen = pipeline.recognizer.seen.lock().unwrap();
        let decoded = image::load_from_memory(&seen).unwrap();
        assert_eq!(decoded.width(), 150);
        assert_eq!(decoded.height(), 25);
        assert_eq!(decoded.color(), image::ColorType::L8);
    }
}
