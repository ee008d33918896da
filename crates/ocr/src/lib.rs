pub mod classify;
pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use classify::{classify, Signature};
pub use extract::Extractor;
pub use pipeline::{PipelineError, SlipPipeline};
pub use preprocess::{prepare_for_ocr_from_bytes, NormalizeOptions, PreprocessError};
pub use recognizer::{
    MockRecognizer, NoopObserver, OcrBackend, OcrError, ProgressObserver, RecognitionProgress,
    TesseractCli, LANGUAGE_PROFILE,
};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
