use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use thiserror::Error;

/// Tesseract language profile: Lao script plus Latin/English, read in one pass.
pub const LANGUAGE_PROFILE: &str = "lao+eng";

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept encoded PNG/JPEG bytes and return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Progress observer ─────────────────────────────────────────────────────────

/// Diagnostic events emitted while an engine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionProgress {
    Started { bytes: usize },
    Diagnostic(String),
    Finished { chars: usize },
}

/// Receives [`RecognitionProgress`] events. Observers see the run but cannot
/// change what the backend returns.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &RecognitionProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&RecognitionProgress) + Send + Sync,
{
    fn on_progress(&self, event: &RecognitionProgress) {
        self(event)
    }
}

/// Observer that drops every event.
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _event: &RecognitionProgress) {}
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string, useful for exercising the extraction pipeline
/// without Tesseract installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract CLI backend ─────────────────────────────────────────────────────

/// Pipes the image to the `tesseract` executable over stdin and reads stdout.
pub struct TesseractCli {
    binary: PathBuf,
    tessdata_dir: Option<PathBuf>,
    observer: Arc<dyn ProgressObserver>,
}

impl TesseractCli {
    pub fn new(tessdata_dir: Option<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            tessdata_dir,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin").arg("stdout").arg("-l").arg(LANGUAGE_PROFILE);
        if let Some(dir) = &self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd
    }
}

impl OcrBackend for TesseractCli {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        self.observer.on_progress(&RecognitionProgress::Started { bytes: image_bytes.len() });

        let mut child = self.command().spawn().map_err(|e| {
            OcrError::NotAvailable(format!("{}: {e}", self.binary.display()))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(image_bytes) {
                // The engine exited (or closed stdin) early; reap it before bailing.
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(OcrError::Engine(format!("failed to pipe image: {e}")));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            self.observer.on_progress(&RecognitionProgress::Diagnostic(line.to_string()));
        }

        if !output.status.success() {
            let msg = stderr.trim();
            // Leptonica fails here when the piped bytes are not a readable image.
            return Err(if msg.contains("pixReadMem") {
                OcrError::ImageDecode(msg.to_string())
            } else {
                OcrError::Engine(format!("{msg} ({})", output.status))
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        self.observer.on_progress(&RecognitionProgress::Finished { chars: text.chars().count() });
        Ok(text)
    }
}

// ── Tesseract library backend (optional, gated behind `tesseract` feature) ────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, LANGUAGE_PROFILE};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), LANGUAGE_PROFILE)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
