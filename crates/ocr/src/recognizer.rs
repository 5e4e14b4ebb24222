use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine returned no result")]
    EmptyResponse,
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG image bytes and return the recognized text.
pub trait OcrBackend: Send + Sync {
    /// Short identifier written into the reports.
    fn name(&self) -> &str;

    fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_png)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string. Useful for exercising the runner without an
/// OCR engine installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognize(&self, _image_png: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract command-line backend ────────────────────────────────────────────

/// Runs the `tesseract` executable, feeding the image on stdin and reading
/// plain text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    pub binary: PathBuf,
    pub lang: String,
    pub tessdata_dir: Option<PathBuf>,
    /// Page segmentation mode; tesseract's default when unset.
    pub psm: Option<u8>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            tessdata_dir: None,
            psm: None,
        }
    }
}

impl TesseractCli {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into(), ..Self::default() }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.lang.clone(),
        ];
        if let Some(dir) = &self.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.display().to_string());
        }
        if let Some(psm) = self.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }

    /// First line of `tesseract --version`; fails if the executable cannot start.
    pub fn version(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| OcrError::NotAvailable(format!("{}: {e}", self.binary.display())))?;
        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() { output.stderr } else { output.stdout };
        Ok(String::from_utf8_lossy(&banner).lines().next().unwrap_or_default().to_string())
    }
}

impl OcrBackend for TesseractCli {
    fn name(&self) -> &str {
        "tesseract-cli"
    }

    fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError> {
        tracing::debug!(binary = %self.binary.display(), lang = %self.lang, "invoking tesseract");

        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OcrError::NotAvailable(format!("{}: {e}", self.binary.display())))?;

        // stdin is closed at the end of the match, even if the write failed.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(image_png),
            None => Ok(()),
        };

        // Always reap the child; a failed write usually means it exited early
        // and its stderr explains why.
        let output = child
            .wait_with_output()
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| OcrError::Engine(format!("writing image to tesseract: {e}")))?;

        String::from_utf8(output.stdout).map_err(|e| OcrError::Engine(e.to_string()))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }

        /// Initialise the engine once to surface bad tessdata or languages.
        pub fn check_available(&self) -> Result<(), OcrError> {
            LepTess::new(self.data_path.as_deref(), &self.lang)
                .map(|_| ())
                .map_err(|e| OcrError::NotAvailable(e.to_string()))
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn name(&self) -> &str {
            "tesseract"
        }

        fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::NotAvailable(e.to_string()))?;
            lt.set_image_from_mem(image_png)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
