use futures::stream::{self, Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;

use imgscribe_core::{ExtractionSession, FailureKind, ImageRecord};

use crate::config::RunConfig;
use crate::load::{self, LoadError};
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image load failed: {0}")]
    Load(#[from] LoadError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("{kind} (worker task aborted): {source}")]
    Task {
        kind: FailureKind,
        #[source]
        source: JoinError,
    },
}

impl PipelineError {
    /// The per-file step this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Load(_) => FailureKind::ImageLoad,
            PipelineError::Ocr(_) => FailureKind::Recognition,
            PipelineError::Task { kind, .. } => *kind,
        }
    }
}

/// Orchestrates, per file: load → recognize → clean → record.
///
/// Files are handled one at a time, in the order given. Decoding and the
/// engine call run on the blocking pool but are awaited before the next file
/// starts.
pub struct ExtractionRunner<R: OcrBackend> {
    recognizer: Arc<R>,
}

impl<R: OcrBackend + 'static> ExtractionRunner<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer: Arc::new(recognizer) }
    }

    pub fn engine_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Process one file. Failures are captured in the returned record.
    pub async fn process_file(&self, path: &Path) -> ImageRecord {
        match self.extract(path).await {
            Ok(raw) => ImageRecord::success(path, &raw),
            Err(e) => ImageRecord::failed(path, e.kind(), e.to_string()),
        }
    }

    async fn extract(&self, path: &Path) -> Result<String, PipelineError> {
        // 1. Load and decode.
        let owned = path.to_path_buf();
        let image = tokio::task::spawn_blocking(move || load::load_image(&owned))
            .await
            .map_err(|source| PipelineError::Task { kind: FailureKind::ImageLoad, source })??;

        // 2. Run OCR.
        let recognizer = Arc::clone(&self.recognizer);
        let raw = tokio::task::spawn_blocking(move || recognizer.recognize(&image.png))
            .await
            .map_err(|source| PipelineError::Task { kind: FailureKind::Recognition, source })??;

        Ok(raw)
    }

    /// Lazily yield one record per path, in the order of `paths`.
    pub fn records(&self, paths: Vec<PathBuf>) -> impl Stream<Item = ImageRecord> + '_ {
        let total = paths.len();
        stream::iter(paths.into_iter().enumerate()).then(move |(i, path)| async move {
            tracing::info!(
                "Processing {}/{}: {}",
                i + 1,
                total,
                path.file_name().unwrap_or(path.as_os_str()).to_string_lossy()
            );
            self.process_file(&path).await
        })
    }

    /// Process every path and gather the records into a session.
    pub async fn run(&self, paths: Vec<PathBuf>, config: &RunConfig) -> ExtractionSession {
        let mut session = ExtractionSession::new(config.started_at, self.engine_name());

        let records = self.records(paths);
        futures::pin_mut!(records);
        while let Some(record) = records.next().await {
            match record.error_message() {
                None => tracing::info!(
                    file = %record.file_name(),
                    words = record.word_count(),
                    "extracted text"
                ),
                Some(err) => tracing::warn!(file = %record.file_name(), "extraction failed: {err}"),
            }
            session.push(record);
        }

        tracing::info!(
            total = session.total(),
            success = session.successes(),
            failed = session.failures(),
            "extraction finished"
        );
        session
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
