use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::text;

/// `strftime` pattern of the token shared by both report file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Success,
    Failed,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Success => write!(f, "success"),
            RecordStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RecordStatus::Success),
            "failed" => Ok(RecordStatus::Failed),
            other => Err(format!("Unknown record status: '{other}'")),
        }
    }
}

/// Which per-file step failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file could not be read or decoded as an image.
    ImageLoad,
    /// The OCR engine errored or produced no answer.
    Recognition,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ImageLoad => write!(f, "image load error"),
            FailureKind::Recognition => write!(f, "recognition error"),
        }
    }
}

/// Outcome of one extraction attempt. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRecord {
    file_path: PathBuf,
    recognized_text: String,
    word_count: usize,
    char_count: usize,
    status: RecordStatus,
    failure: Option<FailureKind>,
    error_message: Option<String>,
}

impl ImageRecord {
    /// Record a successful recognition. `raw_text` is cleaned here so every
    /// successful record carries normalized text and matching counts.
    pub fn success(file_path: impl Into<PathBuf>, raw_text: &str) -> Self {
        let recognized_text = text::clean_text(raw_text);
        Self {
            file_path: file_path.into(),
            word_count: text::word_count(&recognized_text),
            char_count: recognized_text.chars().count(),
            recognized_text,
            status: RecordStatus::Success,
            failure: None,
            error_message: None,
        }
    }

    pub fn failed(
        file_path: impl Into<PathBuf>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            recognized_text: String::new(),
            word_count: 0,
            char_count: 0,
            status: RecordStatus::Failed,
            failure: Some(kind),
            error_message: Some(message.into()),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Final path component, or the whole path if it has none.
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.display().to_string())
    }

    pub fn recognized_text(&self) -> &str {
        &self.recognized_text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }
}

/// Every record of one run, in collection order. Records are only appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSession {
    timestamp: String,
    started_at: DateTime<Local>,
    engine: String,
    records: Vec<ImageRecord>,
}

impl ExtractionSession {
    pub fn new(started_at: DateTime<Local>, engine: impl Into<String>) -> Self {
        Self {
            timestamp: started_at.format(TIMESTAMP_FORMAT).to_string(),
            started_at,
            engine: engine.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ImageRecord) {
        self.records.push(record);
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn successful(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter().filter(|r| r.is_success())
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn successes(&self) -> usize {
        self.successful().count()
    }

    pub fn failures(&self) -> usize {
        self.total() - self.successes()
    }
}
