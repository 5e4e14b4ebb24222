use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use imgscribe_core::TIMESTAMP_FORMAT;

pub const DEFAULT_INPUT_DIR: &str = "images";
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_text";
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// Everything a run needs to know, fixed at start-up and passed down
/// explicitly to the collector, the runner and the report writer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Captured once; both report names derive from it.
    pub started_at: DateTime<Local>,
    pub preview_chars: usize,
}

impl RunConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            started_at: Local::now(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn timestamp(&self) -> String {
        self.started_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn full_text_path(&self) -> PathBuf {
        report_path(&self.output_dir, "extracted_text", &self.timestamp())
    }

    pub fn summary_path(&self) -> PathBuf {
        report_path(&self.output_dir, "summary", &self.timestamp())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR)
    }
}

/// Layout: `<output_dir>/<prefix>_<timestamp>.txt`
fn report_path(output_dir: &Path, prefix: &str, timestamp: &str) -> PathBuf {
    output_dir.join(format!("{prefix}_{timestamp}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_use_conventional_dirs() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.input_dir, PathBuf::from("images"));
        assert_eq!(cfg.output_dir, PathBuf::from("extracted_text"));
        assert_eq!(cfg.preview_chars, 200);
    }

    #[test]
    fn report_paths_share_timestamp() {
        let start = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let cfg = RunConfig::new("in", "/data/out").with_started_at(start);
        assert_eq!(cfg.timestamp(), "20250102_030405");
        assert_eq!(
            cfg.full_text_path(),
            PathBuf::from("/data/out/extracted_text_20250102_030405.txt")
        );
        assert_eq!(
            cfg.summary_path(),
            PathBuf::from("/data/out/summary_20250102_030405.txt")
        );
    }

    #[test]
    fn timestamp_is_stable_across_calls() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.timestamp(), cfg.timestamp());
    }
}
