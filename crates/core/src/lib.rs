pub mod text;
pub mod types;

pub use text::{clean_text, preview, word_count};
pub use types::{ExtractionSession, FailureKind, ImageRecord, RecordStatus, TIMESTAMP_FORMAT};
