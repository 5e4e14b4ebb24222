pub mod collect;
pub mod config;
pub mod load;
pub mod pipeline;
pub mod recognizer;
pub mod report;
#[cfg(feature = "openai")]
pub mod vision;

pub use collect::{collect_images, is_supported_image, CollectError, SUPPORTED_EXTENSIONS};
pub use config::RunConfig;
pub use load::{load_image, LoadError, LoadedImage};
pub use pipeline::{ExtractionRunner, PipelineError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, TesseractCli};
pub use report::{render_full_text, render_summary, write_reports, ReportError, ReportPaths};
#[cfg(feature = "openai")]
pub use vision::OpenAiVisionRecognizer;
