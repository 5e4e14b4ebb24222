use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use imgscribe_ocr::config::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PREVIEW_CHARS};
use imgscribe_ocr::RunConfig;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "imgscribe.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// The `tesseract` executable on PATH
    #[default]
    TesseractCli,
    /// Linked libtesseract (needs the `tesseract` build feature)
    Tesseract,
    /// OpenAI-compatible vision model (needs the `openai` build feature)
    Openai,
}

impl EngineKind {
    /// Same identifier the backend reports through `OcrBackend::name`.
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::TesseractCli => "tesseract-cli",
            EngineKind::Tesseract => "tesseract",
            EngineKind::Openai => "openai",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "imgscribe")]
#[command(about = "Extract text from a directory of images with OCR")]
#[command(version)]
pub struct Cli {
    /// Directory containing the images to process
    #[arg(short, long, env = "IMGSCRIBE_INPUT_DIR")]
    pub input: Option<PathBuf>,

    /// Directory the reports are written to (created if missing)
    #[arg(short, long, env = "IMGSCRIBE_OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "IMGSCRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// OCR engine
    #[arg(short, long, value_enum, env = "IMGSCRIBE_ENGINE")]
    pub engine: Option<EngineKind>,

    /// Tesseract language(s), e.g. `eng` or `deu+eng`
    #[arg(short, long, env = "IMGSCRIBE_LANG")]
    pub lang: Option<String>,

    /// Characters of text shown per file in the summary
    #[arg(long)]
    pub preview_chars: Option<usize>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TesseractSection {
    pub binary: Option<PathBuf>,
    pub lang: Option<String>,
    pub tessdata_dir: Option<PathBuf>,
    pub psm: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAiSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub prompt: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Contents of `imgscribe.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub engine: Option<EngineKind>,
    pub preview_chars: Option<usize>,
    pub log_level: Option<String>,
    pub tesseract: TesseractSection,
    pub openai: OpenAiSection,
}

impl FileConfig {
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given (it must exist), otherwise the default file
    /// if present, otherwise an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&path, &contents)
    }
}

/// Fully resolved settings: CLI and env first, then the config file, then
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub engine: EngineKind,
    pub preview_chars: usize,
    pub log_level: String,
    pub tesseract: TesseractSection,
    pub openai: OpenAiSection,
}

impl Settings {
    pub fn resolve(cli: Cli, file: FileConfig) -> Self {
        let mut tesseract = file.tesseract;
        if cli.lang.is_some() {
            tesseract.lang = cli.lang;
        }
        Self {
            input_dir: cli
                .input
                .or(file.input_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            output_dir: cli
                .output
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            engine: cli.engine.or(file.engine).unwrap_or_default(),
            preview_chars: cli
                .preview_chars
                .or(file.preview_chars)
                .unwrap_or(DEFAULT_PREVIEW_CHARS),
            log_level: cli
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            tesseract,
            openai: file.openai,
        }
    }

    /// Capture the run's start time and freeze the paths.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(&self.input_dir, &self.output_dir).with_preview_chars(self.preview_chars)
    }
}
