use anyhow::{bail, Context, Result};

use imgscribe_ocr::{OcrBackend, TesseractCli};

use crate::settings::{EngineKind, Settings};

/// Build the configured OCR backend. Nothing is contacted yet; see [`check`].
pub fn build(settings: &Settings) -> Result<Box<dyn OcrBackend>> {
    match settings.engine {
        EngineKind::TesseractCli => Ok(Box::new(tesseract_cli(settings))),
        EngineKind::Tesseract => build_linked_tesseract(settings),
        EngineKind::Openai => build_openai(settings),
    }
}

fn tesseract_cli(settings: &Settings) -> TesseractCli {
    let section = &settings.tesseract;
    let defaults = TesseractCli::default();
    TesseractCli {
        binary: section.binary.clone().unwrap_or(defaults.binary),
        lang: section.lang.clone().unwrap_or(defaults.lang),
        tessdata_dir: section.tessdata_dir.clone(),
        psm: section.psm,
    }
}

#[cfg(feature = "tesseract")]
fn linked_tesseract(
    settings: &Settings,
) -> imgscribe_ocr::recognizer::tesseract_backend::TesseractRecognizer {
    use imgscribe_ocr::recognizer::tesseract_backend::TesseractRecognizer;

    let section = &settings.tesseract;
    let data_path = section.tessdata_dir.as_ref().map(|p| p.display().to_string());
    let lang = section.lang.as_deref().unwrap_or("eng");
    TesseractRecognizer::new(data_path, lang)
}

#[cfg(feature = "tesseract")]
fn build_linked_tesseract(settings: &Settings) -> Result<Box<dyn OcrBackend>> {
    Ok(Box::new(linked_tesseract(settings)))
}

#[cfg(not(feature = "tesseract"))]
fn build_linked_tesseract(_settings: &Settings) -> Result<Box<dyn OcrBackend>> {
    bail!("engine `tesseract` is unavailable: rebuild with `--features tesseract`")
}

#[cfg(feature = "tesseract")]
async fn check_linked_tesseract(settings: &Settings) -> Result<()> {
    let recognizer = linked_tesseract(settings);
    tokio::task::spawn_blocking(move || recognizer.check_available())
        .await?
        .context("libtesseract could not be initialised")?;
    Ok(())
}

#[cfg(not(feature = "tesseract"))]
async fn check_linked_tesseract(settings: &Settings) -> Result<()> {
    build_linked_tesseract(settings).map(|_| ())
}

#[cfg(feature = "openai")]
fn build_openai(settings: &Settings) -> Result<Box<dyn OcrBackend>> {
    use imgscribe_ocr::OpenAiVisionRecognizer;

    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; it is required for the `openai` engine")?;
    if api_key.trim().is_empty() {
        bail!("OPENAI_API_KEY is empty");
    }

    let section = &settings.openai;
    let mut recognizer = OpenAiVisionRecognizer::new(api_key);
    if let Some(model) = &section.model {
        recognizer.model = model.clone();
    }
    if let Some(base_url) = &section.base_url {
        recognizer.base_url = base_url.clone();
    }
    if let Some(prompt) = &section.prompt {
        recognizer.prompt = prompt.clone();
    }
    if let Some(max_tokens) = section.max_tokens {
        recognizer.max_tokens = max_tokens;
    }
    Ok(Box::new(recognizer))
}

#[cfg(not(feature = "openai"))]
fn build_openai(_settings: &Settings) -> Result<Box<dyn OcrBackend>> {
    bail!("engine `openai` is unavailable: rebuild with `--features openai`")
}

/// Verify the engine is reachable before any file is handed to it.
pub async fn check(settings: &Settings) -> Result<()> {
    match settings.engine {
        EngineKind::TesseractCli => {
            let cli = tesseract_cli(settings);
            let version = tokio::task::spawn_blocking(move || cli.version())
                .await?
                .context("tesseract executable could not be started")?;
            tracing::info!("Using {version}");
        }
        EngineKind::Tesseract => check_linked_tesseract(settings).await?,
        EngineKind::Openai => check_openai(settings).await?,
    }
    Ok(())
}

#[cfg(feature = "openai")]
async fn check_openai(settings: &Settings) -> Result<()> {
    use imgscribe_ocr::OpenAiVisionRecognizer;

    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
    let mut recognizer = OpenAiVisionRecognizer::new(api_key);
    if let Some(base_url) = &settings.openai.base_url {
        recognizer.base_url = base_url.clone();
    }
    tokio::task::spawn_blocking(move || recognizer.check_connection())
        .await?
        .context("failed to connect to the vision API")?;
    tracing::info!("Connected to vision API");
    Ok(())
}

#[cfg(not(feature = "openai"))]
async fn check_openai(_settings: &Settings) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{FileConfig, TesseractSection};
    use std::path::PathBuf;

    fn settings(engine: EngineKind, tesseract: TesseractSection) -> Settings {
        let file = FileConfig { engine: Some(engine), tesseract, ..Default::default() };
        let cli = <crate::settings::Cli as clap::Parser>::try_parse_from(["imgscribe"]).unwrap();
        Settings::resolve(cli, file)
    }

    #[test]
    fn tesseract_cli_is_default_engine() {
        let backend = build(&settings(EngineKind::TesseractCli, TesseractSection::default())).unwrap();
        assert_eq!(backend.name(), "tesseract-cli");
    }

    #[test]
    fn tesseract_cli_takes_section_values() {
        let section = TesseractSection {
            binary: Some(PathBuf::from("/opt/bin/tesseract")),
            lang: Some("spa".into()),
            tessdata_dir: None,
            psm: Some(4),
        };
        let cli = tesseract_cli(&settings(EngineKind::TesseractCli, section));
        assert_eq!(cli.binary, PathBuf::from("/opt/bin/tesseract"));
        assert_eq!(cli.lang, "spa");
        assert_eq!(cli.psm, Some(4));
    }

    #[cfg(not(feature = "openai"))]
    #[test]
    fn openai_without_feature_is_an_error() {
        assert!(build(&settings(EngineKind::Openai, TesseractSection::default())).is_err());
    }

    #[cfg(not(feature = "tesseract"))]
    #[tokio::test]
    async fn check_rejects_linked_tesseract_without_feature() {
        let err = check(&settings(EngineKind::Tesseract, TesseractSection::default()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--features tesseract"));
    }

    #[cfg(feature = "tesseract")]
    #[tokio::test]
    async fn check_fails_for_unknown_language() {
        let section = TesseractSection {
            lang: Some("no-such-language".into()),
            ..Default::default()
        };
        assert!(check(&settings(EngineKind::Tesseract, section)).await.is_err());
    }

    #[tokio::test]
    async fn check_fails_for_missing_binary() {
        let section = TesseractSection {
            binary: Some(PathBuf::from("/nonexistent/imgscribe-test/tesseract")),
            ..Default::default()
        };
        assert!(check(&settings(EngineKind::TesseractCli, section)).await.is_err());
    }
}
