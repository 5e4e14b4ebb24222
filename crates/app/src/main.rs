use anyhow::{Context, Result};
use clap::Parser;

use imgscribe_core::ExtractionSession;
use imgscribe_ocr::{collect_images, write_reports, ExtractionRunner, ReportPaths};

mod engine;
mod settings;

use settings::{Cli, FileConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli, file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    run(&settings).await?;
    Ok(())
}

/// One complete run: collect, extract, report.
///
/// Per-file failures end up in the reports; only a missing input directory,
/// an unusable engine or an unwritable output directory is an error here.
async fn run(settings: &Settings) -> Result<ReportPaths> {
    let config = settings.run_config();

    let paths = collect_images(&config.input_dir)?;
    let session = if paths.is_empty() {
        // No engine is built for an empty run, so none needs to be installed.
        tracing::warn!(
            "No image files found in {}; nothing to process",
            config.input_dir.display()
        );
        ExtractionSession::new(config.started_at, settings.engine.name())
    } else {
        tracing::info!(
            "Processing {} images from {}",
            paths.len(),
            config.input_dir.display()
        );
        engine::check(settings).await?;
        let runner = ExtractionRunner::new(engine::build(settings)?);
        runner.run(paths, &config).await
    };

    let reports = write_reports(&session, &config).with_context(|| {
        format!(
            "results of {} processed images were not saved",
            session.total()
        )
    })?;

    tracing::info!("Results saved to: {}", reports.full_text.display());
    tracing::info!("Summary saved to: {}", reports.summary.display());
    Ok(reports)
}
