use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use imgscribe_core::{preview, ExtractionSession};

use crate::config::RunConfig;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the two reports of a run ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub full_text: PathBuf,
    pub summary: PathBuf,
}

/// Every record in collection order. Failed records keep their numbered
/// section, with a placeholder in place of the text.
pub fn render_full_text(session: &ExtractionSession) -> String {
    let mut out = String::new();
    write_full_text(&mut out, session).expect("formatting into a String cannot fail");
    out
}

/// Run totals followed by one entry per record.
pub fn render_summary(session: &ExtractionSession, preview_chars: usize) -> String {
    let mut out = String::new();
    write_summary(&mut out, session, preview_chars)
        .expect("formatting into a String cannot fail");
    out
}

fn write_full_text(out: &mut impl fmt::Write, session: &ExtractionSession) -> fmt::Result {
    let heavy = "=".repeat(80);
    let light = "-".repeat(60);

    writeln!(out, "{heavy}")?;
    writeln!(out, "TEXT EXTRACTION FROM IMAGES")?;
    writeln!(out, "{heavy}")?;
    writeln!(out, "Extraction Date: {}", session.started_at().format(DATE_FORMAT))?;
    writeln!(out, "Engine: {}", session.engine())?;
    writeln!(out, "Total Images Processed: {}", session.total())?;
    writeln!(out, "{heavy}")?;
    writeln!(out)?;

    for (i, record) in session.records().iter().enumerate() {
        writeln!(out, "IMAGE {}: {}", i + 1, record.file_name())?;
        writeln!(out, "{light}")?;
        match record.error_message() {
            None => out.write_str(record.recognized_text())?,
            Some(err) => write!(out, "[extraction failed: {err}]")?,
        }
        write!(out, "\n\n{heavy}\n\n")?;
    }
    Ok(())
}

fn write_summary(
    out: &mut impl fmt::Write,
    session: &ExtractionSession,
    preview_chars: usize,
) -> fmt::Result {
    writeln!(out, "EXTRACTION SUMMARY")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out, "Date: {}", session.started_at().format(DATE_FORMAT))?;
    writeln!(out, "Engine: {}", session.engine())?;
    writeln!(
        out,
        "Total: {}, Success: {}, Failed: {}",
        session.total(),
        session.successes(),
        session.failures()
    )?;
    writeln!(out)?;

    for (i, record) in session.records().iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, record.file_name())?;
        writeln!(out, "   Status: {}", record.status())?;
        match record.error_message() {
            None => {
                writeln!(
                    out,
                    "   Words: {}, Characters: {}",
                    record.word_count(),
                    record.char_count()
                )?;
                writeln!(
                    out,
                    "   Preview: {}",
                    preview(record.recognized_text(), preview_chars)
                )?;
            }
            Some(err) => writeln!(out, "   Error: {err}")?,
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write both reports into `config.output_dir`, creating it if needed.
pub fn write_reports(
    session: &ExtractionSession,
    config: &RunConfig,
) -> Result<ReportPaths, ReportError> {
    std::fs::create_dir_all(&config.output_dir).map_err(|source| ReportError::OutputWrite {
        path: config.output_dir.clone(),
        source,
    })?;

    let paths = ReportPaths {
        full_text: config.full_text_path(),
        summary: config.summary_path(),
    };
    write_file(&paths.full_text, &render_full_text(session))?;
    write_file(&paths.summary, &render_summary(session, config.preview_chars))?;

    tracing::info!(
        full_text = %paths.full_text.display(),
        summary = %paths.summary.display(),
        "reports written"
    );
    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|source| ReportError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
