//! Output module for rendering crawl reports
//!
//! This module handles:
//! - Rendering a [`CrawlReport`] as a plain-text table or a Markdown report
//! - Writing the rendered report to stdout or a file

mod markdown;
mod text;

pub use markdown::render_markdown;
pub use text::render_text;

use crate::crawler::CrawlReport;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Report formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain-text table
    #[default]
    Text,

    /// Markdown report
    Markdown,
}

/// Renders a report in the given format
pub fn render(report: &CrawlReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Markdown => render_markdown(report),
    }
}

/// Writes rendered output to `path`, or to stdout when no path is given
pub fn write_report(content: &str, path: Option<&Path>) -> OutputResult<()> {
    match path {
        Some(path) => std::fs::write(path, content).map_err(|source| OutputError::Write {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
