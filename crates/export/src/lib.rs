//! Export actions for a rendered RPM: clipboard copy with ordered fallbacks,
//! opening the destination document, and printing.

use std::{
    fs,
    path::{Path, PathBuf},
};

use document::{render_page, PageMode, RenderedDocument};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

mod system;

pub use system::{default_output_dir, SystemClipboard, SystemOpener};

pub const MESSAGE_COPIED: &str =
    "Berhasil menyalin konten! Silakan tempel (Ctrl+V) di Google Dokumen yang akan terbuka.";
pub const MESSAGE_MANUAL_COPY: &str =
    "Gagal menyalin otomatis. Harap pilih dan salin manual tabelnya.";
pub const MESSAGE_EXPORT_FAILED: &str =
    "Gagal mengekspor dokumen. Silakan cetak atau salin secara manual.";

pub const MANUAL_COPY_FILE: &str = "rpm-salin-manual.html";
pub const PRINT_FILE: &str = "rpm-cetak.html";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open {target}: {reason}")]
    Open { target: String, reason: String },
}

/// Destination for copied documents. The rich variant carries HTML with a
/// plain-text alternative for targets that cannot take markup.
pub trait ClipboardSink {
    fn set_html(&mut self, html: &str, alt_text: &str) -> Result<(), ExportError>;
    fn set_text(&mut self, text: &str) -> Result<(), ExportError>;
}

pub trait DestinationOpener {
    /// Opens a URL or local file with the platform handler.
    fn open(&self, target: &str) -> Result<(), ExportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStrategy {
    RichText,
    PlainText,
    /// Writes the page to disk for manual selection and copy.
    ManualFile,
}

pub const DEFAULT_STRATEGIES: [ExportStrategy; 3] = [
    ExportStrategy::RichText,
    ExportStrategy::PlainText,
    ExportStrategy::ManualFile,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenOrder {
    BeforeCopy,
    #[default]
    AfterCopy,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub strategies: Vec<ExportStrategy>,
    pub open_order: OpenOrder,
    /// `None` skips opening a destination document.
    pub destination_url: Option<String>,
    pub output_dir: PathBuf,
}

impl ExportConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            strategies: DEFAULT_STRATEGIES.to_vec(),
            open_order: OpenOrder::default(),
            destination_url: None,
            output_dir: output_dir.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    Delivered {
        strategy: ExportStrategy,
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<PathBuf>,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub strategy: ExportStrategy,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub outcome: ExportOutcome,
    pub attempts: Vec<Attempt>,
    /// Notification shown to the user.
    pub message: String,
    /// Error from opening the destination, if that was attempted and failed.
    pub open_error: Option<String>,
}

impl ExportReport {
    pub fn copied(&self) -> bool {
        matches!(
            self.outcome,
            ExportOutcome::Delivered {
                strategy: ExportStrategy::RichText | ExportStrategy::PlainText,
                ..
            }
        )
    }
}

fn write_page(dir: &Path, name: &str, page: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(name);
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, page))
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

fn try_strategy(
    strategy: ExportStrategy,
    document: &RenderedDocument,
    config: &ExportConfig,
    clipboard: &mut dyn ClipboardSink,
) -> Result<Option<PathBuf>, ExportError> {
    match strategy {
        ExportStrategy::RichText => clipboard.set_html(&document.html, &document.text).map(|_| None),
        ExportStrategy::PlainText => clipboard.set_text(&document.text).map(|_| None),
        ExportStrategy::ManualFile => {
            let page = render_page(document, PageMode::Screen);
            write_page(&config.output_dir, MANUAL_COPY_FILE, &page).map(Some)
        }
    }
}

fn open_destination(config: &ExportConfig, opener: &dyn DestinationOpener) -> Option<String> {
    let url = config.destination_url.as_deref()?;
    match opener.open(url) {
        Ok(()) => None,
        Err(err) => {
            warn!(error = %err, "failed to open destination document");
            Some(err.to_string())
        }
    }
}

/// Copies `document` using the first strategy that works and opens the
/// destination document, either up front or after a successful copy.
/// Never fails; problems land in the report.
pub fn copy_and_open(
    document: &RenderedDocument,
    config: &ExportConfig,
    clipboard: &mut dyn ClipboardSink,
    opener: &dyn DestinationOpener,
) -> ExportReport {
    let open_error = match config.open_order {
        OpenOrder::BeforeCopy => open_destination(config, opener),
        OpenOrder::AfterCopy => None,
    };

    let mut attempts = Vec::with_capacity(config.strategies.len());
    let mut outcome = None;
    for &strategy in &config.strategies {
        match try_strategy(strategy, document, config, clipboard) {
            Ok(file) => {
                info!(?strategy, "document exported");
                attempts.push(Attempt {
                    strategy,
                    error: None,
                });
                outcome = Some(ExportOutcome::Delivered { strategy, file });
                break;
            }
            Err(err) => {
                warn!(?strategy, error = %err, "export strategy failed");
                attempts.push(Attempt {
                    strategy,
                    error: Some(err.to_string()),
                });
            }
        }
    }
    let outcome = outcome.unwrap_or_else(|| ExportOutcome::Failed {
        reason: attempts
            .last()
            .and_then(|a| a.error.clone())
            .unwrap_or_else(|| "no export strategy configured".to_string()),
    });

    let message = match &outcome {
        ExportOutcome::Delivered {
            strategy: ExportStrategy::ManualFile,
            file,
        } => match file {
            Some(path) => format!(
                "{MESSAGE_MANUAL_COPY} Dokumen tersimpan di {}",
                path.display()
            ),
            None => MESSAGE_MANUAL_COPY.to_string(),
        },
        ExportOutcome::Delivered { .. } => MESSAGE_COPIED.to_string(),
        ExportOutcome::Failed { .. } => MESSAGE_EXPORT_FAILED.to_string(),
    };

    let mut report = ExportReport {
        outcome,
        attempts,
        message,
        open_error,
    };
    // Pasting needs clipboard content, so the destination only follows a copy.
    if config.open_order == OpenOrder::AfterCopy && report.copied() {
        report.open_error = open_destination(config, opener);
    }
    report
}

/// Writes the print variant of the page and hands it to the opener, which
/// brings up the platform print dialog once loaded.
pub fn print(
    document: &RenderedDocument,
    output_dir: &Path,
    opener: &dyn DestinationOpener,
) -> Result<PathBuf, ExportError> {
    let page = render_page(document, PageMode::Print);
    let path = write_page(output_dir, PRINT_FILE, &page)?;
    opener.open(&path.to_string_lossy())?;
    info!(path = %path.display(), "print page opened");
    Ok(path)
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
