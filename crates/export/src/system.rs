use std::{path::PathBuf, process::Command};

use arboard::Clipboard;
use tracing::debug;

use crate::{ClipboardSink, DestinationOpener, ExportError};

/// The desktop clipboard.
pub struct SystemClipboard {
    inner: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ExportError> {
        let inner = Clipboard::new().map_err(|err| ExportError::Clipboard(err.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_html(&mut self, html: &str, alt_text: &str) -> Result<(), ExportError> {
        self.inner
            .set_html(html, Some(alt_text))
            .map_err(|err| ExportError::Clipboard(err.to_string()))
    }

    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        self.inner
            .set_text(text)
            .map_err(|err| ExportError::Clipboard(err.to_string()))
    }
}

/// Hands targets to the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(target: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", target]);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(target);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(target);
            cmd
        }
    }
}

impl DestinationOpener for SystemOpener {
    fn open(&self, target: &str) -> Result<(), ExportError> {
        debug!(destination = target, "opening with platform handler");
        let status = Self::command(target)
            .status()
            .map_err(|err| ExportError::Open {
                target: target.to_string(),
                reason: err.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ExportError::Open {
                target: target.to_string(),
                reason: format!("handler exited with {status}"),
            })
        }
    }
}

/// Where exported pages land when the caller does not pick a directory.
pub fn default_output_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rpm")
}
