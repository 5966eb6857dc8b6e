use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use document::{render, render_page, PageMode, RenderOptions, RenderedDocument};
use export::{
    copy_and_open, default_output_dir, ClipboardSink, ExportConfig, ExportError, OpenOrder,
    SystemClipboard, SystemOpener,
};
use generation::GeminiClient;
use planner::{load_settings, Settings};
use shared::{domain::PromptProfile, protocol::Effect};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod form_file;

use form_file::{ensure_submittable, load_form, load_result, store_from_form, template};

#[derive(Parser, Debug)]
#[command(name = "rpm", about = "Generate Perencanaan Pembelajaran Mendalam documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the planner from a form file and generate a lesson plan.
    Generate {
        #[arg(long)]
        form: PathBuf,
        /// HTML page to write.
        #[arg(long, default_value = "rpm.html")]
        out: PathBuf,
        /// Also save the validated result as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
        /// Override the configured prompt profile (`standard` or `deep`).
        #[arg(long)]
        profile: Option<String>,
        /// Copy the document to the clipboard.
        #[arg(long)]
        copy: bool,
        /// Open a new destination document for pasting.
        #[arg(long)]
        open_docs: bool,
        /// Open the destination before copying instead of after.
        #[arg(long)]
        open_first: bool,
        /// Open the print page in the platform handler.
        #[arg(long)]
        print: bool,
    },
    /// Render a saved result without calling the generation service.
    Render {
        #[arg(long)]
        form: PathBuf,
        #[arg(long)]
        result: PathBuf,
        #[arg(long, default_value = "rpm.html")]
        out: PathBuf,
    },
    /// Print a sample form file.
    Template,
}

/// Stand-in sink when no system clipboard can be opened, so the export falls
/// through to the manual-copy strategy.
struct UnavailableClipboard(String);

impl ClipboardSink for UnavailableClipboard {
    fn set_html(&mut self, _html: &str, _alt_text: &str) -> Result<(), ExportError> {
        Err(ExportError::Clipboard(self.0.clone()))
    }

    fn set_text(&mut self, _text: &str) -> Result<(), ExportError> {
        Err(ExportError::Clipboard(self.0.clone()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let settings = load_settings();
    debug!(?settings, "settings loaded");

    match cli.command {
        Command::Template => {
            print!("{}", template()?);
            Ok(())
        }
        Command::Render { form, result, out } => {
            let form = load_form(&form)?;
            let store = store_from_form(&form, settings.controller_config())?;
            let rpm = load_result(&result)?;
            let document = render(store.form(), &rpm, &RenderOptions::today(&settings.signature_place));
            write_page(&out, &document)
        }
        Command::Generate {
            form,
            out,
            json,
            profile,
            copy,
            open_docs,
            open_first,
            print,
        } => {
            let mut config = settings.controller_config();
            if let Some(name) = profile {
                config.profile = PromptProfile::from_name(&name)
                    .with_context(|| format!("unknown prompt profile '{name}'"))?;
            }
            let form = load_form(&form)?;
            let mut store = store_from_form(&form, config)?;
            ensure_submittable(&store)?;

            let backend = GeminiClient::new(settings.gemini_config()?);
            info!(profile = ?config.profile, meetings = store.form().meeting_count, "requesting lesson plan");
            for effect in store.generate(&backend).await? {
                match effect {
                    Effect::Alert { message } => bail!("{message}"),
                    Effect::RevealOutput { .. } => {}
                }
            }
            let (planned, rpm) = store
                .result_form()
                .zip(store.result())
                .context("generation finished without a lesson plan")?;

            if let Some(path) = json {
                let raw = serde_json::to_string_pretty(rpm)?;
                fs::write(&path, raw)
                    .with_context(|| format!("failed to write '{}'", path.display()))?;
                info!(path = %path.display(), "result saved");
            }

            let options = RenderOptions::today(&settings.signature_place);
            let document = render(planned, rpm, &options);
            write_page(&out, &document)?;

            let output_dir = out
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(default_output_dir);
            if copy {
                let styled = render(planned, rpm, &options.clone().with_inline_styles(true));
                copy_document(&styled, &settings, &output_dir, open_docs, open_first);
            }
            if print {
                let path = export::print(&document, &output_dir, &SystemOpener)?;
                println!("Halaman cetak dibuka: {}", path.display());
            }
            Ok(())
        }
    }
}

fn write_page(out: &Path, document: &RenderedDocument) -> Result<()> {
    fs::write(out, render_page(document, PageMode::Screen))
        .with_context(|| format!("failed to write '{}'", out.display()))?;
    info!(path = %out.display(), "document written");
    println!("Dokumen RPM tersimpan: {}", out.display());
    Ok(())
}

fn copy_document(
    document: &RenderedDocument,
    settings: &Settings,
    output_dir: &Path,
    open_docs: bool,
    open_first: bool,
) {
    let config = ExportConfig {
        open_order: if open_first {
            OpenOrder::BeforeCopy
        } else {
            OpenOrder::AfterCopy
        },
        destination_url: open_docs.then(|| settings.destination_url.clone()),
        ..ExportConfig::new(output_dir)
    };
    let report = match SystemClipboard::new() {
        Ok(mut clipboard) => copy_and_open(document, &config, &mut clipboard, &SystemOpener),
        Err(err) => {
            warn!(error = %err, "system clipboard unavailable");
            let mut clipboard = UnavailableClipboard(err.to_string());
            copy_and_open(document, &config, &mut clipboard, &SystemOpener)
        }
    };
    println!("{}", report.message);
    if let Some(err) = &report.open_error {
        eprintln!("Tidak dapat membuka dokumen tujuan: {err}");
    }
}
