use std::cell::RefCell;

use super::*;

#[derive(Default)]
struct FakeClipboard {
    fail_html: bool,
    fail_text: bool,
    html: Option<(String, String)>,
    text: Option<String>,
}

impl ClipboardSink for FakeClipboard {
    fn set_html(&mut self, html: &str, alt_text: &str) -> Result<(), ExportError> {
        if self.fail_html {
            return Err(ExportError::Clipboard("html rejected".into()));
        }
        self.html = Some((html.into(), alt_text.into()));
        Ok(())
    }

    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        if self.fail_text {
            return Err(ExportError::Clipboard("no display".into()));
        }
        self.text = Some(text.into());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingOpener {
    fail: bool,
    opened: RefCell<Vec<String>>,
}

impl DestinationOpener for RecordingOpener {
    fn open(&self, target: &str) -> Result<(), ExportError> {
        self.opened.borrow_mut().push(target.to_string());
        if self.fail {
            return Err(ExportError::Open {
                target: target.into(),
                reason: "no browser".into(),
            });
        }
        Ok(())
    }
}

fn sample_document() -> RenderedDocument {
    RenderedDocument {
        html: "<div class=\"rpm-document\"><table><tr><td>1. IDENTITAS</td></tr></table></div>".into(),
        text: "1. IDENTITAS".into(),
    }
}

fn config_in(dir: &Path) -> ExportConfig {
    ExportConfig {
        destination_url: Some("https://docs.new".into()),
        ..ExportConfig::new(dir)
    }
}

#[test]
fn rich_text_copy_opens_destination_afterwards() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut clipboard = FakeClipboard::default();
    let opener = RecordingOpener::default();
    let doc = sample_document();

    let report = copy_and_open(&doc, &config_in(dir.path()), &mut clipboard, &opener);

    assert_eq!(
        report.outcome,
        ExportOutcome::Delivered {
            strategy: ExportStrategy::RichText,
            file: None
        }
    );
    assert!(report.copied());
    assert_eq!(report.message, MESSAGE_COPIED);
    assert_eq!(clipboard.html, Some((doc.html.clone(), doc.text.clone())));
    assert_eq!(*opener.opened.borrow(), vec!["https://docs.new".to_string()]);
}

#[test]
fn failing_rich_clipboard_falls_back_to_plain_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut clipboard = FakeClipboard {
        fail_html: true,
        ..FakeClipboard::default()
    };
    let opener = RecordingOpener::default();

    let report = copy_and_open(
        &sample_document(),
        &config_in(dir.path()),
        &mut clipboard,
        &opener,
    );

    assert_eq!(report.attempts.len(), 2);
    assert_eq!(report.attempts[0].strategy, ExportStrategy::RichText);
    assert_eq!(
        report.attempts[0].error.as_deref(),
        Some("clipboard unavailable: html rejected")
    );
    assert_eq!(report.attempts[1].error, None);
    assert_eq!(clipboard.text.as_deref(), Some("1. IDENTITAS"));
    assert_eq!(report.message, MESSAGE_COPIED);
}

#[test]
fn unusable_clipboard_leaves_a_file_for_manual_copy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut clipboard = FakeClipboard {
        fail_html: true,
        fail_text: true,
        ..FakeClipboard::default()
    };
    let opener = RecordingOpener::default();

    let report = copy_and_open(
        &sample_document(),
        &config_in(dir.path()),
        &mut clipboard,
        &opener,
    );

    let expected = dir.path().join(MANUAL_COPY_FILE);
    assert_eq!(
        report.outcome,
        ExportOutcome::Delivered {
            strategy: ExportStrategy::ManualFile,
            file: Some(expected.clone())
        }
    );
    assert!(!report.copied());
    assert!(report.message.starts_with(MESSAGE_MANUAL_COPY));
    let page = fs::read_to_string(&expected).expect("manual page");
    assert!(page.contains("1. IDENTITAS"));
    assert!(opener.opened.borrow().is_empty());
}

#[test]
fn every_strategy_failing_is_reported_not_raised() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "x").expect("write");
    let mut clipboard = FakeClipboard {
        fail_html: true,
        fail_text: true,
        ..FakeClipboard::default()
    };

    let report = copy_and_open(
        &sample_document(),
        &config_in(&blocker),
        &mut clipboard,
        &RecordingOpener::default(),
    );

    assert_eq!(report.attempts.len(), 3);
    assert!(matches!(report.outcome, ExportOutcome::Failed { .. }));
    assert_eq!(report.message, MESSAGE_EXPORT_FAILED);
    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["outcome"]["status"], "failed");
}

#[test]
fn before_copy_order_opens_first_and_reports_open_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut clipboard = FakeClipboard {
        fail_html: true,
        fail_text: true,
        ..FakeClipboard::default()
    };
    let opener = RecordingOpener {
        fail: true,
        ..RecordingOpener::default()
    };
    let config = ExportConfig {
        open_order: OpenOrder::BeforeCopy,
        ..config_in(dir.path())
    };

    let report = copy_and_open(&sample_document(), &config, &mut clipboard, &opener);

    assert_eq!(opener.opened.borrow().len(), 1);
    assert_eq!(
        report.open_error.as_deref(),
        Some("failed to open https://docs.new: no browser")
    );
    assert!(matches!(
        report.outcome,
        ExportOutcome::Delivered {
            strategy: ExportStrategy::ManualFile,
            ..
        }
    ));
}

#[test]
fn empty_strategy_list_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ExportConfig {
        strategies: Vec::new(),
        ..config_in(dir.path())
    };
    let report = copy_and_open(
        &sample_document(),
        &config,
        &mut FakeClipboard::default(),
        &RecordingOpener::default(),
    );
    assert_eq!(
        report.outcome,
        ExportOutcome::Failed {
            reason: "no export strategy configured".into()
        }
    );
}

#[test]
fn print_writes_print_page_and_opens_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let opener = RecordingOpener::default();

    let path = print(&sample_document(), dir.path(), &opener).expect("print");

    assert_eq!(path, dir.path().join(PRINT_FILE));
    let page = fs::read_to_string(&path).expect("page");
    assert!(page.contains("window.print()"));
    assert!(page.contains("@media print"));
    assert_eq!(
        *opener.opened.borrow(),
        vec![path.to_string_lossy().into_owned()]
    );
}
