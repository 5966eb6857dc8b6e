use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::{Cell, DocumentModel, RenderedDocument, Row, DOCUMENT_TITLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Screen,
    /// Opens the platform print dialog once the page has loaded.
    Print,
}

/// Inline declarations used when the markup leaves this page, keyed by the
/// class each one mirrors in [`CSS`].
struct Inline(bool);

impl Inline {
    fn get(&self, declarations: &'static str) -> Option<&'static str> {
        self.0.then_some(declarations)
    }
}

const TABLE: &str = "width:100%;border-collapse:collapse;border:1px solid #000;font-size:13px;line-height:1.5;";
const SECTION: &str = "background:#f3f4f6;font-weight:bold;border:1px solid #000;padding:8px 16px;text-transform:uppercase;";
const LABEL: &str = "width:30%;border:1px solid #000;padding:12px;font-weight:600;vertical-align:top;";
const VALUE: &str = "border:1px solid #000;padding:12px;white-space:pre-wrap;vertical-align:top;";
const MEETING: &str = "border:1px solid #000;padding:8px;font-weight:bold;background:#eef2ff;";
const HEADER: &str = "text-align:center;margin-bottom:40px;border-bottom:3px double #000;padding-bottom:16px;";
const SIGNATURES: &str = "display:flex;justify-content:space-around;margin-top:80px;text-align:center;font-size:14px;";
const SIGNATURE: &str = "width:45%;";
const SIGNER: &str = "margin-top:96px;font-weight:bold;text-decoration:underline;text-transform:uppercase;";

pub(crate) fn document(model: &DocumentModel, inline_styles: bool) -> Markup {
    let s = Inline(inline_styles);
    let sig = &model.signatures;
    html! {
        div.rpm-document {
            div.rpm-header style=[s.get(HEADER)] {
                h1 { (DOCUMENT_TITLE) }
                p.rpm-school { (model.school) }
            }
            table.rpm-table style=[s.get(TABLE)] {
                tbody {
                    @for section in &model.sections {
                        tr {
                            td.rpm-section colspan="2" style=[s.get(SECTION)] { (section.title) }
                        }
                        @for row in &section.rows {
                            (render_row(row, &s))
                        }
                    }
                }
            }
            div.rpm-signatures style=[s.get(SIGNATURES)] {
                div.rpm-signature style=[s.get(SIGNATURE)] {
                    p { "Mengetahui," }
                    p { strong { "Kepala " (sig.school) } }
                    p.rpm-signer style=[s.get(SIGNER)] { (sig.principal_name) }
                    p { "NIP. " (sig.principal_nip) }
                }
                div.rpm-signature style=[s.get(SIGNATURE)] {
                    p { (sig.place_and_date) }
                    p { strong { "Guru Mata Pelajaran" } }
                    p.rpm-signer style=[s.get(SIGNER)] { (sig.teacher_name) }
                    p { "NIP. " (sig.teacher_nip) }
                }
            }
        }
    }
}

fn render_row(row: &Row, s: &Inline) -> Markup {
    match row {
        Row::Field { label, value } => html! {
            tr {
                td.rpm-label style=[s.get(LABEL)] { (label) }
                td.rpm-value style=[s.get(VALUE)] {
                    @match value {
                        Cell::Text(text) => (text),
                        Cell::List(items) => {
                            ol {
                                @for item in items {
                                    li { (item) }
                                }
                            }
                        }
                    }
                }
            }
        },
        Row::MeetingHeader { number, practice } => html! {
            tr.rpm-meeting data-meeting=(number) {
                td style=[s.get(MEETING)] { "Pertemuan " (number) }
                td style=[s.get(MEETING)] { (practice) }
            }
        },
    }
}

/// Wraps a rendered document into a standalone page. The toolbar carries the
/// `no-print` class and never reaches paper.
pub fn render_page(document: &RenderedDocument, mode: PageMode) -> String {
    let page = html! {
        (DOCTYPE)
        html lang="id" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (DOCUMENT_TITLE) }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.toolbar.no-print {
                    h2 { "DOKUMEN RPM BERHASIL DISUSUN" }
                    button type="button" onclick="window.print()" { "Cetak PDF" }
                }
                main.page {
                    (PreEscaped(&document.html))
                }
                @if mode == PageMode::Print {
                    script { (PreEscaped(PRINT_ON_LOAD)) }
                }
            }
        }
    };
    page.into_string()
}

const PRINT_ON_LOAD: &str = "window.addEventListener('load', function () { window.print(); });";

const CSS: &str = r#"
body {
    font-family: 'Times New Roman', serif;
    background: #e5e7eb;
    margin: 0;
    color: #000;
}

.toolbar {
    display: flex;
    justify-content: space-between;
    align-items: center;
    background: #111827;
    color: #fff;
    padding: 16px 24px;
}

.toolbar h2 {
    font-size: 16px;
    letter-spacing: 0.05em;
    margin: 0;
}

.toolbar button {
    background: #4f46e5;
    color: #fff;
    border: 0;
    border-radius: 10px;
    padding: 10px 18px;
    font-weight: bold;
    cursor: pointer;
}

.page {
    max-width: 800px;
    margin: 24px auto;
    background: #fff;
    padding: 48px 64px;
}

.rpm-header {
    text-align: center;
    margin-bottom: 40px;
    border-bottom: 3px double #000;
    padding-bottom: 16px;
}

.rpm-header h1 {
    font-size: 22px;
    text-transform: uppercase;
    margin: 0 0 4px;
}

.rpm-school {
    font-size: 18px;
    font-weight: bold;
    text-transform: uppercase;
    letter-spacing: 0.1em;
    margin: 0;
}

.rpm-table {
    width: 100%;
    border-collapse: collapse;
    border: 1px solid #000;
    font-size: 13px;
    line-height: 1.5;
}

.rpm-table td {
    border: 1px solid #000;
    padding: 12px;
    vertical-align: top;
}

.rpm-section {
    background: #f3f4f6;
    font-weight: bold;
    text-transform: uppercase;
}

.rpm-label {
    width: 30%;
    font-weight: 600;
}

.rpm-value {
    white-space: pre-wrap;
}

.rpm-value ol {
    margin: 0;
    padding-left: 20px;
}

.rpm-meeting td {
    font-weight: bold;
    background: #eef2ff;
}

.rpm-signatures {
    display: flex;
    justify-content: space-around;
    margin-top: 80px;
    text-align: center;
    font-size: 14px;
}

.rpm-signature {
    width: 45%;
}

.rpm-signer {
    margin-top: 96px;
    font-weight: bold;
    text-decoration: underline;
    text-transform: uppercase;
}

@media print {
    .no-print {
        display: none !important;
    }

    body {
        background: #fff;
    }

    .page {
        margin: 0;
        padding: 0;
        max-width: none;
    }
}
"#;
