//! Projects a form and its generated plan into the printable RPM document.
//!
//! The document is modelled once as [`Section`]s of [`Row`]s and then
//! projected twice: as HTML markup (for display, print and rich clipboard
//! payloads) and as plain text (the clipboard fallback).

use chrono::{Datelike, Local, NaiveDate};
use shared::domain::{FormData, GeneratedRpm, LearnerProfile};

mod markup;
mod text;

pub use markup::{render_page, PageMode};

pub const DOCUMENT_TITLE: &str = "Perencanaan Pembelajaran Mendalam (RPM)";

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Indonesian long date, e.g. `19 Oktober 2026`.
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Date printed next to the signature place.
    pub date: NaiveDate,
    pub place: String,
    /// Emit `style` attributes on every element so pasted content keeps its
    /// table borders.
    pub inline_styles: bool,
}

impl RenderOptions {
    pub fn today(place: impl Into<String>) -> Self {
        Self {
            date: Local::now().date_naive(),
            place: place.into(),
            inline_styles: false,
        }
    }

    pub fn with_inline_styles(mut self, inline_styles: bool) -> Self {
        self.inline_styles = inline_styles;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cell {
    Text(String),
    /// Rendered as a numbered list.
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Row {
    Field { label: &'static str, value: Cell },
    MeetingHeader { number: usize, practice: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Section {
    pub title: &'static str,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignatureBlock {
    pub school: String,
    pub principal_name: String,
    pub principal_nip: String,
    pub teacher_name: String,
    pub teacher_nip: String,
    pub place_and_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentModel {
    pub school: String,
    pub sections: Vec<Section>,
    pub signatures: SignatureBlock,
}

fn field(label: &'static str, value: impl Into<String>) -> Row {
    Row::Field {
        label,
        value: Cell::Text(value.into()),
    }
}

pub(crate) fn build_model(
    form: &FormData,
    rpm: &GeneratedRpm,
    options: &RenderOptions,
) -> DocumentModel {
    let ident = &rpm.identification;

    let identity = Section {
        title: "1. IDENTITAS",
        rows: vec![
            field("Nama Satuan Pendidikan", &form.school_name),
            field("Mata Pelajaran", &form.subject),
            field(
                "Kelas / Semester",
                format!("{} / {}", form.grade, form.semester),
            ),
            field(
                "Durasi / Pertemuan",
                format!("{} ({} Pertemuan)", form.duration, form.meeting_count),
            ),
        ],
    };

    let mut identification_rows = match &ident.learner {
        LearnerProfile::Narrative { text } => vec![field("Siswa", text)],
        LearnerProfile::Detailed {
            general,
            readiness,
            interest,
            learning_style,
        } => vec![
            field("Profil Umum Murid", general),
            field("Kesiapan Belajar", readiness),
            field("Minat Murid", interest),
            field("Gaya Belajar", learning_style),
        ],
    };
    identification_rows.push(field("Materi Pelajaran", &form.material));
    if let Some(material) = &ident.material {
        identification_rows.extend([
            field("Jenis Pengetahuan", &material.knowledge_type),
            field("Relevansi Materi", &material.relevance),
            field("Tingkat Kesulitan", &material.difficulty),
            field("Integrasi Nilai", &material.value_integration),
        ]);
    }
    identification_rows.push(field("Capaian Dimensi Lulusan", form.dimension_labels()));
    let identification = Section {
        title: "2. IDENTIFIKASI",
        rows: identification_rows,
    };

    let objective = match ident.solo_objective.as_deref() {
        Some(derived) if !derived.trim().is_empty() => derived.to_string(),
        _ => form.tp.clone(),
    };
    let design = Section {
        title: "3. DESAIN PEMBELAJARAN",
        rows: vec![
            field("Capaian Pembelajaran (CP)", &form.cp),
            field("Lintas Disiplin Ilmu", &ident.cross_discipline),
            field("Tujuan Pembelajaran (TP)", objective),
            field("Topik Pembelajaran", &ident.topic),
            Row::Field {
                label: "Praktik Pedagogis",
                value: Cell::List(
                    form.meeting_configs
                        .iter()
                        .enumerate()
                        .map(|(i, m)| format!("Pertemuan {}: {}", i + 1, m.practice))
                        .collect(),
                ),
            },
            field("Kemitraan Pembelajaran", &ident.partnership),
            field("Lingkungan Pembelajaran", &ident.environment),
            field("Pemanfaatan Teknologi Digital", &ident.digital_tools),
        ],
    };

    let mut experience_rows = Vec::with_capacity(rpm.experience.meetings.len() * 4);
    for (i, meeting) in rpm.experience.meetings.iter().enumerate() {
        let practice = form
            .meeting_configs
            .get(i)
            .map(|m| m.practice.label().to_string())
            .unwrap_or_else(|| "-".to_string());
        experience_rows.extend([
            Row::MeetingHeader {
                number: i + 1,
                practice,
            },
            field("Memahami (Kegiatan Awal)", &meeting.orientation),
            field("Mengaplikasi (Kegiatan Inti)", &meeting.core),
            field("Refleksi (Kegiatan Penutup)", &meeting.reflection),
        ]);
    }
    let experience = Section {
        title: "4. PENGALAMAN BELAJAR",
        rows: experience_rows,
    };

    let assessment = Section {
        title: "5. ASESMEN PEMBELAJARAN",
        rows: vec![
            field("Asesmen Awal (Diagnostik)", &rpm.assessment.diagnostic),
            field("Asesmen Proses (Formatif)", &rpm.assessment.formative),
            field("Asesmen Akhir (Sumatif)", &rpm.assessment.summative),
        ],
    };

    DocumentModel {
        school: form.school_name.clone(),
        sections: vec![identity, identification, design, experience, assessment],
        signatures: SignatureBlock {
            school: form.school_name.clone(),
            principal_name: form.principal_name.clone(),
            principal_nip: form.principal_nip.clone(),
            teacher_name: form.teacher_name.clone(),
            teacher_nip: form.teacher_nip.clone(),
            place_and_date: format!("{}, {}", options.place, long_date(options.date)),
        },
    }
}

pub fn render(form: &FormData, rpm: &GeneratedRpm, options: &RenderOptions) -> RenderedDocument {
    let model = build_model(form, rpm, options);
    RenderedDocument {
        html: markup::document(&model, options.inline_styles).into_string(),
        text: text::document(&model),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
