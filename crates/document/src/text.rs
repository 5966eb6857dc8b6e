use std::fmt::Write;

use crate::{Cell, DocumentModel, Row, DOCUMENT_TITLE};

pub(crate) fn document(model: &DocumentModel) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, model);
    out
}

fn write_document(out: &mut String, model: &DocumentModel) -> std::fmt::Result {
    writeln!(out, "{}", DOCUMENT_TITLE.to_uppercase())?;
    writeln!(out, "{}", model.school.to_uppercase())?;

    for section in &model.sections {
        writeln!(out)?;
        writeln!(out, "{}", section.title)?;
        for row in &section.rows {
            match row {
                Row::Field {
                    label,
                    value: Cell::Text(text),
                } => writeln!(out, "{label}: {text}")?,
                Row::Field {
                    label,
                    value: Cell::List(items),
                } => {
                    writeln!(out, "{label}:")?;
                    for (i, item) in items.iter().enumerate() {
                        writeln!(out, "  {}. {item}", i + 1)?;
                    }
                }
                Row::MeetingHeader { number, practice } => {
                    writeln!(out, "Pertemuan {number} - {practice}")?
                }
            }
        }
    }

    let sig = &model.signatures;
    writeln!(out)?;
    writeln!(out, "Mengetahui,")?;
    writeln!(out, "Kepala {}", sig.school)?;
    writeln!(out, "{}", sig.principal_name)?;
    writeln!(out, "NIP. {}", sig.principal_nip)?;
    writeln!(out)?;
    writeln!(out, "{}", sig.place_and_date)?;
    writeln!(out, "Guru Mata Pelajaran")?;
    writeln!(out, "{}", sig.teacher_name)?;
    write!(out, "NIP. {}", sig.teacher_nip)
}
