use std::collections::BTreeSet;

use shared::domain::{
    Assessment, EducationLevel, GraduateDimension, Identification, LearningExperience,
    MaterialAnalysis, MeetingActivities, MeetingConfig, PedagogicalPractice,
};

use super::*;

fn form_with_meetings(practices: &[PedagogicalPractice]) -> FormData {
    FormData {
        school_name: "SMP Negeri 3 Cikarang".into(),
        teacher_name: "Rina Lestari".into(),
        teacher_nip: "198706152010012003".into(),
        principal_name: "Budi Santoso".into(),
        principal_nip: "197001011995031001".into(),
        level: EducationLevel::Smp,
        grade: "7".into(),
        subject: "Informatika".into(),
        cp: "Peserta didik mampu menerapkan berpikir komputasional.".into(),
        tp: "Menyusun algoritma sederhana.".into(),
        material: "Algoritma".into(),
        meeting_count: practices.len() as u32,
        duration: "2 JP @40 Menit".into(),
        meeting_configs: practices
            .iter()
            .map(|practice| MeetingConfig {
                practice: *practice,
            })
            .collect(),
        dimensions: BTreeSet::from([
            GraduateDimension::Collaboration,
            GraduateDimension::CriticalReasoning,
        ]),
        ..FormData::default()
    }
}

fn rpm_with_meetings(count: usize) -> GeneratedRpm {
    GeneratedRpm {
        identification: Identification {
            learner: LearnerProfile::Narrative {
                text: "Siswa senang bekerja berkelompok.".into(),
            },
            material: None,
            cross_discipline: "Matematika".into(),
            partnership: "Orang tua".into(),
            environment: "Laboratorium komputer".into(),
            digital_tools: "Scratch, Padlet".into(),
            topic: "Algoritma di Sekitar Kita".into(),
            solo_objective: None,
        },
        experience: LearningExperience {
            meetings: (1..=count)
                .map(|i| MeetingActivities {
                    orientation: format!("orientasi-{i}"),
                    core: format!("inti-{i}"),
                    reflection: format!("refleksi-{i}"),
                })
                .collect(),
        },
        assessment: Assessment {
            diagnostic: "Kuis awal".into(),
            formative: "Observasi <diskusi>".into(),
            summative: "Proyek akhir".into(),
        },
    }
}

fn options() -> RenderOptions {
    RenderOptions {
        date: NaiveDate::from_ymd_opt(2026, 10, 19).expect("date"),
        place: "Cikarang".into(),
        inline_styles: false,
    }
}

#[test]
fn formats_indonesian_long_date() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 7).expect("date");
    assert_eq!(long_date(date), "7 Maret 2025");
    let date = NaiveDate::from_ymd_opt(2026, 12, 31).expect("date");
    assert_eq!(long_date(date), "31 Desember 2026");
}

#[test]
fn sections_appear_in_fixed_order() {
    let doc = render(
        &form_with_meetings(&[PedagogicalPractice::ProjectBased]),
        &rpm_with_meetings(1),
        &options(),
    );
    let positions: Vec<usize> = [
        "1. IDENTITAS",
        "2. IDENTIFIKASI",
        "3. DESAIN PEMBELAJARAN",
        "4. PENGALAMAN BELAJAR",
        "5. ASESMEN PEMBELAJARAN",
    ]
    .iter()
    .map(|title| doc.html.find(title).expect("section present"))
    .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn one_block_per_meeting_with_its_practice() {
    let practices = [
        PedagogicalPractice::InquiryDiscovery,
        PedagogicalPractice::GameBased,
        PedagogicalPractice::Station,
    ];
    let doc = render(&form_with_meetings(&practices), &rpm_with_meetings(3), &options());

    assert_eq!(doc.html.matches("data-meeting=").count(), 3);
    for (i, practice) in practices.iter().enumerate() {
        let n = i + 1;
        let block = format!(
            "<tr class=\"rpm-meeting\" data-meeting=\"{n}\"><td>Pertemuan {n}</td><td>{}</td></tr>",
            practice.label()
        );
        assert!(doc.html.contains(&block), "missing block for meeting {n}");
        for activity in ["orientasi", "inti", "refleksi"] {
            assert!(doc.html.contains(&format!("{activity}-{n}")));
        }
        assert!(doc
            .text
            .contains(&format!("Pertemuan {n} - {}", practice.label())));
    }
}

#[test]
fn identity_and_identification_project_the_form() {
    let doc = render(
        &form_with_meetings(&[PedagogicalPractice::ProjectBased; 2]),
        &rpm_with_meetings(2),
        &options(),
    );
    assert!(doc.text.contains("Kelas / Semester: 7 / Ganjil"));
    assert!(doc
        .text
        .contains("Durasi / Pertemuan: 2 JP @40 Menit (2 Pertemuan)"));
    assert!(doc
        .text
        .contains("Capaian Dimensi Lulusan: Penalaran Kritis, Kolaborasi"));
    assert!(doc.text.contains("  2. Pertemuan 2: PjBL"));
    assert!(doc.text.contains("Tujuan Pembelajaran (TP): Menyusun algoritma sederhana."));
}

#[test]
fn signature_block_names_both_signers() {
    let doc = render(
        &form_with_meetings(&[PedagogicalPractice::ProblemBased]),
        &rpm_with_meetings(1),
        &options(),
    );
    assert!(doc.html.contains("Kepala SMP Negeri 3 Cikarang"));
    assert!(doc.html.contains("NIP. 197001011995031001"));
    assert!(doc.html.contains("Cikarang, 19 Oktober 2026"));
    assert!(doc.text.ends_with("Rina Lestari\nNIP. 198706152010012003"));
}

#[test]
fn rendering_twice_is_byte_identical() {
    let form = form_with_meetings(&[PedagogicalPractice::Station; 2]);
    let rpm = rpm_with_meetings(2);
    assert_eq!(render(&form, &rpm, &options()), render(&form, &rpm, &options()));
}

#[test]
fn generated_text_is_escaped() {
    let doc = render(
        &form_with_meetings(&[PedagogicalPractice::ProjectBased]),
        &rpm_with_meetings(1),
        &options(),
    );
    assert!(doc.html.contains("Observasi &lt;diskusi&gt;"));
    assert!(doc.text.contains("Observasi <diskusi>"));
}

#[test]
fn deep_profile_rows_replace_the_learner_narrative() {
    let mut rpm = rpm_with_meetings(1);
    rpm.identification.learner = LearnerProfile::Detailed {
        general: "Usia 12 tahun".into(),
        readiness: "Mengenal urutan".into(),
        interest: "Permainan".into(),
        learning_style: "Visual".into(),
    };
    rpm.identification.material = Some(MaterialAnalysis {
        knowledge_type: "Prosedural".into(),
        relevance: "Rutinitas harian".into(),
        difficulty: "Sedang".into(),
        value_integration: "Disiplin".into(),
    });
    rpm.identification.solo_objective =
        Some("[Relasional] Menghubungkan langkah-langkah".into());

    let doc = render(
        &form_with_meetings(&[PedagogicalPractice::ProjectBased]),
        &rpm,
        &options(),
    );
    assert!(!doc.text.contains("Siswa:"));
    assert!(doc.text.contains("Gaya Belajar: Visual"));
    assert!(doc.text.contains("Jenis Pengetahuan: Prosedural"));
    assert!(doc
        .text
        .contains("Tujuan Pembelajaran (TP): [Relasional] Menghubungkan langkah-langkah"));
}

#[test]
fn inline_styles_are_optional() {
    let form = form_with_meetings(&[PedagogicalPractice::ProjectBased]);
    let rpm = rpm_with_meetings(1);
    let plain = render(&form, &rpm, &options());
    let styled = render(&form, &rpm, &options().with_inline_styles(true));
    assert!(!plain.html.contains("style="));
    assert!(styled.html.contains("style=\"width:100%;border-collapse:collapse;"));
    assert_eq!(plain.text, styled.text);
}

#[test]
fn print_page_hides_toolbar_and_prints_on_load() {
    let doc = render(
        &form_with_meetings(&[PedagogicalPractice::ProjectBased]),
        &rpm_with_meetings(1),
        &options(),
    );
    let screen = render_page(&doc, PageMode::Screen);
    let print = render_page(&doc, PageMode::Print);
    assert!(screen.starts_with("<!DOCTYPE html>"));
    assert!(screen.contains("@media print"));
    assert!(screen.contains(&doc.html));
    assert!(!screen.contains("window.addEventListener('load'"));
    assert!(print.contains("window.addEventListener('load'"));
}
