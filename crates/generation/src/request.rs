//! Turns a filled form into the instruction text and output schema sent to
//! the generation service.

use std::fmt::{self, Write as _};

use serde::Serialize;
use shared::domain::{FormData, PromptProfile};

use crate::schema::{output_schema, SchemaDescriptor};

/// The qualitative anchors every activity description must carry.
pub const ACTIVITY_ANCHORS: [&str; 3] = ["Berkesadaran", "Bermakna", "Menggembirakan"];

pub const SOLO_LEVELS: [&str; 4] = [
    "Unistruktural",
    "Multistruktural",
    "Relasional",
    "Abstrak yang Diperluas",
];

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub instruction: String,
    pub schema: SchemaDescriptor,
    pub profile: PromptProfile,
    pub expected_meetings: usize,
}

pub fn build_request(form: &FormData, profile: PromptProfile) -> GenerationRequest {
    GenerationRequest {
        instruction: build_instruction(form, profile),
        schema: output_schema(profile),
        profile,
        expected_meetings: form.meeting_configs.len(),
    }
}

pub fn build_instruction(form: &FormData, profile: PromptProfile) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_instruction(&mut out, form, profile);
    out
}

fn write_instruction(out: &mut String, form: &FormData, profile: PromptProfile) -> fmt::Result {
    let learner = match profile {
        PromptProfile::Standard => "siswa",
        PromptProfile::Deep => "murid",
    };
    let anchors = ACTIVITY_ANCHORS.join(", ");
    let practices = form
        .meeting_configs
        .iter()
        .enumerate()
        .map(|(i, m)| format!("Pertemuan {}: {}", i + 1, m.practice))
        .collect::<Vec<_>>()
        .join("; ");

    out.write_str("Bertindaklah sebagai konsultan pendidikan ahli Kurikulum Merdeka di Indonesia.\n")?;
    out.write_str(
        "Buatkan konten Perencanaan Pembelajaran Mendalam (RPM) berdasarkan data berikut:\n\n",
    )?;
    writeln!(out, "- Satuan Pendidikan: {}", form.school_name.trim())?;
    writeln!(
        out,
        "- Jenjang: {} - Kelas: {} - Semester: {}",
        form.level,
        form.grade.trim(),
        form.semester
    )?;
    writeln!(out, "- Mata Pelajaran: {}", form.subject.trim())?;
    writeln!(out, "- Materi: {}", form.material.trim())?;
    writeln!(out, "- Capaian Pembelajaran (CP): {}", form.cp.trim())?;
    let tp = form.tp.trim();
    match profile {
        PromptProfile::Standard => {
            writeln!(out, "- Tujuan Pembelajaran (TP): {tp}")?;
        }
        PromptProfile::Deep if tp.is_empty() => {
            out.write_str("- Tujuan Pembelajaran (TP): turunkan dari CP\n")?;
        }
        PromptProfile::Deep => {
            writeln!(out, "- Tujuan Pembelajaran (TP) usulan guru: {tp}")?;
        }
    }
    writeln!(out, "- Dimensi Lulusan: {}", form.dimension_labels())?;
    writeln!(out, "- Jumlah Pertemuan: {}", form.meeting_configs.len())?;
    writeln!(out, "- Durasi per Pertemuan: {}", form.duration.trim())?;
    writeln!(out, "- Praktik Pedagogis per Pertemuan: {practices}")?;

    out.write_str("\nPersyaratan Khusus:\n")?;
    let mut items: Vec<String> = Vec::new();
    match profile {
        PromptProfile::Standard => items.push(
            "Identifikasi Siswa: Deskripsikan profil siswa yang relevan dengan jenjang dan materi secara otomatis."
                .to_string(),
        ),
        PromptProfile::Deep => {
            items.push(
                "Identifikasi Murid: Uraikan profil umum, kesiapan belajar, minat, dan gaya belajar murid sesuai jenjang dan materi."
                    .to_string(),
            );
            items.push(
                "Analisis Materi: Tentukan jenis pengetahuan, relevansi dengan kehidupan murid, tingkat kesulitan, dan integrasi nilai."
                    .to_string(),
            );
        }
    }
    items.push("Lintas Disiplin Ilmu: Tentukan mata pelajaran lain yang berkaitan.".to_string());
    items.push("Kemitraan: Tentukan pihak luar atau sumber belajar yang sesuai.".to_string());
    items.push("Lingkungan: Tentukan pengaturan kelas atau lokasi belajar.".to_string());
    items.push(
        "Digital: Berikan referensi tools online yang konkret (seperti Canva, Quizizz, Padlet, dll)."
            .to_string(),
    );
    items.push(format!(
        "Pengalaman Belajar: Harus sesuai dengan sintaks praktik pedagogis yang dipilih untuk setiap pertemuan.\n   \
         - Memahami: Kegiatan awal ({anchors}).\n   \
         - Mengaplikasi: Kegiatan inti mengikuti sintaks model pembelajaran ({anchors}).\n   \
         - Refleksi: Kegiatan penutup ({anchors}).\n   \
         - Jumlah entri pertemuan harus tepat {}, berurutan dari Pertemuan 1.",
        form.meeting_configs.len()
    ));
    items.push("Asesmen: Detailkan asesmen awal, proses, dan akhir secara otomatis.".to_string());
    if profile == PromptProfile::Deep {
        items.push(format!(
            "Tujuan Pembelajaran: Turunkan tujuan pembelajaran dari CP menggunakan taksonomi SOLO ({}). \
             Level {} dan {} wajib muncul. Awali setiap tujuan dengan label levelnya, misalnya \"[Relasional] ...\".",
            SOLO_LEVELS.join(", "),
            SOLO_LEVELS[2],
            SOLO_LEVELS[3]
        ));
        items.push(
            "Terminologi: Gunakan istilah \"murid\" sebagai pengganti \"siswa\" di seluruh keluaran."
                .to_string(),
        );
    }
    for (i, item) in items.iter().enumerate() {
        writeln!(out, "{}. {item}", i + 1)?;
    }

    write!(
        out,
        "\nGunakan sudut pandang {learner} dan berikan output dalam format JSON murni sesuai schema."
    )
}
