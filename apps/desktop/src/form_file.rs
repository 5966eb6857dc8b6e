use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use planner::{form_events, ControllerConfig, PlannerStore};
use shared::domain::{
    EducationLevel, FormData, GeneratedRpm, GraduateDimension, MeetingConfig, PedagogicalPractice,
    Semester,
};

pub fn load_form(path: &Path) -> Result<FormData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read form file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid form file '{}'", path.display()))
}

pub fn load_result(path: &Path) -> Result<GeneratedRpm> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read result file '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid result file '{}'", path.display()))
}

/// Replays a form file through the controller so level and meeting rules
/// apply exactly as they do for interactive edits.
pub fn store_from_form(form: &FormData, config: ControllerConfig) -> Result<PlannerStore> {
    let mut store = PlannerStore::new(config);
    for event in form_events(form, &config) {
        store
            .apply(event)
            .context("form file contains a value the planner rejects")?;
    }
    Ok(store)
}

pub fn ensure_submittable(store: &PlannerStore) -> Result<()> {
    let missing = store.validate();
    if missing.is_empty() {
        return Ok(());
    }
    let labels: Vec<&str> = missing.iter().map(|m| m.label()).collect();
    bail!("form is incomplete, fill in: {}", labels.join(", "))
}

pub fn sample_form() -> FormData {
    FormData {
        school_name: "SMP Negeri 1 Cikarang Utara".into(),
        teacher_name: "Nama Guru".into(),
        teacher_nip: "198001012005011001".into(),
        principal_name: "Nama Kepala Sekolah".into(),
        principal_nip: "197501012000031001".into(),
        level: EducationLevel::Smp,
        grade: "7".into(),
        semester: Semester::Ganjil,
        subject: "Informatika".into(),
        cp: "Peserta didik mampu menerapkan berpikir komputasional untuk menyelesaikan persoalan sehari-hari.".into(),
        tp: "Peserta didik dapat menyusun algoritma sederhana dari kegiatan sehari-hari.".into(),
        material: "Algoritma dan Pemrograman".into(),
        meeting_count: 2,
        duration: "2 JP @40 Menit".into(),
        meeting_configs: vec![
            MeetingConfig {
                practice: PedagogicalPractice::InquiryDiscovery,
            },
            MeetingConfig {
                practice: PedagogicalPractice::ProjectBased,
            },
        ],
        dimensions: BTreeSet::from([
            GraduateDimension::CriticalReasoning,
            GraduateDimension::Collaboration,
        ]),
    }
}

pub fn template() -> Result<String> {
    toml::to_string_pretty(&sample_form()).context("failed to serialize form template")
}
