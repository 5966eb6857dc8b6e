use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    EducationLevel, FormData, GeneratedRpm, GraduateDimension, PedagogicalPractice,
    PromptProfile, Semester,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-text form inputs addressable by a field-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    SchoolName,
    TeacherName,
    TeacherNip,
    PrincipalName,
    PrincipalNip,
    Grade,
    Subject,
    Cp,
    Tp,
    Material,
    Duration,
}

impl TextField {
    pub const ALL: &'static [TextField] = &[
        TextField::SchoolName,
        TextField::TeacherName,
        TextField::TeacherNip,
        TextField::PrincipalName,
        TextField::PrincipalNip,
        TextField::Grade,
        TextField::Subject,
        TextField::Cp,
        TextField::Tp,
        TextField::Material,
        TextField::Duration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextField::SchoolName => "Nama Satuan Pendidikan",
            TextField::TeacherName => "Guru Pengampu",
            TextField::TeacherNip => "NIP Guru",
            TextField::PrincipalName => "Kepala Sekolah",
            TextField::PrincipalNip => "NIP Kepala Sekolah",
            TextField::Grade => "Kelas",
            TextField::Subject => "Mata Pelajaran",
            TextField::Cp => "Capaian Pembelajaran (CP)",
            TextField::Tp => "Tujuan Pembelajaran (TP)",
            TextField::Material => "Materi Utama",
            TextField::Duration => "Durasi per Sesi",
        }
    }

    pub fn value(self, form: &FormData) -> &str {
        match self {
            TextField::SchoolName => &form.school_name,
            TextField::TeacherName => &form.teacher_name,
            TextField::TeacherNip => &form.teacher_nip,
            TextField::PrincipalName => &form.principal_name,
            TextField::PrincipalNip => &form.principal_nip,
            TextField::Grade => &form.grade,
            TextField::Subject => &form.subject,
            TextField::Cp => &form.cp,
            TextField::Tp => &form.tp,
            TextField::Material => &form.material,
            TextField::Duration => &form.duration,
        }
    }

    pub fn slot(self, form: &mut FormData) -> &mut String {
        match self {
            TextField::SchoolName => &mut form.school_name,
            TextField::TeacherName => &mut form.teacher_name,
            TextField::TeacherNip => &mut form.teacher_nip,
            TextField::PrincipalName => &mut form.principal_name,
            TextField::PrincipalNip => &mut form.principal_nip,
            TextField::Grade => &mut form.grade,
            TextField::Subject => &mut form.subject,
            TextField::Cp => &mut form.cp,
            TextField::Tp => &mut form.tp,
            TextField::Material => &mut form.material,
            TextField::Duration => &mut form.duration,
        }
    }
}

/// Anything that can block submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum MissingField {
    Text(TextField),
    Dimensions,
}

impl MissingField {
    pub fn label(self) -> &'static str {
        match self {
            MissingField::Text(field) => field.label(),
            MissingField::Dimensions => "Dimensi Profil Lulusan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum FormEvent {
    SetText {
        field: TextField,
        value: String,
    },
    SetLevel(EducationLevel),
    SetSemester(Semester),
    SetMeetingCount(u32),
    SetPractice {
        meeting: usize,
        practice: PedagogicalPractice,
    },
    ToggleDimension(GraduateDimension),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Generating,
    Ready,
}

/// Follow-up work a surface performs after a controller transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    RevealOutput { after_ms: u64 },
    Alert { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub profile: PromptProfile,
    pub phase: Phase,
    pub form: FormData,
    pub missing: Vec<MissingField>,
    pub can_submit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GeneratedRpm>,
    /// Form the result was generated from; differs from `form` after edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_form: Option<FormData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub snapshot: SessionSnapshot,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelOption {
    pub level: EducationLevel,
    pub default_grade: String,
    pub grades: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormOptions {
    pub levels: Vec<LevelOption>,
    pub semesters: Vec<Semester>,
    pub practices: Vec<PedagogicalPractice>,
    pub dimensions: Vec<GraduateDimension>,
    pub min_meetings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_meetings: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_event_uses_tagged_payload() {
        let event = FormEvent::SetText {
            field: TextField::SchoolName,
            value: "SMP Negeri 1".into(),
        };
        let value = serde_json::to_value(&event).expect("json");
        assert_eq!(value["type"], "set_text");
        assert_eq!(value["payload"]["field"], "schoolName");

        let parsed: FormEvent = serde_json::from_value(serde_json::json!({
            "type": "toggle_dimension",
            "payload": "Kolaborasi"
        }))
        .expect("parse");
        assert_eq!(
            parsed,
            FormEvent::ToggleDimension(GraduateDimension::Collaboration)
        );
    }

    #[test]
    fn text_field_slot_and_value_agree() {
        let mut form = FormData::default();
        for field in TextField::ALL {
            *field.slot(&mut form) = format!("{field:?}");
        }
        for field in TextField::ALL {
            assert_eq!(field.value(&form), format!("{field:?}"));
        }
    }
}
