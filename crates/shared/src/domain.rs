use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_label(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                Self::ALL.iter().copied().find(|value| value.label() == raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum!(EducationLevel {
    Sd => "SD",
    Smp => "SMP",
    Sma => "SMA",
    Smk => "SMK",
});

labelled_enum!(Semester {
    Ganjil => "Ganjil",
    Genap => "Genap",
});

labelled_enum!(PedagogicalPractice {
    InquiryDiscovery => "Inkuiri-Discovery Learning",
    ProjectBased => "PjBL",
    ProblemBased => "Problem Based Learning",
    GameBased => "Game Based Learning",
    Station => "Station Learning",
});

labelled_enum!(GraduateDimension {
    Faith => "Keimanan & Ketakwaan",
    Citizenship => "Kewargaan",
    CriticalReasoning => "Penalaran Kritis",
    Creativity => "Kreativitas",
    Collaboration => "Kolaborasi",
    Independence => "Kemandirian",
    Health => "Kesehatan",
    Communication => "Komunikasi",
});

impl EducationLevel {
    /// Grade the form falls back to whenever the level changes.
    pub fn default_grade(self) -> &'static str {
        match self {
            EducationLevel::Sd => "1",
            EducationLevel::Smp => "7",
            EducationLevel::Sma | EducationLevel::Smk => "10",
        }
    }

    pub fn grades(self) -> &'static [&'static str] {
        match self {
            EducationLevel::Sd => &["1", "2", "3", "4", "5", "6"],
            EducationLevel::Smp => &["7", "8", "9"],
            EducationLevel::Sma | EducationLevel::Smk => &["10", "11", "12"],
        }
    }
}

impl Default for EducationLevel {
    fn default() -> Self {
        EducationLevel::Sd
    }
}

impl Default for Semester {
    fn default() -> Self {
        Semester::Ganjil
    }
}

impl Default for PedagogicalPractice {
    fn default() -> Self {
        PedagogicalPractice::InquiryDiscovery
    }
}

/// Which set of generation instructions and response shape a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptProfile {
    /// Flat learner narrative; the objective statement comes from the form.
    #[default]
    Standard,
    /// Nested learner/material analysis and a SOLO-tagged derived objective.
    Deep,
}

impl PromptProfile {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(PromptProfile::Standard),
            "deep" | "solo" => Some(PromptProfile::Deep),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingConfig {
    pub practice: PedagogicalPractice,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            practice: PedagogicalPractice::default(),
        }
    }
}

/// Missing keys take their defaults so partially filled form files load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormData {
    pub school_name: String,
    pub teacher_name: String,
    pub teacher_nip: String,
    pub principal_name: String,
    pub principal_nip: String,
    pub level: EducationLevel,
    pub grade: String,
    pub semester: Semester,
    pub subject: String,
    pub cp: String,
    pub tp: String,
    pub material: String,
    pub meeting_count: u32,
    pub duration: String,
    pub meeting_configs: Vec<MeetingConfig>,
    pub dimensions: BTreeSet<GraduateDimension>,
}

impl Default for FormData {
    fn default() -> Self {
        let level = EducationLevel::default();
        Self {
            school_name: String::new(),
            teacher_name: String::new(),
            teacher_nip: String::new(),
            principal_name: String::new(),
            principal_nip: String::new(),
            level,
            grade: level.default_grade().to_string(),
            semester: Semester::default(),
            subject: String::new(),
            cp: String::new(),
            tp: String::new(),
            material: String::new(),
            meeting_count: 1,
            duration: String::new(),
            meeting_configs: vec![MeetingConfig::default()],
            dimensions: BTreeSet::new(),
        }
    }
}

impl FormData {
    pub fn practices(&self) -> Vec<PedagogicalPractice> {
        self.meeting_configs.iter().map(|m| m.practice).collect()
    }

    /// Selected dimensions in the fixed display order.
    pub fn dimension_labels(&self) -> String {
        self.dimensions
            .iter()
            .map(|d| d.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LearnerProfile {
    Narrative {
        text: String,
    },
    Detailed {
        general: String,
        readiness: String,
        interest: String,
        learning_style: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialAnalysis {
    pub knowledge_type: String,
    pub relevance: String,
    pub difficulty: String,
    pub value_integration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub learner: LearnerProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialAnalysis>,
    pub cross_discipline: String,
    pub partnership: String,
    pub environment: String,
    pub digital_tools: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solo_objective: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingActivities {
    pub orientation: String,
    pub core: String,
    pub reflection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningExperience {
    pub meetings: Vec<MeetingActivities>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub diagnostic: String,
    pub formative: String,
    pub summative: String,
}

/// A validated generation result. Produced wholesale by one call and never
/// patched afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRpm {
    pub identification: Identification,
    pub experience: LearningExperience,
    pub assessment: Assessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_match_grade_table() {
        assert_eq!(EducationLevel::Sd.default_grade(), "1");
        assert_eq!(EducationLevel::Smp.default_grade(), "7");
        assert_eq!(EducationLevel::Sma.default_grade(), "10");
        assert_eq!(EducationLevel::Smk.default_grade(), "10");
        for level in EducationLevel::ALL {
            assert!(level.grades().contains(&level.default_grade()));
        }
    }

    #[test]
    fn enums_serialize_as_form_labels() {
        let json = serde_json::to_string(&PedagogicalPractice::ProjectBased).expect("json");
        assert_eq!(json, "\"PjBL\"");
        let parsed: GraduateDimension =
            serde_json::from_str("\"Keimanan & Ketakwaan\"").expect("parse");
        assert_eq!(parsed, GraduateDimension::Faith);
        assert_eq!(
            EducationLevel::from_label(" SMK "),
            Some(EducationLevel::Smk)
        );
        assert_eq!(Semester::from_label("Pendek"), None);
    }

    #[test]
    fn dimension_labels_follow_fixed_order() {
        let mut form = FormData::default();
        form.dimensions.insert(GraduateDimension::Communication);
        form.dimensions.insert(GraduateDimension::Citizenship);
        assert_eq!(form.dimension_labels(), "Kewargaan, Komunikasi");
    }

    #[test]
    fn default_form_keeps_one_meeting_in_sync() {
        let form = FormData::default();
        assert_eq!(form.meeting_count, 1);
        assert_eq!(form.meeting_configs.len(), 1);
        assert_eq!(form.grade, "1");
        assert_eq!(
            form.practices(),
            vec![PedagogicalPractice::InquiryDiscovery]
        );
    }

    #[test]
    fn form_round_trips_with_camel_case_keys() {
        let form = FormData::default();
        let value = serde_json::to_value(&form).expect("json");
        assert!(value.get("schoolName").is_some());
        assert!(value.get("meetingConfigs").is_some());
        let back: FormData = serde_json::from_value(value).expect("parse");
        assert_eq!(back, form);
    }
}
