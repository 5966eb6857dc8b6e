//! Form controller: owns the editable lesson-plan form, enforces the derived
//! field rules and drives one generation at a time.

use std::time::Duration;

use generation::{
    build_request, GenerationBackend, GenerationError, GenerationErrorKind, GenerationRequest,
};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{FormData, GeneratedRpm, MeetingConfig, PedagogicalPractice, PromptProfile},
    protocol::{
        Effect, FormEvent, FormOptions, LevelOption, MissingField, Phase, SessionId,
        SessionSnapshot, TextField,
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod config;

pub use config::{load_settings, Settings};

pub const MIN_MEETINGS: u32 = 1;
pub const DEFAULT_MAX_MEETINGS: u32 = 10;
/// Upper bound on the meeting count even when no maximum is configured.
pub const MEETING_CEILING: u32 = 60;
/// Delay before the output region is revealed, so layout can settle.
pub const REVEAL_DELAY: Duration = Duration::from_millis(100);

pub const ALERT_GENERATION_FAILED: &str =
    "Terjadi kesalahan saat membuat RPM. Silakan coba lagi.";
pub const ALERT_CHECK_CONNECTION: &str =
    "Terjadi kesalahan saat membuat RPM. Periksa koneksi internet Anda lalu coba lagi.";
pub const ALERT_NOT_CONFIGURED: &str =
    "Layanan AI belum dikonfigurasi (kunci API tidak ditemukan). Hubungi administrator.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeInput {
    #[default]
    FreeText,
    /// Only the grades offered for the selected level are accepted.
    LevelList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub profile: PromptProfile,
    /// `None` leaves the meeting count bounded only by [`MEETING_CEILING`].
    pub max_meetings: Option<u32>,
    pub clear_result_on_submit: bool,
    pub grade_input: GradeInput,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            profile: PromptProfile::Standard,
            max_meetings: Some(DEFAULT_MAX_MEETINGS),
            clear_result_on_submit: true,
            grade_input: GradeInput::FreeText,
        }
    }
}

impl ControllerConfig {
    /// Largest meeting count this configuration accepts.
    pub fn meeting_limit(&self) -> u32 {
        self.max_meetings
            .unwrap_or(MEETING_CEILING)
            .clamp(MIN_MEETINGS, MEETING_CEILING)
    }

    pub fn clamp_meetings(&self, requested: u32) -> u32 {
        requested.clamp(MIN_MEETINGS, self.meeting_limit())
    }

    pub fn form_options(&self) -> FormOptions {
        use shared::domain::{EducationLevel, GraduateDimension, Semester};

        FormOptions {
            levels: EducationLevel::ALL
                .iter()
                .map(|level| LevelOption {
                    level: *level,
                    default_grade: level.default_grade().to_string(),
                    grades: level.grades().iter().map(|g| g.to_string()).collect(),
                })
                .collect(),
            semesters: Semester::ALL.to_vec(),
            practices: PedagogicalPractice::ALL.to_vec(),
            dimensions: GraduateDimension::ALL.to_vec(),
            min_meetings: MIN_MEETINGS,
            max_meetings: Some(self.meeting_limit()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventRejected {
    #[error("meeting {meeting} does not exist; the plan has {count} meetings")]
    UnknownMeeting { meeting: usize, count: usize },
    #[error("grade '{grade}' is not offered for level {level}")]
    GradeOutsideLevel { grade: String, level: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitBlocked {
    #[error("a generation is already in progress")]
    InFlight,
    #[error("form is incomplete: {}", missing_labels(.0))]
    Incomplete(Vec<MissingField>),
}

fn missing_labels(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Work handed out by [`PlannerStore::begin_generation`]. The store stays in
/// `Generating` until the matching [`PlannerStore::finish_generation`].
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub request: GenerationRequest,
}

/// A validated result paired with the form it was requested from. Edits made
/// while the call is in flight change the live form only.
#[derive(Debug, Clone)]
struct Planned {
    form: FormData,
    rpm: GeneratedRpm,
}

pub fn alert_for(err: &GenerationError) -> &'static str {
    match err.kind() {
        GenerationErrorKind::Transport => ALERT_CHECK_CONNECTION,
        GenerationErrorKind::Configuration => ALERT_NOT_CONFIGURED,
        GenerationErrorKind::Service | GenerationErrorKind::Malformed => ALERT_GENERATION_FAILED,
    }
}

#[derive(Debug, Clone)]
pub struct PlannerStore {
    form: FormData,
    phase: Phase,
    /// Form as submitted, held while a generation is in flight.
    submitted: Option<FormData>,
    result: Option<Planned>,
    config: ControllerConfig,
}

impl PlannerStore {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            form: FormData::default(),
            phase: Phase::Idle,
            submitted: None,
            result: None,
            config,
        }
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<&GeneratedRpm> {
        self.result.as_ref().map(|planned| &planned.rpm)
    }

    /// The form the current result was generated from.
    pub fn result_form(&self) -> Option<&FormData> {
        self.result.as_ref().map(|planned| &planned.form)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn apply(&mut self, event: FormEvent) -> Result<(), EventRejected> {
        debug!(?event, "applying form event");
        match event {
            FormEvent::SetText { field, value } => {
                if field == TextField::Grade && self.config.grade_input == GradeInput::LevelList {
                    let level = self.form.level;
                    if !level.grades().contains(&value.trim()) {
                        return Err(EventRejected::GradeOutsideLevel {
                            grade: value,
                            level: level.label().to_string(),
                        });
                    }
                }
                *field.slot(&mut self.form) = value;
            }
            FormEvent::SetLevel(level) => {
                self.form.level = level;
                self.form.grade = level.default_grade().to_string();
            }
            FormEvent::SetSemester(semester) => self.form.semester = semester,
            FormEvent::SetMeetingCount(requested) => {
                let count = self.config.clamp_meetings(requested);
                self.form.meeting_count = count;
                self.form
                    .meeting_configs
                    .resize(count as usize, MeetingConfig::default());
            }
            FormEvent::SetPractice { meeting, practice } => {
                let count = self.form.meeting_configs.len();
                let slot = self
                    .form
                    .meeting_configs
                    .get_mut(meeting)
                    .ok_or(EventRejected::UnknownMeeting { meeting, count })?;
                slot.practice = practice;
            }
            FormEvent::ToggleDimension(dimension) => {
                if !self.form.dimensions.remove(&dimension) {
                    self.form.dimensions.insert(dimension);
                }
            }
        }
        Ok(())
    }

    /// Required inputs that are still blank, in form order.
    pub fn validate(&self) -> Vec<MissingField> {
        let mut missing: Vec<MissingField> = TextField::ALL
            .iter()
            .copied()
            .filter(|field| !(*field == TextField::Tp && self.config.profile == PromptProfile::Deep))
            .filter(|field| field.value(&self.form).trim().is_empty())
            .map(MissingField::Text)
            .collect();
        if self.form.dimensions.is_empty() {
            missing.push(MissingField::Dimensions);
        }
        missing
    }

    pub fn can_submit(&self) -> bool {
        self.phase != Phase::Generating && self.validate().is_empty()
    }

    pub fn begin_generation(&mut self) -> Result<GenerationJob, SubmitBlocked> {
        if self.phase == Phase::Generating {
            return Err(SubmitBlocked::InFlight);
        }
        let missing = self.validate();
        if !missing.is_empty() {
            return Err(SubmitBlocked::Incomplete(missing));
        }
        if self.config.clear_result_on_submit {
            self.result = None;
        }
        self.phase = Phase::Generating;
        let request = build_request(&self.form, self.config.profile);
        info!(
            meetings = request.expected_meetings,
            profile = ?request.profile,
            "generation started"
        );
        self.submitted = Some(self.form.clone());
        Ok(GenerationJob { request })
    }

    pub fn finish_generation(
        &mut self,
        outcome: Result<GeneratedRpm, GenerationError>,
    ) -> Vec<Effect> {
        if self.phase != Phase::Generating {
            warn!("ignoring generation outcome with no generation in flight");
            return Vec::new();
        }
        let submitted = self.submitted.take();
        match outcome {
            Ok(rpm) => {
                let form = submitted.unwrap_or_else(|| self.form.clone());
                self.result = Some(Planned { form, rpm });
                self.phase = Phase::Ready;
                info!("generation finished");
                vec![Effect::RevealOutput {
                    after_ms: REVEAL_DELAY.as_millis() as u64,
                }]
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "generation failed");
                self.phase = if self.result.is_some() {
                    Phase::Ready
                } else {
                    Phase::Idle
                };
                vec![Effect::Alert {
                    message: alert_for(&err).to_string(),
                }]
            }
        }
    }

    /// Runs one full submit cycle against `backend`.
    pub async fn generate(
        &mut self,
        backend: &dyn GenerationBackend,
    ) -> Result<Vec<Effect>, SubmitBlocked> {
        let job = self.begin_generation()?;
        let outcome = generation::generate(backend, &job.request).await;
        Ok(self.finish_generation(outcome))
    }

    pub fn snapshot(&self, session_id: SessionId) -> SessionSnapshot {
        let missing = self.validate();
        SessionSnapshot {
            session_id,
            profile: self.config.profile,
            phase: self.phase,
            form: self.form.clone(),
            can_submit: self.phase != Phase::Generating && missing.is_empty(),
            missing,
            result: self.result().cloned(),
            result_form: self.result_form().cloned(),
        }
    }
}

/// Events that reproduce `form` on a fresh store built with `config`. The
/// level comes first so that its grade reset does not overwrite the requested
/// grade. The declared meeting count is clamped to the configured bounds and
/// practices past it are dropped.
pub fn form_events(form: &FormData, config: &ControllerConfig) -> Vec<FormEvent> {
    let mut events = vec![
        FormEvent::SetLevel(form.level),
        FormEvent::SetSemester(form.semester),
    ];
    events.extend(TextField::ALL.iter().map(|field| FormEvent::SetText {
        field: *field,
        value: field.value(form).to_string(),
    }));
    let count = config.clamp_meetings(form.meeting_count);
    events.push(FormEvent::SetMeetingCount(count));
    events.extend(
        form.meeting_configs
            .iter()
            .take(count as usize)
            .enumerate()
            .map(|(meeting, config)| FormEvent::SetPractice {
                meeting,
                practice: config.practice,
            }),
    );
    events.extend(form.dimensions.iter().copied().map(FormEvent::ToggleDimension));
    events
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
