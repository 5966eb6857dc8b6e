use std::{fmt, fs, path::Path, time::Duration};

use anyhow::Context;
use generation::{
    gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL},
    GeminiConfig,
};
use shared::domain::PromptProfile;
use tracing::warn;
use url::Url;

use crate::{ControllerConfig, GradeInput, DEFAULT_MAX_MEETINGS};

pub const SETTINGS_FILE: &str = "rpm.toml";
pub const DEFAULT_SIGNATURE_PLACE: &str = "Cikarang";
pub const DEFAULT_DESTINATION_URL: &str = "https://docs.new";
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub profile: PromptProfile,
    pub max_meetings: Option<u32>,
    pub clear_result_on_submit: bool,
    pub grade_input: GradeInput,
    pub signature_place: String,
    pub destination_url: String,
    /// Idle time after which a server session is dropped.
    pub session_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            api_key: String::new(),
            api_base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            profile: PromptProfile::Standard,
            max_meetings: Some(DEFAULT_MAX_MEETINGS),
            clear_result_on_submit: true,
            grade_input: GradeInput::FreeText,
            signature_place: DEFAULT_SIGNATURE_PLACE.into(),
            destination_url: DEFAULT_DESTINATION_URL.into(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

// The key never reaches logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field(
                "api_key",
                &if self.api_key.trim().is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("profile", &self.profile)
            .field("max_meetings", &self.max_meetings)
            .field("clear_result_on_submit", &self.clear_result_on_submit)
            .field("grade_input", &self.grade_input)
            .field("signature_place", &self.signature_place)
            .field("destination_url", &self.destination_url)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl Settings {
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            profile: self.profile,
            max_meetings: self.max_meetings,
            clear_result_on_submit: self.clear_result_on_submit,
            grade_input: self.grade_input,
        }
    }

    pub fn gemini_config(&self) -> anyhow::Result<GeminiConfig> {
        let mut raw = self.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .with_context(|| format!("invalid generation service url '{}'", self.api_base_url))?;
        Ok(GeminiConfig {
            base_url,
            model: self.model.clone(),
            api_key: self.api_key.clone(),
        })
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "bind_addr" => self.bind_addr = value,
            "api_key" => self.api_key = value,
            "api_base_url" => self.api_base_url = value,
            "model" => self.model = value,
            "profile" => match PromptProfile::from_name(&value) {
                Some(profile) => self.profile = profile,
                None => warn!(value = %value, "ignoring unknown prompt profile"),
            },
            "max_meetings" => match value.trim().parse::<u32>() {
                Ok(0) => self.max_meetings = None,
                Ok(max) => self.max_meetings = Some(max),
                Err(_) => warn!(value = %value, "ignoring invalid max_meetings"),
            },
            "clear_result_on_submit" => match parse_flag(&value) {
                Some(flag) => self.clear_result_on_submit = flag,
                None => warn!(value = %value, "ignoring invalid clear_result_on_submit"),
            },
            "grade_input" => match value.trim() {
                "free_text" => self.grade_input = GradeInput::FreeText,
                "level_list" => self.grade_input = GradeInput::LevelList,
                _ => warn!(value = %value, "ignoring unknown grade_input"),
            },
            "signature_place" => self.signature_place = value,
            "destination_url" => self.destination_url = value,
            "session_ttl_secs" => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.session_ttl = Duration::from_secs(secs),
                _ => warn!(value = %value, "ignoring invalid session_ttl_secs"),
            },
            _ => warn!(key, "ignoring unknown settings key"),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Env names checked per key, lowest precedence first.
const ENV_KEYS: &[(&str, &[&str])] = &[
    ("bind_addr", &["RPM_BIND", "APP__BIND_ADDR"]),
    ("api_key", &["API_KEY", "GEMINI_API_KEY", "APP__API_KEY"]),
    ("api_base_url", &["APP__API_BASE_URL"]),
    ("model", &["APP__MODEL"]),
    ("profile", &["APP__PROFILE"]),
    ("max_meetings", &["APP__MAX_MEETINGS"]),
    ("clear_result_on_submit", &["APP__CLEAR_RESULT_ON_SUBMIT"]),
    ("grade_input", &["APP__GRADE_INPUT"]),
    ("signature_place", &["APP__SIGNATURE_PLACE"]),
    ("destination_url", &["APP__DESTINATION_URL"]),
    ("session_ttl_secs", &["APP__SESSION_TTL_SECS"]),
];

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional settings file, then the environment.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<toml::Table>(&raw) {
            Ok(table) => {
                for (key, value) in table {
                    let value = match value {
                        toml::Value::String(s) => s,
                        toml::Value::Integer(i) => i.to_string(),
                        toml::Value::Boolean(b) => b.to_string(),
                        other => {
                            warn!(key = %key, kind = other.type_str(), "ignoring non-scalar setting");
                            continue;
                        }
                    };
                    settings.set(&key, value);
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
        }
    }

    for &(key, names) in ENV_KEYS {
        for &name in names {
            if let Some(v) = env(name) {
                settings.set(key, v);
            }
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
