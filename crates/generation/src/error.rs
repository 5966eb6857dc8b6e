use std::fmt;

use thiserror::Error;

/// First structural problem found in a generation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedResponse {
    pub path: String,
    pub problem: String,
}

impl MalformedResponse {
    pub fn new(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for MalformedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.problem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    Configuration,
    Transport,
    Service,
    Malformed,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation API key is not configured")]
    MissingApiKey,
    #[error("invalid generation endpoint: {0}")]
    Endpoint(String),
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation service returned an unreadable envelope: {0}")]
    Envelope(String),
    #[error("malformed generation response at {0}")]
    Malformed(MalformedResponse),
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerationError::MissingApiKey | GenerationError::Endpoint(_) => {
                GenerationErrorKind::Configuration
            }
            GenerationError::Transport(_) => GenerationErrorKind::Transport,
            GenerationError::Status { .. } | GenerationError::Envelope(_) => {
                GenerationErrorKind::Service
            }
            GenerationError::Malformed(_) => GenerationErrorKind::Malformed,
        }
    }
}

impl From<MalformedResponse> for GenerationError {
    fn from(value: MalformedResponse) -> Self {
        GenerationError::Malformed(value)
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(value: reqwest::Error) -> Self {
        GenerationError::Transport(value.to_string())
    }
}
