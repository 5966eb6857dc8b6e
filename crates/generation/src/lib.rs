use async_trait::async_trait;
use shared::domain::GeneratedRpm;
use tracing::{info, warn};

pub mod error;
pub mod gemini;
pub mod request;
pub mod schema;
pub mod validate;

pub use error::{GenerationError, GenerationErrorKind, MalformedResponse};
pub use gemini::{GeminiClient, GeminiConfig};
pub use request::{build_request, GenerationRequest};
pub use schema::SchemaDescriptor;

/// A remote text-generation service that answers with schema-shaped JSON.
///
/// Implementations issue exactly one call per invocation and return the raw
/// response text; decoding and validation happen in [`generate`].
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

pub async fn generate(
    backend: &dyn GenerationBackend,
    request: &GenerationRequest,
) -> Result<GeneratedRpm, GenerationError> {
    let raw = backend.complete(request).await?;
    match validate::decode_rpm(&raw, request.profile, request.expected_meetings) {
        Ok(rpm) => {
            info!(
                meetings = rpm.experience.meetings.len(),
                "generation response validated"
            );
            Ok(rpm)
        }
        Err(malformed) => {
            warn!(%malformed, "generation response failed validation");
            Err(malformed.into())
        }
    }
}
