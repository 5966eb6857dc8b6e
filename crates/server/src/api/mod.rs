use std::{sync::Arc, time::Instant};

use document::{render, render_page, PageMode, RenderOptions};
use generation::{GenerationBackend, GenerationErrorKind};
use planner::{EventRejected, PlannerStore, SubmitBlocked};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{Effect, FormEvent, FormOptions, GenerateResponse, SessionId, SessionSnapshot},
};
use tracing::{info, warn};

use crate::app_state::{AppState, SessionEntry, SharedStore};

pub fn options(state: &AppState) -> FormOptions {
    state.controller.form_options()
}

/// Creates a session with the default form, first dropping sessions that
/// have been idle longer than the configured TTL.
pub async fn create_session(state: &AppState) -> SessionSnapshot {
    let id = SessionId::new();
    let store = PlannerStore::new(state.controller);
    let snapshot = store.snapshot(id);

    let mut sessions = state.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|_, entry| entry.last_seen.elapsed() < state.session_ttl);
    let expired = before - sessions.len();
    if expired > 0 {
        info!(expired, "expired idle sessions");
    }
    sessions.insert(id, SessionEntry::new(store));
    info!(session = %id, live = sessions.len(), "session created");
    snapshot
}

pub async fn delete_session(state: &AppState, id: SessionId) -> Result<(), ApiError> {
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            info!(session = %id, "session deleted");
            Ok(())
        }
        None => Err(not_found(id)),
    }
}

/// Looks up a session and marks it as recently used.
async fn session(state: &AppState, id: SessionId) -> Result<SharedStore, ApiError> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    entry.last_seen = Instant::now();
    Ok(Arc::clone(&entry.store))
}

fn not_found(id: SessionId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("session {id} not found"))
}

pub async fn snapshot(state: &AppState, id: SessionId) -> Result<SessionSnapshot, ApiError> {
    let store = session(state, id).await?;
    let guard = store.lock().await;
    Ok(guard.snapshot(id))
}

pub async fn apply_event(
    state: &AppState,
    id: SessionId,
    event: FormEvent,
) -> Result<SessionSnapshot, ApiError> {
    let store = session(state, id).await?;
    let mut guard = store.lock().await;
    guard.apply(event).map_err(rejected)?;
    Ok(guard.snapshot(id))
}

/// Runs one generation for the session on a detached task, so the cycle
/// settles even when the caller goes away mid-call.
pub async fn generate(state: &AppState, id: SessionId) -> Result<GenerateResponse, ApiError> {
    let store = session(state, id).await?;
    let backend = Arc::clone(&state.backend);
    tokio::spawn(run_generation(store, backend, id))
        .await
        .map_err(|err| {
            warn!(session = %id, error = %err, "generation task did not complete");
            ApiError::new(ErrorCode::Internal, "generation task did not complete")
        })?
}

/// The session lock is released while the service call is in flight so
/// snapshots and edits stay responsive.
async fn run_generation(
    store: SharedStore,
    backend: Arc<dyn GenerationBackend>,
    id: SessionId,
) -> Result<GenerateResponse, ApiError> {
    let job = store.lock().await.begin_generation().map_err(blocked)?;

    let outcome = generation::generate(backend.as_ref(), &job.request).await;
    let failure = outcome.as_ref().err().map(|err| {
        let code = match err.kind() {
            GenerationErrorKind::Malformed => ErrorCode::MalformedResponse,
            GenerationErrorKind::Transport | GenerationErrorKind::Service => ErrorCode::Upstream,
            GenerationErrorKind::Configuration => ErrorCode::Internal,
        };
        ApiError::new(code, err.to_string())
    });

    let mut guard = store.lock().await;
    let effects = guard.finish_generation(outcome);
    if let Some(err) = failure {
        let alert = effects.iter().find_map(|effect| match effect {
            Effect::Alert { message } => Some(message.clone()),
            Effect::RevealOutput { .. } => None,
        });
        warn!(session = %id, code = ?err.code, "generation request failed");
        return Err(match alert {
            Some(alert) => err.with_alert(alert),
            None => err,
        });
    }
    Ok(GenerateResponse {
        snapshot: guard.snapshot(id),
        effects,
    })
}

pub async fn document_page(
    state: &AppState,
    id: SessionId,
    mode: PageMode,
) -> Result<String, ApiError> {
    let store = session(state, id).await?;
    let guard = store.lock().await;
    let (form, rpm) = guard.result_form().zip(guard.result()).ok_or_else(|| {
        ApiError::new(
            ErrorCode::NotFound,
            "no lesson plan has been generated for this session yet",
        )
    })?;
    let options = RenderOptions::today(state.signature_place.clone());
    let document = render(form, rpm, &options);
    Ok(render_page(&document, mode))
}

fn rejected(err: EventRejected) -> ApiError {
    ApiError::new(ErrorCode::Validation, err.to_string())
}

fn blocked(err: SubmitBlocked) -> ApiError {
    match err {
        SubmitBlocked::InFlight => ApiError::new(ErrorCode::Conflict, err.to_string()),
        SubmitBlocked::Incomplete(_) => ApiError::new(ErrorCode::Validation, err.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
