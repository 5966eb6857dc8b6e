use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use generation::GenerationBackend;
use planner::{config::DEFAULT_SESSION_TTL, ControllerConfig, PlannerStore};
use shared::protocol::SessionId;
use tokio::sync::{Mutex, RwLock};

pub(crate) type SharedStore = Arc<Mutex<PlannerStore>>;

pub(crate) struct SessionEntry {
    pub(crate) store: SharedStore,
    pub(crate) last_seen: Instant,
}

impl SessionEntry {
    pub(crate) fn new(store: PlannerStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            last_seen: Instant::now(),
        }
    }
}

pub(crate) struct AppState {
    pub(crate) sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    pub(crate) backend: Arc<dyn GenerationBackend>,
    pub(crate) controller: ControllerConfig,
    pub(crate) signature_place: String,
    /// Sessions idle for this long are dropped on the next session create.
    pub(crate) session_ttl: Duration,
}

impl AppState {
    pub(crate) fn new(
        backend: Arc<dyn GenerationBackend>,
        controller: ControllerConfig,
        signature_place: impl Into<String>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            backend,
            controller,
            signature_place: signature_place.into(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub(crate) fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
