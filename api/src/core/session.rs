//! Per-session state held in process memory.
//!
//! Sessions are keyed by an opaque UUIDv4 carried in the `rag_session`
//! cookie. Each one remembers whether the demo corpus was ingested and
//! whether a question is currently being answered. Sessions idle for longer
//! than the store's TTL are evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use tracing::{debug, warn};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "rag_session";
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Answering,
}

pub struct SessionContext {
    id: Uuid,
    /// Held across ingestion so concurrent first requests run it once.
    pub(crate) ingested: tokio::sync::Mutex<bool>,
    state: Mutex<InteractionState>,
    last_seen: Mutex<Instant>,
}

impl SessionContext {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            ingested: tokio::sync::Mutex::new(false),
            state: Mutex::new(InteractionState::Idle),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// A context for one request that is not kept in any store.
    pub fn detached() -> Arc<Self> {
        Arc::new(Self::new(Uuid::new_v4()))
    }

    fn touch(&self, now: Instant) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    fn expired(&self, now: Instant, ttl: Duration) -> bool {
        let last = *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        self.state() == InteractionState::Idle && now.saturating_duration_since(last) >= ttl
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> InteractionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn is_ingested(&self) -> bool {
        *self.ingested.lock().await
    }

    /// Moves idle → answering. `None` if a question is already in flight.
    pub fn try_begin_answering(self: &Arc<Self>) -> Option<AnsweringGuard> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == InteractionState::Answering {
            return None;
        }
        *state = InteractionState::Answering;
        Some(AnsweringGuard {
            session: Arc::clone(self),
        })
    }
}

/// Returns the session to idle when dropped, whatever the outcome.
pub struct AnsweringGuard {
    session: Arc<SessionContext>,
}

impl Drop for AnsweringGuard {
    fn drop(&mut self) {
        let mut state = self
            .session
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *state = InteractionState::Idle;
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Arc<SessionContext>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store evicting sessions idle for at least `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Session for `id`, or a fresh one. The flag is `true` when created.
    ///
    /// Expired idle sessions are swept first; a session still answering is
    /// kept regardless of age.
    pub fn get_or_create(&self, id: Option<Uuid>) -> (Arc<SessionContext>, bool) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| !s.expired(now, self.ttl));
        if sessions.len() < before {
            debug!(evicted = before - sessions.len(), "expired sessions evicted");
        }

        if let Some(existing) = id.and_then(|id| sessions.get(&id)) {
            existing.touch(now);
            return (existing.clone(), false);
        }
        let id = Uuid::new_v4();
        let session = Arc::new(SessionContext::new(id));
        sessions.insert(id, session.clone());
        debug!(session = %id, total = sessions.len(), "session created");
        (session, true)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Session id from the `Cookie` header, if present and well-formed.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a session.
pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Adds `Set-Cookie` for a session created by this request.
pub fn attach_session_cookie(mut resp: Response, session: &SessionContext, created: bool) -> Response {
    if !created {
        return resp;
    }
    match HeaderValue::from_str(&session_cookie(session.id())) {
        Ok(v) => {
            resp.headers_mut().append(header::SET_COOKIE, v);
        }
        Err(e) => warn!(error = %e, "could not encode session cookie"),
    }
    resp
}
