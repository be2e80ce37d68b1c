//! Store-backed sessions.
//!
//! A session is a string→string map keyed by an opaque token the client
//! carries in a cookie. The [`SessionManager`] middleware loads the session
//! before the wrapped endpoint runs, exposes it through the request's
//! extensions as a [`Session`] handle, and commits any change back to the
//! [`SessionStore`] when the endpoint finishes, on every exit path.
//!
//! ```rust
//! use snippetbox::session::Session;
//! use snippetbox::{Request, Response};
//!
//! async fn handler(req: Request) -> Response {
//!     let Some(session) = Session::from_request(&req) else {
//!         return Response::text("no session middleware in front of this route");
//!     };
//!     let flash = session.pop_string("flash").unwrap_or_default();
//!     session.put("visited", true);
//!     Response::text(flash)
//! }
//! ```

mod manager;
mod store;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::request::Request;

pub use manager::{SessionManager, DEFAULT_COOKIE_NAME, DEFAULT_LIFETIME};
pub use store::{MemoryStore, SessionRecord, SessionStore};

/// Failures surfaced by a [`SessionStore`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session backend unavailable: {0}")]
    Backend(String),
}

/// Lifecycle of a session within one request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SessionStatus {
    Unmodified,
    Modified,
    Destroyed,
}

#[derive(Debug)]
struct SessionState {
    token: Option<String>,
    data: HashMap<String, String>,
    deadline: DateTime<Utc>,
    lifetime: Duration,
    status: SessionStatus,
    /// Tokens replaced by `renew_token` that must be deleted at commit.
    stale_tokens: Vec<String>,
}

/// A request's session.
///
/// Cheap to clone; all clones share the same state, so a value put by a
/// handler is visible to the session middleware that commits it.
#[derive(Clone, Debug)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

/// Everything the manager needs to persist a session, taken atomically.
#[derive(Debug)]
pub(crate) struct CommitPlan {
    pub(crate) status: SessionStatus,
    pub(crate) token: Option<String>,
    pub(crate) record: SessionRecord,
    pub(crate) stale_tokens: Vec<String>,
}

impl Session {
    pub(crate) fn fresh(lifetime: Duration) -> Self {
        Self::with_state(SessionState {
            token: None,
            data: HashMap::new(),
            deadline: Utc::now() + lifetime,
            lifetime,
            status: SessionStatus::Unmodified,
            stale_tokens: Vec::new(),
        })
    }

    pub(crate) fn loaded(token: String, record: SessionRecord, lifetime: Duration) -> Self {
        Self::with_state(SessionState {
            token: Some(token),
            data: record.data,
            deadline: record.deadline,
            lifetime,
            status: SessionStatus::Unmodified,
            stale_tokens: Vec::new(),
        })
    }

    fn with_state(state: SessionState) -> Self {
        Self { inner: Arc::new(Mutex::new(state)) }
    }

    /// The session loaded for `req` by the session middleware, if any.
    pub fn from_request(req: &Request) -> Option<Session> {
        req.extensions().get::<Session>().cloned()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // No code path panics while holding the lock, so a poisoned mutex
        // still holds consistent data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads `key` and parses it as `T`. `None` if absent or unparsable.
    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        self.state().data.get(key).and_then(|v| v.parse().ok())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.state().data.get(key).cloned()
    }

    pub fn put(&self, key: &str, value: impl ToString) {
        let mut state = self.state();
        state.data.insert(key.to_owned(), value.to_string());
        state.status = SessionStatus::Modified;
    }

    /// Reads and removes `key` in one step: the flash-message primitive.
    pub fn pop<T: FromStr>(&self, key: &str) -> Option<T> {
        self.pop_string(key).and_then(|v| v.parse().ok())
    }

    pub fn pop_string(&self, key: &str) -> Option<String> {
        let mut state = self.state();
        let value = state.data.remove(key);
        if value.is_some() {
            state.status = SessionStatus::Modified;
        }
        value
    }

    pub fn exists(&self, key: &str) -> bool {
        self.state().data.contains_key(key)
    }

    pub fn remove(&self, key: &str) {
        let mut state = self.state();
        if state.data.remove(key).is_some() {
            state.status = SessionStatus::Modified;
        }
    }

    /// Removes every key but keeps the session (and its token) alive.
    pub fn clear(&self) {
        let mut state = self.state();
        if !state.data.is_empty() {
            state.data.clear();
            state.status = SessionStatus::Modified;
        }
    }

    /// Replaces the token while keeping the data.
    ///
    /// Call at every privilege change (login, logout) so a token planted
    /// before authentication is worthless afterwards. The old token is
    /// deleted from the store when the session is committed.
    pub fn renew_token(&self) {
        let mut state = self.state();
        if let Some(old) = state.token.take() {
            state.stale_tokens.push(old);
        }
        state.token = Some(generate_token());
        state.deadline = Utc::now() + state.lifetime;
        state.status = SessionStatus::Modified;
    }

    /// Deletes the session from the store and expires the client's cookie.
    pub fn destroy(&self) {
        let mut state = self.state();
        state.data.clear();
        state.status = SessionStatus::Destroyed;
    }

    /// The current token; `None` for a new session that was never saved.
    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.state().deadline
    }

    /// Snapshot for the commit step. Resets the status so a second commit of
    /// the same request (drop guard racing a normal exit) is a no-op.
    pub(crate) fn take_commit_plan(&self) -> CommitPlan {
        let mut state = self.state();
        let status = state.status;
        if status == SessionStatus::Modified && state.token.is_none() {
            state.token = Some(generate_token());
        }
        state.status = SessionStatus::Unmodified;
        CommitPlan {
            status,
            token: state.token.clone(),
            record: SessionRecord { data: state.data.clone(), deadline: state.deadline },
            stale_tokens: std::mem::take(&mut state.stale_tokens),
        }
    }
}

/// 128 bits from the OS RNG, hex-encoded.
fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
