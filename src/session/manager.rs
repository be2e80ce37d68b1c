//! Session load-and-save middleware.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::FutureExt;
use tracing::{error, warn};

use super::{CommitPlan, Session, SessionError, SessionStatus, SessionStore};
use crate::background;
use crate::handler::Endpoint;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Cookie carrying the session token unless configured otherwise.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Twelve hours, in minutes.
pub const DEFAULT_LIFETIME: i64 = 12 * 60;

/// Middleware that wraps session load and save around the next endpoint.
///
/// Must sit in front of anything that touches session state, the
/// [`RequireAuthentication`](crate::middleware::RequireAuthentication) gate
/// included.
///
/// The commit after the endpoint runs whatever way the endpoint exits:
/// - normal return: commit, then attach `set-cookie` if the token changed
///   or the data was modified;
/// - panic: commit, then resume the panic so outer containment answers it;
/// - request future dropped (client went away): a guard schedules the
///   commit on the runtime.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    lifetime: Duration,
    secure: bool,
}

impl SessionManager {
    /// Defaults: cookie `session`, 12 h lifetime, `Secure` cookies.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            lifetime: Duration::minutes(DEFAULT_LIFETIME),
            secure: true,
        }
    }

    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn cookie_name(mut self, name: &str) -> Self {
        self.cookie_name = name.to_owned();
        self
    }

    /// Whether the cookie carries the `Secure` attribute. Turn off only for
    /// plain-HTTP development setups.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    async fn handle(self, mut req: Request, next: Endpoint) -> Response {
        let session = match self.load(&req).await {
            Ok(session) => session,
            Err(e) => {
                error!(method = %req.method(), uri = %req.uri(), error = %e, "loading session failed");
                return Response::status(Status::InternalServerError);
            }
        };
        req.extensions_mut().insert(session.clone());

        let mut guard = CommitGuard { manager: Some(self.clone()), session: session.clone(), plan: None };
        let outcome = AssertUnwindSafe(next.call(req)).catch_unwind().await;

        // The guard holds the plan until the store has it: a request dropped
        // mid-commit is finished in the background.
        let plan = guard.stage(session.take_commit_plan());
        let committed = self.apply(plan).await;
        guard.disarm();

        let mut res = match outcome {
            Ok(res) => res,
            Err(payload) => {
                if let Err(e) = committed {
                    error!(error = %e, "saving session after panic failed");
                }
                panic::resume_unwind(payload);
            }
        };

        match committed {
            Ok(Some(cookie)) => {
                res.append_header("set-cookie", &cookie);
                res.append_header("vary", "Cookie");
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "saving session failed");
                return Response::status(Status::InternalServerError);
            }
        }
        res
    }

    async fn load(&self, req: &Request) -> Result<Session, SessionError> {
        let Some(token) = cookie_value(req, &self.cookie_name) else {
            return Ok(Session::fresh(self.lifetime));
        };
        match self.store.load(&token).await? {
            Some(record) => Ok(Session::loaded(token, record, self.lifetime)),
            None => Ok(Session::fresh(self.lifetime)),
        }
    }

    /// Persists `plan` and returns the `set-cookie` value to send, if any.
    ///
    /// Every step is idempotent, so a plan interrupted halfway can be
    /// applied again from the start.
    async fn apply(&self, plan: &CommitPlan) -> Result<Option<String>, SessionError> {
        for stale in &plan.stale_tokens {
            self.store.delete(stale).await?;
        }

        match (plan.status, plan.token.as_deref()) {
            (SessionStatus::Modified, Some(token)) => {
                let max_age = (plan.record.deadline - Utc::now()).num_seconds().max(0);
                self.store.save(token, plan.record.clone()).await?;
                Ok(Some(self.set_cookie(token, max_age)))
            }
            (SessionStatus::Destroyed, token) => {
                if let Some(token) = token {
                    self.store.delete(token).await?;
                }
                Ok(Some(self.set_cookie("", 0)))
            }
            _ => Ok(None),
        }
    }

    fn set_cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax",
            self.cookie_name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl Middleware for SessionManager {
    fn wrap(&self, next: Endpoint) -> Endpoint {
        let manager = self.clone();
        Endpoint::new(move |req: Request| manager.clone().handle(req, next.clone()))
    }
}

/// Commits the session if the request future is dropped mid-flight, either
/// while the endpoint runs or while the commit itself awaits the store.
struct CommitGuard {
    manager: Option<SessionManager>,
    session: Session,
    /// Taken from the session once the endpoint finished.
    plan: Option<CommitPlan>,
}

impl CommitGuard {
    fn stage(&mut self, plan: CommitPlan) -> &CommitPlan {
        self.plan.insert(plan)
    }

    fn disarm(&mut self) {
        self.manager = None;
    }
}

impl Drop for CommitGuard {
    fn drop(&mut self) {
        let Some(manager) = self.manager.take() else { return };
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("request aborted outside a runtime; session changes lost");
            return;
        }
        let plan = self
            .plan
            .take()
            .unwrap_or_else(|| self.session.take_commit_plan());
        background::spawn("session-commit", async move {
            if let Err(e) = manager.apply(&plan).await {
                error!(error = %e, "saving session of aborted request failed");
            }
        });
    }
}

/// Value of cookie `name` across all `cookie` headers of `req`.
fn cookie_value(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("cookie"))
        .flat_map(|(_, v)| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"').to_owned())
        .filter(|v| !v.is_empty())
}
