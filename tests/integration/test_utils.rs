//! Test utilities for integration tests.
//!
//! [`TestClient`] drives the fully composed application endpoint in-process,
//! carrying the session cookie between requests like a browser would.

use std::path::PathBuf;
use std::sync::Arc;

use snippetbox::models::{SnippetModel, UserModel};
use snippetbox::session::{MemoryStore, SessionManager, DEFAULT_COOKIE_NAME};
use snippetbox::web::{self, App};
use snippetbox::{Endpoint, Method, Request, RequestBuilder, Response};

pub const PASSWORD: &str = "pa55word-long";

pub struct TestClient {
    pub app: Arc<App>,
    pub store: Arc<MemoryStore>,
    endpoint: Endpoint,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_static_dir(std::env::temp_dir().join("snippetbox-no-static"))
    }

    pub fn with_static_dir(static_dir: PathBuf) -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionManager::new(store.clone()).secure(false);
        let app = Arc::new(App {
            snippets: SnippetModel::new(),
            // Lowest cost bcrypt accepts; keeps the suite fast.
            users: UserModel::with_cost(4),
            sessions,
            static_dir,
        });
        let endpoint = web::routes(Arc::clone(&app));
        Self { app, store, endpoint, cookie: None }
    }

    /// Current session token, as the client would send it.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn set_cookie(&mut self, token: &str) {
        self.cookie = Some(token.to_owned());
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri)).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response {
        self.send(Request::builder().method(Method::Post).uri(uri).form(fields))
            .await
    }

    pub async fn send(&mut self, builder: RequestBuilder) -> Response {
        let builder = match &self.cookie {
            Some(token) => builder.header("cookie", &format!("{DEFAULT_COOKIE_NAME}={token}")),
            None => builder,
        };
        let res = self.endpoint.call(builder.build()).await;
        self.absorb_cookies(&res);
        res
    }

    fn absorb_cookies(&mut self, res: &Response) {
        let prefix = format!("{DEFAULT_COOKIE_NAME}=");
        for (name, value) in res.headers() {
            if !name.eq_ignore_ascii_case("set-cookie") {
                continue;
            }
            let Some(rest) = value.strip_prefix(&prefix) else { continue };
            let token = rest.split(';').next().unwrap_or_default();
            self.cookie = (!token.is_empty()).then(|| token.to_owned());
        }
    }

    pub async fn signup(&mut self, name: &str, email: &str) -> Response {
        self.post(
            "/user/signup",
            &[("name", name), ("email", email), ("password", PASSWORD)],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Response {
        self.post("/user/login", &[("email", email), ("password", password)])
            .await
    }

    /// Signs up and logs in `email`; returns the user id.
    pub async fn logged_in_as(&mut self, email: &str) -> i64 {
        let res = self.signup("Test User", email).await;
        assert_eq!(res.status_code(), 303, "signup failed: {}", res.body_text());
        let res = self.login(email, PASSWORD).await;
        assert_eq!(res.status_code(), 303, "login failed: {}", res.body_text());
        self.app.users.authenticate(email, PASSWORD).await.unwrap()
    }
}

pub fn set_cookie_headers(res: &Response) -> Vec<&str> {
    res.headers()
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
        .map(|(_, v)| v.as_str())
        .collect()
}
