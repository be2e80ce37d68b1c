use std::sync::Arc;

use super::{assets, authenticate, handler, handlers, App};
use crate::handler::Endpoint;
use crate::health;
use crate::middleware::{log_request, recover_panic, secure_headers, Chain, RequireAuthentication};
use crate::router::Router;

/// Builds the complete application.
///
/// Three chains share their prefixes:
/// - `standard` wraps the whole router, so panics, logging and security
///   headers cover every response including 404s;
/// - `dynamic` loads the session and confirms the logged-in user;
/// - `protected` extends `dynamic` with the authentication gate.
pub fn routes(app: Arc<App>) -> Endpoint {
    let dynamic = Chain::new()
        .append(app.sessions.clone())
        .append(authenticate(Arc::clone(&app)));
    let protected = dynamic.append(RequireAuthentication::default());

    let router = Router::new()
        .get("/static/{*filepath}", handler(&app, assets::serve))
        .get("/ping", health::ping)
        .get("/", dynamic.then(handler(&app, handlers::home)))
        .get("/about", dynamic.then(handler(&app, handlers::about)))
        .get("/snippet/view/{id}", dynamic.then(handler(&app, handlers::snippet_view)))
        .get("/user/signup", dynamic.then(handler(&app, handlers::user_signup)))
        .post("/user/signup", dynamic.then(handler(&app, handlers::user_signup_post)))
        .get("/user/login", dynamic.then(handler(&app, handlers::user_login)))
        .post("/user/login", dynamic.then(handler(&app, handlers::user_login_post)))
        .get("/snippet/create", protected.then(handler(&app, handlers::snippet_create)))
        .post("/snippet/create", protected.then(handler(&app, handlers::snippet_create_post)))
        .post("/user/logout", protected.then(handler(&app, handlers::user_logout_post)))
        .get("/account/view", protected.then(handler(&app, handlers::account_view)))
        .get(
            "/account/password/update",
            protected.then(handler(&app, handlers::account_password_update)),
        )
        .post(
            "/account/password/update",
            protected.then(handler(&app, handlers::account_password_update_post)),
        );

    let standard = Chain::new()
        .append(recover_panic)
        .append(log_request)
        .append(secure_headers);
    standard.then(router)
}
