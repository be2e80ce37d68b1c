//! Middleware layer.
//!
//! A middleware turns one [`Endpoint`] into another. It is the place for
//! cross-cutting concerns: panic containment, request logging, security
//! headers, session load/save and the authentication gate.
//!
//! The easiest way to write one is an async function (or a closure returning
//! a future) that receives the request and the next endpoint:
//!
//! ```rust
//! use snippetbox::{Endpoint, Request, Response};
//!
//! async fn server_header(req: Request, next: Endpoint) -> Response {
//!     let mut res = next.call(req).await;
//!     res.set_header("server", "snippetbox");
//!     res
//! }
//! ```
//!
//! Anything before `next.call(..)` is the middleware's *pre* step, anything
//! after it the *post* step. Returning without calling `next` short-circuits
//! the rest of the chain. Types that need their own configuration implement
//! [`Middleware`] directly (see [`RequireAuthentication`] and
//! [`SessionManager`](crate::session::SessionManager)).

mod auth;
mod chain;
mod headers;
mod recover;
mod trace;

use std::future::Future;

use crate::handler::Endpoint;
use crate::request::Request;
use crate::response::IntoResponse;

pub use auth::{RequireAuthentication, AUTHENTICATED_USER_ID};
pub use chain::Chain;
pub use headers::secure_headers;
pub(crate) use headers::apply_security_headers;
pub use recover::recover_panic;
pub(crate) use recover::panic_message;
pub use trace::log_request;

/// A transformation from one [`Endpoint`] to another.
///
/// Implementations must not keep per-request state in `self`: `wrap` is
/// called once when a chain is finalised, and the endpoint it returns serves
/// every subsequent request concurrently.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: Endpoint) -> Endpoint;
}

/// Every `async fn(Request, Endpoint) -> impl IntoResponse` is a middleware.
/// Closures qualify too, which is how middleware capture shared dependencies.
impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Endpoint) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn wrap(&self, next: Endpoint) -> Endpoint {
        let f = self.clone();
        Endpoint::new(move |req: Request| {
            let fut = f(req, next.clone());
            async move { fut.await.into_response() }
        })
    }
}
