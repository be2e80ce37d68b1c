//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. A route maps to exactly
//! one handler, usually an [`Endpoint`](crate::Endpoint) produced by a
//! middleware [`Chain`](crate::middleware::Chain), so per-route concerns
//! (sessions, authentication) live in the chain rather than in the router.
//!
//! The router is itself a [`Handler`], so a chain can wrap the whole routing
//! table, including the 404 and 405 answers it produces for misses.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{private, BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup. Each registration returns `self` so
/// registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

/// Outcome of a lookup.
pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path exists, but only under these methods.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`:
    ///
    /// ```rust,no_run
    /// # use snippetbox::{Method, Request, Response, Router};
    /// # async fn view(_: Request) -> Response { Response::text("") }
    /// # async fn asset(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get, "/snippet/view/{id}",  view)
    ///     .on(Method::Get, "/static/{*filepath}", asset);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are static, so this is a startup bug.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Post, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        if let Some(found) = self.find(method, path) {
            return found;
        }
        // HEAD falls back to the GET route; hyper drops the body on the wire.
        if method == Method::Head {
            if let Some(found) = self.find(Method::Get, path) {
                return found;
            }
        }

        let mut allowed: BTreeSet<Method> = self.routes.iter()
            .filter(|(m, tree)| **m != method && tree.at(path).is_ok())
            .map(|(m, _)| *m)
            .collect();
        if allowed.contains(&Method::Get) {
            allowed.insert(Method::Head);
        }
        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allowed.into_iter().collect())
        }
    }

    fn find(&self, method: Method, path: &str) -> Option<Lookup> {
        let matched = self.routes.get(&method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some(Lookup::Found(Arc::clone(matched.value), params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl ErasedHandler for Router {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Lookup::Found(handler, params) => {
                req.set_params(params);
                handler.call(req)
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed.iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Box::pin(async move {
                    let mut res = Response::status(Status::MethodNotAllowed);
                    res.set_header("allow", &allow);
                    res
                })
            }
            Lookup::NotFound => Box::pin(async { Response::status(Status::NotFound) }),
        }
    }
}

impl private::Sealed for Router {}

impl Handler for Router {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}
