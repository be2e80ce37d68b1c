//! Handler trait, type erasure, and the composed [`Endpoint`].
//!
//! # How async handlers are stored
//!
//! The router and the middleware chain need to hold handlers of *different*
//! types uniformly, so every handler is erased behind a trait object:
//!
//! ```text
//! async fn home(req: Request) -> Response { … }   ← user writes this
//!        ↓ Endpoint::new(home) / router.get("/", home)
//! home.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(home))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! endpoint.call(req)  at request time            ← one vtable dispatch
//! ```
//!
//! An [`Endpoint`] is just a cloneable `BoxedHandler` with a public face. It
//! is what a [`Chain`](crate::middleware::Chain) produces and what every
//! middleware receives as its `next`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `async fn` (or closure returning a future)
/// with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// and for [`Endpoint`] and [`Router`](crate::Router), so composed chains
/// and whole routers can be nested anywhere a handler is expected.
///
/// The trait is **sealed**: only the impls in this crate can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

pub(crate) mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// A type-erased, cloneable handler.
///
/// Cloning costs one atomic increment; every clone dispatches to the same
/// underlying handler. Invoking an endpoint never mutates it, so one endpoint
/// can serve any number of concurrent requests.
#[derive(Clone)]
pub struct Endpoint(BoxedHandler);

impl Endpoint {
    pub fn new(handler: impl Handler) -> Self {
        Self(handler.into_boxed_handler())
    }

    /// Runs the handler (and whatever it wraps) for one request.
    pub fn call(&self, req: Request) -> impl Future<Output = Response> + Send + 'static {
        self.0.call(req)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Endpoint")
    }
}

impl private::Sealed for Endpoint {}

impl Handler for Endpoint {
    fn into_boxed_handler(self) -> BoxedHandler {
        self.0
    }
}
