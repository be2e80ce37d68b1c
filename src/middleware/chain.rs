//! Ordered, immutable middleware chains.
//!
//! ```rust
//! use snippetbox::middleware::{log_request, recover_panic, secure_headers, Chain};
//! use snippetbox::Request;
//!
//! let standard = Chain::new()
//!     .append(recover_panic)
//!     .append(log_request)
//!     .append(secure_headers);
//!
//! let endpoint = standard.then(|_req: Request| async { "hello" });
//! ```
//!
//! For a chain `[m1, m2, m3]` wrapped around `h`, a request runs
//! `pre(m1) → pre(m2) → pre(m3) → h → post(m3) → post(m2) → post(m1)`.

use std::fmt;
use std::sync::Arc;

use crate::handler::{Endpoint, Handler};

use super::Middleware;

/// An ordered sequence of middleware.
///
/// A chain is a value: [`append`](Chain::append) and
/// [`extend`](Chain::extend) return a *new* chain and leave the receiver
/// untouched, so one chain can serve as the shared prefix of several others.
#[derive(Clone, Default)]
pub struct Chain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    /// An empty chain. `Chain::new().then(h)` behaves exactly like `h`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new chain with `middleware` added as the innermost layer.
    pub fn append(&self, middleware: impl Middleware) -> Self {
        let mut middlewares = self.middlewares.clone();
        middlewares.push(Arc::new(middleware));
        Self { middlewares }
    }

    /// Returns a new chain with every middleware of `other` appended, in order.
    pub fn extend(&self, other: &Chain) -> Self {
        let mut middlewares = self.middlewares.clone();
        middlewares.extend(other.middlewares.iter().cloned());
        Self { middlewares }
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Wraps `handler` in every middleware of the chain and returns the
    /// composed endpoint. The first middleware appended is the outermost.
    pub fn then(&self, handler: impl Handler) -> Endpoint {
        self.middlewares
            .iter()
            .rev()
            .fold(Endpoint::new(handler), |next, m| m.wrap(next))
    }
}

impl FromIterator<Arc<dyn Middleware>> for Chain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Middleware>>>(iter: I) -> Self {
        Self { middlewares: iter.into_iter().collect() }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.middlewares.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{Request, Response};

    type Trace = Arc<Mutex<Vec<String>>>;

    fn tracing_mw(name: &'static str, trace: &Trace) -> impl Middleware + Clone {
        let trace = Arc::clone(trace);
        move |req: Request, next: Endpoint| {
            let trace = Arc::clone(&trace);
            async move {
                trace.lock().unwrap().push(format!("pre {name}"));
                let res = next.call(req).await;
                trace.lock().unwrap().push(format!("post {name}"));
                res
            }
        }
    }

    fn terminal(trace: &Trace) -> impl Handler {
        let trace = Arc::clone(trace);
        move |_req: Request| {
            let trace = Arc::clone(&trace);
            async move {
                trace.lock().unwrap().push("handler".to_owned());
                Response::text("done")
            }
        }
    }

    fn take(trace: &Trace) -> Vec<String> {
        std::mem::take(&mut *trace.lock().unwrap())
    }

    #[tokio::test]
    async fn runs_in_nested_order() {
        let trace = Trace::default();
        let chain = Chain::new()
            .append(tracing_mw("m1", &trace))
            .append(tracing_mw("m2", &trace))
            .append(tracing_mw("m3", &trace));

        let res = chain.then(terminal(&trace)).call(Request::builder().build()).await;

        assert_eq!(res.body_text(), "done");
        assert_eq!(
            take(&trace),
            ["pre m1", "pre m2", "pre m3", "handler", "post m3", "post m2", "post m1"]
        );
    }

    #[tokio::test]
    async fn append_leaves_original_untouched() {
        let trace = Trace::default();
        let base = Chain::new().append(tracing_mw("base", &trace));
        let derived = base.append(tracing_mw("extra", &trace));
        assert_eq!(base.len(), 1);
        assert_eq!(derived.len(), 2);

        base.then(terminal(&trace)).call(Request::builder().build()).await;
        assert_eq!(take(&trace), ["pre base", "handler", "post base"]);

        derived.then(terminal(&trace)).call(Request::builder().build()).await;
        assert_eq!(
            take(&trace),
            ["pre base", "pre extra", "handler", "post extra", "post base"]
        );
    }

    #[tokio::test]
    async fn extend_appends_other_chain_in_order() {
        let trace = Trace::default();
        let outer = Chain::new().append(tracing_mw("a", &trace));
        let inner = Chain::new()
            .append(tracing_mw("b", &trace))
            .append(tracing_mw("c", &trace));

        outer.extend(&inner).then(terminal(&trace)).call(Request::builder().build()).await;
        assert_eq!(
            take(&trace),
            ["pre a", "pre b", "pre c", "handler", "post c", "post b", "post a"]
        );
        assert_eq!(outer.len(), 1);
    }

    #[tokio::test]
    async fn empty_chain_is_the_handler() {
        let trace = Trace::default();
        let chain = Chain::new();
        assert!(chain.is_empty());

        let res = chain.then(terminal(&trace)).call(Request::builder().build()).await;
        assert_eq!(res.body_text(), "done");
        assert_eq!(take(&trace), ["handler"]);
    }

    #[tokio::test]
    async fn duplicates_are_kept() {
        let trace = Trace::default();
        let mw = tracing_mw("dup", &trace);
        let chain = Chain::new().append(mw.clone()).append(mw);

        chain.then(terminal(&trace)).call(Request::builder().build()).await;
        assert_eq!(take(&trace), ["pre dup", "pre dup", "handler", "post dup", "post dup"]);
    }

    #[tokio::test]
    async fn composed_endpoint_is_reusable() {
        let trace = Trace::default();
        let endpoint = Chain::new().append(tracing_mw("m", &trace)).then(terminal(&trace));

        for _ in 0..3 {
            endpoint.call(Request::builder().build()).await;
        }
        assert_eq!(take(&trace).len(), 9);
    }

    #[tokio::test]
    async fn short_circuit_skips_inner_layers() {
        let trace = Trace::default();
        let deny = |_req: Request, _next: Endpoint| async { Response::text("denied") };
        let chain = Chain::new()
            .append(tracing_mw("outer", &trace))
            .append(deny)
            .append(tracing_mw("inner", &trace));

        let res = chain.then(terminal(&trace)).call(Request::builder().build()).await;
        assert_eq!(res.body_text(), "denied");
        assert_eq!(take(&trace), ["pre outer", "post outer"]);
    }

    #[test]
    fn from_iter_keeps_order() {
        let trace = Trace::default();
        let chain: Chain = [
            Arc::new(tracing_mw("x", &trace)) as Arc<dyn Middleware>,
            Arc::new(tracing_mw("y", &trace)),
        ]
        .into_iter()
        .collect();
        assert_eq!(chain.len(), 2);
    }
}
