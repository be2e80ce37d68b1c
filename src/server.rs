//! HTTP server and graceful shutdown.
//!
//! The server owns the socket and nothing else: it turns each hyper request
//! into a [`Request`], hands it to the one composed endpoint it was given,
//! and writes back whatever [`Response`] comes out. Bodies are capped at
//! [`MAX_BODY_SIZE`]; TLS and timeouts are the reverse proxy's job.
//!
//! On **SIGTERM** or **Ctrl-C** the server:
//! 1. Immediately stops `listener.accept()`; no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::handler::{Endpoint, Handler};
use crate::method::Method;
use crate::middleware::apply_security_headers;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use snippetbox::Server;
    /// let server = Server::bind("127.0.0.1:4000").unwrap();
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse().map_err(|source| Error::InvalidAddress {
            addr: addr.to_owned(),
            source,
        })?;
        Ok(Self { addr })
    }

    /// Starts accepting connections and dispatching them through `app`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, app: impl Handler) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let app = Arc::new(Endpoint::new(app));

        info!(addr = %self.addr, "snippetbox listening");

        // Tracks every spawned connection task so shutdown can wait for them.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(app, req, remote_addr).await }
                        });

                        // HTTP/1.1 and HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            warn!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("snippetbox stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Largest request body the server buffers: 10 MiB.
pub const MAX_BODY_SIZE: usize = 10 << 20;

/// Converts one hyper request and runs it through the application endpoint.
///
/// Failures are answered here (405 for unknown methods, 400 for unreadable
/// bodies, 413 for oversized ones) so hyper never sees an error.
async fn dispatch(
    app: Arc<Endpoint>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<http_body_util::Full<bytes::Bytes>>, std::convert::Infallible> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Ok(reject(Status::MethodNotAllowed).into_inner());
    };

    let (parts, body) = req.into_parts();
    let body = match read_body(body, MAX_BODY_SIZE).await {
        Ok(body) => body,
        Err(status) => {
            warn!(peer = %remote_addr, status = u16::from(status), "rejected request body");
            return Ok(reject(status).into_inner());
        }
    };

    // Non-UTF-8 header values cannot be represented and are skipped.
    let headers = parts.headers.iter()
        .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
        .collect();

    let request = Request::builder()
        .method(method)
        .uri(parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/"))
        .headers(headers)
        .remote_addr(remote_addr)
        .body(body)
        .build();

    let response = app.call(request).await;
    Ok(response.into_inner())
}

/// Buffers `body`, refusing to hold more than `limit` bytes.
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, Status>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(Status::ContentTooLarge),
        Err(e) => {
            debug!("reading request body failed: {e}");
            Err(Status::BadRequest)
        }
    }
}

/// A response produced before the middleware chain runs. It still gets the
/// security headers every other response carries.
fn reject(status: Status) -> Response {
    let mut res = Response::status(status);
    apply_security_headers(&mut res);
    res
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => { signal.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
