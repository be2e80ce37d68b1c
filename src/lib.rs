//! # snippetbox
//!
//! A small web application for pasting and sharing text snippets, built on
//! hyper with a composable middleware layer.
//!
//! ## Layers
//!
//! - [`Server`] accepts connections and turns every hyper request into a
//!   [`Request`] for one composed [`Endpoint`].
//! - [`middleware`] holds the cross-cutting concerns (panic containment,
//!   request logging, security headers, the authentication gate) and the
//!   [`Chain`](middleware::Chain) that composes them.
//! - [`session`] loads and saves store-backed sessions around a request.
//! - [`Router`] dispatches by method and path; [`web`] holds the handlers
//!   and the route table.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use snippetbox::middleware::{log_request, recover_panic, secure_headers, Chain};
//! use snippetbox::{health, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), snippetbox::Error> {
//!     let router = Router::new().get("/ping", health::ping);
//!     let app = Chain::new()
//!         .append(recover_panic)
//!         .append(log_request)
//!         .append(secure_headers)
//!         .then(router);
//!
//!     Server::bind("127.0.0.1:4000")?.serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod background;
pub mod config;
pub mod health;
pub mod middleware;
pub mod models;
pub mod session;
pub mod validator;
pub mod web;

pub use error::Error;
pub use handler::{Endpoint, Handler};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, MAX_BODY_SIZE};
pub use status::Status;
