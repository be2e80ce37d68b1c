//! The snippetbox web application: handlers, forms, pages and the route
//! table that ties them to middleware chains.

mod assets;
mod auth;
mod forms;
mod handlers;
mod helpers;
mod routes;
mod templates;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::handler::Handler;
use crate::models::{SnippetModel, UserModel};
use crate::request::Request;
use crate::response::Response;
use crate::session::SessionManager;

pub use auth::{authenticate, Authenticated};
pub use forms::FormError;
pub use routes::routes;

/// Shared application state. One instance serves every request.
pub struct App {
    pub snippets: SnippetModel,
    pub users: UserModel,
    pub sessions: SessionManager,
    pub static_dir: PathBuf,
}

/// Adapts `async fn(Arc<App>, Request)` into a route handler.
fn handler<F, Fut>(app: &Arc<App>, f: F) -> impl Handler
where
    F: Fn(Arc<App>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let app = Arc::clone(app);
    move |req: Request| f(Arc::clone(&app), req)
}
