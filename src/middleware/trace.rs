//! Request logging.

use tracing::info;

use crate::handler::Endpoint;
use crate::request::Request;
use crate::response::Response;

/// Records remote address, method and URI of every request, then delegates.
///
/// Purely an observer: the request is passed on unchanged and the response
/// is returned as produced.
pub async fn log_request(req: Request, next: Endpoint) -> Response {
    let remote = req
        .remote_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_owned());

    info!(ip = %remote, method = %req.method(), uri = %req.uri(), "received request");

    next.call(req).await
}
