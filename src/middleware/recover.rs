//! Panic containment.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::error;

use super::apply_security_headers;
use crate::handler::Endpoint;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Turns a panic anywhere downstream into a generic `500` and asks the
/// server to close the connection afterwards. The `500` carries the
/// security headers, since the unwind skipped every post step inside.
///
/// The panic is logged with the request's method and URI; the client only
/// ever sees the reason phrase. Work spawned onto other tasks is outside this
/// call stack and is not covered; see [`background::spawn`](crate::background::spawn).
pub async fn recover_panic(req: Request, next: Endpoint) -> Response {
    let method = req.method();
    let uri = req.uri();

    match AssertUnwindSafe(next.call(req)).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => {
            error!(
                %method,
                %uri,
                panic = %panic_message(payload.as_ref()),
                "handler panicked"
            );
            let mut res = Response::status(Status::InternalServerError);
            res.set_header("connection", "close");
            apply_security_headers(&mut res);
            res
        }
    }
}

/// Best-effort extraction of the message passed to `panic!`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
