//! Security headers.

use crate::handler::Endpoint;
use crate::request::Request;
use crate::response::Response;

const SECURITY_HEADERS: [(&str, &str); 5] = [
    (
        "content-security-policy",
        "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com",
    ),
    ("referrer-policy", "origin-when-cross-origin"),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "deny"),
    ("x-xss-protection", "0"),
];

/// Adds the standard security headers to every response.
///
/// Never rejects a request. A handler that sets one of these headers itself
/// keeps its own value.
///
/// A panic further in unwinds past this step; the `500` that
/// [`recover_panic`](super::recover_panic) builds carries the same set.
pub async fn secure_headers(req: Request, next: Endpoint) -> Response {
    let mut res = next.call(req).await;
    apply_security_headers(&mut res);
    res
}

/// Adds every security header `res` does not already carry.
pub(crate) fn apply_security_headers(res: &mut Response) {
    for (name, value) in SECURITY_HEADERS {
        res.set_default_header(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Chain;
    use crate::Status;

    #[tokio::test]
    async fn headers_set_on_every_response() {
        let endpoint = Chain::new()
            .append(secure_headers)
            .then(|_req: Request| async { Status::NotFound });

        let res = endpoint.call(Request::builder().build()).await;
        assert_eq!(res.status_code(), Status::NotFound);
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(res.header(name), Some(value), "{name}");
        }
    }

    #[tokio::test]
    async fn panic_response_still_carries_headers() {
        use crate::middleware::{log_request, recover_panic};

        let endpoint = Chain::new()
            .append(recover_panic)
            .append(log_request)
            .append(secure_headers)
            .then(|_req: Request| async {
                if true {
                    panic!("template missing");
                }
                Response::text("unreachable")
            });

        let res = endpoint.call(Request::builder().uri("/").build()).await;
        assert_eq!(res.status_code(), Status::InternalServerError);
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(res.header(name), Some(value), "{name}");
        }
    }

    #[tokio::test]
    async fn handler_value_wins() {
        let endpoint = Chain::new().append(secure_headers).then(|_req: Request| async {
            Response::builder().header("x-frame-options", "sameorigin").text("embed me")
        });

        let res = endpoint.call(Request::builder().build()).await;
        assert_eq!(res.header("x-frame-options"), Some("sameorigin"));
    }
}
