//! HTTP status codes as a typed enum.
//!
//! Only the codes the application actually answers with. Use [`Status`]
//! anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use snippetbox::{Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! Response::builder()
//!     .status(Status::UnprocessableContent)
//!     .html("<p>Please fix the errors below</p>");
//! ```

/// Status codes emitted by snippetbox.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    NoContent,            // 204

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    Found,                // 302
    SeeOther,             // 303
    NotModified,          // 304

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    Unauthorized,         // 401
    Forbidden,            // 403
    NotFound,             // 404
    MethodNotAllowed,     // 405
    ContentTooLarge,      // 413
    UnprocessableContent, // 422

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
    ServiceUnavailable,   // 503
}

impl Status {
    /// The canonical reason phrase, used as the body of bare error responses.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok                   => "OK",
            Self::Created              => "Created",
            Self::NoContent            => "No Content",
            Self::Found                => "Found",
            Self::SeeOther             => "See Other",
            Self::NotModified          => "Not Modified",
            Self::BadRequest           => "Bad Request",
            Self::Unauthorized         => "Unauthorized",
            Self::Forbidden            => "Forbidden",
            Self::NotFound             => "Not Found",
            Self::MethodNotAllowed     => "Method Not Allowed",
            Self::ContentTooLarge      => "Content Too Large",
            Self::UnprocessableContent => "Unprocessable Content",
            Self::InternalServerError  => "Internal Server Error",
            Self::ServiceUnavailable   => "Service Unavailable",
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::Created              => 201,
            Status::NoContent            => 204,
            Status::Found                => 302,
            Status::SeeOther             => 303,
            Status::NotModified          => 304,
            Status::BadRequest           => 400,
            Status::Unauthorized         => 401,
            Status::Forbidden            => 403,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::ContentTooLarge      => 413,
            Status::UnprocessableContent => 422,
            Status::InternalServerError  => 500,
            Status::ServiceUnavailable   => 503,
        }
    }
}

impl PartialEq<Status> for u16 {
    fn eq(&self, other: &Status) -> bool {
        *self == u16::from(*other)
    }
}
