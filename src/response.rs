//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] and return it. Middleware may inspect it
//! and add headers on the way out (security headers, `set-cookie`,
//! `cache-control`) before the server hands it to hyper.

use bytes::Bytes;
use http_body_util::Full;
use tracing::warn;

use crate::status::Status;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values for use with [`ResponseBuilder::bytes`].
#[derive(Clone, Copy, Debug)]
pub enum ContentType {
    Css,          // text/css; charset=utf-8
    Html,         // text/html; charset=utf-8
    Ico,          // image/x-icon
    Javascript,   // text/javascript; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Png,          // image/png
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Css         => "text/css; charset=utf-8",
            Self::Html        => "text/html; charset=utf-8",
            Self::Ico         => "image/x-icon",
            Self::Javascript  => "text/javascript; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Png         => "image/png",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }

    /// Best guess from a file extension; unknown extensions are binary.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "css"         => Self::Css,
            "html" | "htm" => Self::Html,
            "ico"         => Self::Ico,
            "js"          => Self::Javascript,
            "json"        => Self::Json,
            "png"         => Self::Png,
            "txt"         => Self::Text,
            _             => Self::OctetStream,
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use snippetbox::{Response, Status};
///
/// Response::html("<h1>Latest snippets</h1>");
/// Response::text("OK");
/// Response::status(Status::NotFound);
/// Response::redirect("/user/login");
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use snippetbox::{Response, Status};
///
/// Response::builder()
///     .status(Status::UnprocessableContent)
///     .header("cache-control", "no-store")
///     .html("<form>…</form>");
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK`, `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::bytes_raw(ContentType::Html.as_str(), body.into().into_bytes())
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw(ContentType::Text.as_str(), body.into().into_bytes())
    }

    /// Plain-text response whose body is the status' reason phrase: the
    /// generic, detail-free body used for every error page.
    pub fn status(code: Status) -> Self {
        Self::builder().status(code).text(code.reason())
    }

    /// `303 See Other` to `location`.
    pub fn redirect(location: &str) -> Self {
        Self::builder()
            .status(Status::SeeOther)
            .header("location", location)
            .no_body()
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    fn bytes_raw(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: Status::Ok.into(),
        }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Body as UTF-8 text; lossy, intended for assertions and logging.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Case-insensitive lookup of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces every header named `name` with a single value.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Sets `name` only if the handler did not set it already.
    pub fn set_default_header(&mut self, name: &str, value: &str) {
        if self.header(name).is_none() {
            self.headers.push((name.to_owned(), value.to_owned()));
        }
    }

    /// Adds a header line without touching existing ones (`set-cookie`, `vary`).
    pub fn append_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Converts into the hyper representation. Headers that are not valid
    /// HTTP are dropped with a warning rather than failing the whole response.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut out = http::Response::new(Full::new(Bytes::from(self.body)));
        *out.status_mut() = http::StatusCode::from_u16(self.status)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        let headers = out.headers_mut();
        for (name, value) in self.headers {
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(&value),
            ) {
                (Ok(n), Ok(v)) => { headers.append(n, v); }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        out
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with an HTML body.
    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Html.as_str(), body.into().into_bytes())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text.as_str(), body.into().into_bytes())
    }

    /// Terminate with a typed body. Used for static assets.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(content_type.as_str(), body)
    }

    /// Terminate with no body (e.g. `Status::NoContent`, `Status::SeeOther`).
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

/// Lets handlers bail out early with `?` when the error side is already a
/// finished response (a redirect, a 404, a logged 500).
impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}
