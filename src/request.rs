//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::Extensions;

use crate::method::Method;

/// An incoming HTTP request with its body fully buffered.
///
/// Besides the wire data, a request carries two pieces of per-request state:
/// the path parameters captured by the [`Router`](crate::Router), and an
/// [`Extensions`] map through which middleware hands typed values (the loaded
/// [`Session`](crate::session::Session), an authentication marker) to the
/// handlers further down the chain.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) extensions: Extensions,
}

impl Request {
    /// Builder for requests constructed outside the server, e.g. in tests.
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            method: Method::Get,
            uri: "/".to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Path plus query string, as the client sent it.
    pub fn uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/snippet/view/{id}`, `req.param("id")` on
    /// `/snippet/view/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`]. Obtain via [`Request::builder()`].
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Path with an optional `?query` suffix.
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_owned();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub(crate) fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Sets a urlencoded form body and the matching content type.
    pub fn form(self, fields: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.header("content-type", "application/x-www-form-urlencoded")
            .body(body)
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        let (path, query) = match self.uri.split_once('?') {
            Some((p, q)) => (p.to_owned(), Some(q.to_owned())),
            None => (self.uri, None),
        };
        Request {
            method: self.method,
            path,
            query,
            headers: self.headers,
            body: self.body,
            params: HashMap::new(),
            remote_addr: self.remote_addr,
            extensions: Extensions::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_splits_query_from_path() {
        let req = Request::builder().uri("/snippet/view/1?x=2").build();
        assert_eq!(req.path(), "/snippet/view/1");
        assert_eq!(req.query(), Some("x=2"));
        assert_eq!(req.uri(), "/snippet/view/1?x=2");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::builder().header("Cookie", "session=abc").build();
        assert_eq!(req.header("cookie"), Some("session=abc"));
    }

    #[test]
    fn form_body_is_urlencoded() {
        let req = Request::builder()
            .form(&[("email", "a@b.com"), ("password", "p w")])
            .build();
        assert_eq!(req.body(), b"email=a%40b.com&password=p+w");
        assert_eq!(
            req.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }
}
