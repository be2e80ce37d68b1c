use std::error::Error as StdError;

use chrono::{Datelike, Utc};
use tracing::error;

use super::auth::Authenticated;
use crate::request::Request;
use crate::response::Response;
use crate::session::Session;
use crate::status::Status;

/// Session key of the one-shot confirmation message.
pub(crate) const FLASH: &str = "flash";

/// Logs `err` with its source chain and answers a bare 500. No detail reaches
/// the client.
pub(crate) fn server_error(req: &Request, err: &(dyn StdError + 'static)) -> Response {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    error!(method = %req.method(), uri = %req.uri(), error = %chain, "server error");
    Response::status(Status::InternalServerError)
}

pub(crate) fn client_error(status: Status) -> Response {
    Response::status(status)
}

/// The request's session, or the 500 a misassembled chain deserves.
pub(crate) fn session(req: &Request) -> Result<Session, Response> {
    Session::from_request(req).ok_or_else(|| {
        error!(uri = %req.uri(), "handler needs a session but none was loaded");
        Response::status(Status::InternalServerError)
    })
}

/// Values every page layout needs.
#[derive(Debug, Default)]
pub(crate) struct TemplateData {
    pub(crate) current_year: i32,
    pub(crate) flash: Option<String>,
    pub(crate) is_authenticated: bool,
}

/// Pops the flash message, so it is shown exactly once.
pub(crate) fn template_data(req: &Request) -> TemplateData {
    TemplateData {
        current_year: Utc::now().year(),
        flash: Session::from_request(req).and_then(|s| s.pop_string(FLASH)),
        is_authenticated: req.extensions().get::<Authenticated>().is_some(),
    }
}

pub(crate) fn render(status: Status, page: String) -> Response {
    Response::builder().status(status).html(page)
}
