//! The authentication gate.

use tracing::error;

use super::Middleware;
use crate::handler::Endpoint;
use crate::request::Request;
use crate::response::Response;
use crate::session::Session;
use crate::status::Status;

/// Session key holding the id of the logged-in user.
pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserID";

/// Admits only requests whose session holds [`AUTHENTICATED_USER_ID`].
///
/// The gate trusts the session: it checks that the key exists, nothing
/// more. Everyone else is redirected (`303 See Other`) to the login page and
/// the wrapped endpoint never runs. Admitted responses are marked
/// `cache-control: no-store` so protected pages never land in shared caches.
///
/// Needs a [`SessionManager`](crate::session::SessionManager) earlier in the
/// chain. Without one the gate answers `500` rather than guessing.
#[derive(Clone, Debug)]
pub struct RequireAuthentication {
    login_path: String,
}

impl RequireAuthentication {
    pub fn new(login_path: &str) -> Self {
        Self { login_path: login_path.to_owned() }
    }
}

impl Default for RequireAuthentication {
    fn default() -> Self {
        Self::new("/user/login")
    }
}

impl Middleware for RequireAuthentication {
    fn wrap(&self, next: Endpoint) -> Endpoint {
        let login_path = self.login_path.clone();
        Endpoint::new(move |req: Request| {
            let next = next.clone();
            let login_path = login_path.clone();
            async move {
                let Some(session) = Session::from_request(&req) else {
                    error!(uri = %req.uri(), "authentication gate reached without a session");
                    return Response::status(Status::InternalServerError);
                };
                if !session.exists(AUTHENTICATED_USER_ID) {
                    return Response::redirect(&login_path);
                }

                let mut res = next.call(req).await;
                res.set_header("cache-control", "no-store");
                res
            }
        })
    }
}
