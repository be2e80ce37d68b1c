use std::sync::Arc;

use tracing::debug;

use super::helpers::server_error;
use super::App;
use crate::handler::Endpoint;
use crate::middleware::{Middleware, AUTHENTICATED_USER_ID};
use crate::request::Request;
use crate::session::Session;

/// Request extension marking a request whose session belongs to a user that
/// still exists. Carries the user id.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Authenticated(pub i64);

/// Confirms the session's user against the user model.
///
/// A session naming a deleted user (or holding garbage under the key) loses
/// its [`AUTHENTICATED_USER_ID`], so the authentication gate further in sees
/// an anonymous request. Confirmed requests get an [`Authenticated`]
/// extension. Must run after the session middleware.
pub fn authenticate(app: Arc<App>) -> impl Middleware + Clone {
    move |mut req: Request, next: Endpoint| {
        let app = Arc::clone(&app);
        async move {
            let Some(session) = Session::from_request(&req) else {
                return next.call(req).await;
            };
            if !session.exists(AUTHENTICATED_USER_ID) {
                return next.call(req).await;
            }

            match session.get::<i64>(AUTHENTICATED_USER_ID) {
                Some(id) => match app.users.exists(id) {
                    Ok(true) => {
                        req.extensions_mut().insert(Authenticated(id));
                    }
                    Ok(false) => {
                        debug!(user = id, "session names a deleted user");
                        session.remove(AUTHENTICATED_USER_ID);
                    }
                    Err(e) => return server_error(&req, &e),
                },
                None => session.remove(AUTHENTICATED_USER_ID),
            }
            next.call(req).await
        }
    }
}
