//! Liveness check.
//!
//! `GET /ping` answers `200 OK` with body `OK` as long as the process can
//! serve HTTP at all. It is registered outside the session chain, so it
//! never touches the session store and never sets a cookie.
//!
//! ```rust,no_run
//! use snippetbox::{health, Router};
//!
//! let app = Router::new().get("/ping", health::ping);
//! ```

use crate::{Request, Response};

/// Always `200 OK` with body `"OK"`.
pub async fn ping(_req: Request) -> Response {
    Response::text("OK")
}
