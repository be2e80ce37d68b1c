//! Static files under the configured directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::helpers::{client_error, server_error};
use super::App;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::status::Status;

/// `GET /static/{*filepath}`. Directories, missing files and any path that
/// tries to leave the static root are all `404`.
pub(crate) async fn serve(app: Arc<App>, req: Request) -> Response {
    let Some(path) = req.param("filepath").and_then(|p| resolve(&app.static_dir, p)) else {
        return client_error(Status::NotFound);
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return client_error(Status::NotFound),
        Err(e) if e.kind() == ErrorKind::NotFound => return client_error(Status::NotFound),
        Err(e) => return server_error(&req, &e),
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = path
                .extension()
                .and_then(|e| e.to_str())
                .map_or(ContentType::OctetStream, ContentType::from_extension);
            Response::builder().bytes(content_type, bytes)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => client_error(Status::NotFound),
        Err(e) => server_error(&req, &e),
    }
}

/// Joins `relative` onto `root`, refusing anything but plain path segments.
fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            other => {
                debug!(path = relative, component = ?other, "rejected static path");
                return None;
            }
        }
    }
    (path != root).then_some(path)
}
