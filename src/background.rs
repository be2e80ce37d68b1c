//! Detached background work.
//!
//! [`recover_panic`](crate::middleware::recover_panic) only protects the
//! request's own call stack. Anything handed to the runtime separately
//! (session sweeping, post-request cleanup) must contain its own panics, so
//! every such task goes through [`spawn`].

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::error;

use crate::middleware::panic_message;

/// Spawns `task` on the current tokio runtime. A panic inside it is logged
/// under `name` and swallowed; the returned handle then resolves normally.
///
/// # Panics
///
/// Panics if called outside a tokio runtime, like [`tokio::spawn`].
pub fn spawn<F>(name: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(payload) = AssertUnwindSafe(task).catch_unwind().await {
            error!(task = name, panic = %panic_message(payload.as_ref()), "background task panicked");
        }
    })
}
