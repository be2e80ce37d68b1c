//! Data models.
//!
//! In-process repositories for snippets and users. Both are internally
//! synchronised and shared by every request through the application state;
//! no lock is ever held across an `.await`.

mod snippets;
mod users;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

pub use snippets::{Snippet, SnippetModel};
pub use users::{User, UserModel, DEFAULT_BCRYPT_COST};

/// Errors returned by the models.
///
/// `NoRecord`, `InvalidCredentials` and `DuplicateEmail` are expected
/// outcomes that handlers turn into 404s and form errors; the rest are
/// server errors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no matching record found")]
    NoRecord,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("duplicate email")]
    DuplicateEmail,

    #[error("password hashing: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// Writers never panic mid-update, so a poisoned table is still consistent.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
