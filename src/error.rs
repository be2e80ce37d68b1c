//! Unified error type for infrastructure failures.

use thiserror::Error;

/// The error type returned by snippetbox's fallible serving operations.
///
/// Application-level outcomes (404, 422, redirects) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: parsing the listen address, binding to a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}
