//! Command-line and environment configuration.
//!
//! Every option can also be set through an environment variable with the
//! `SNIPPETBOX_` prefix:
//!
//! - `SNIPPETBOX_ADDR` - listen address (default: 0.0.0.0:4000)
//! - `SNIPPETBOX_STATIC_DIR` - static asset directory (default: ./ui/static)
//! - `SNIPPETBOX_SESSION_LIFETIME` - session lifetime in minutes (default: 720)
//! - `SNIPPETBOX_SESSION_CLEANUP` - expired-session sweep interval in seconds (default: 300)
//! - `SNIPPETBOX_SECURE_COOKIES` - mark the session cookie `Secure` (default: true)

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::session::DEFAULT_LIFETIME;

pub const DEFAULT_ADDR: &str = "0.0.0.0:4000";

pub const DEFAULT_STATIC_DIR: &str = "./ui/static";

/// Seconds between sweeps of expired sessions.
pub const DEFAULT_SESSION_CLEANUP: u64 = 300;

/// Longest accepted session lifetime: one year, in minutes.
pub const MAX_SESSION_LIFETIME: i64 = 365 * 24 * 60;

/// Snippetbox - paste and share text snippets.
#[derive(Parser, Debug, Clone)]
#[command(name = "snippetbox")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_ADDR, env = "SNIPPETBOX_ADDR")]
    pub addr: String,

    /// Directory served under `/static/`.
    #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "SNIPPETBOX_STATIC_DIR")]
    pub static_dir: PathBuf,

    /// Session lifetime in minutes.
    #[arg(long, default_value_t = DEFAULT_LIFETIME, env = "SNIPPETBOX_SESSION_LIFETIME")]
    pub session_lifetime: i64,

    /// Seconds between sweeps that drop expired sessions.
    #[arg(long, default_value_t = DEFAULT_SESSION_CLEANUP, env = "SNIPPETBOX_SESSION_CLEANUP")]
    pub session_cleanup: u64,

    /// Mark the session cookie `Secure`. Disable only when serving plain HTTP
    /// in development.
    #[arg(long, default_value_t = true, action = ArgAction::Set, env = "SNIPPETBOX_SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.addr.trim().is_empty() {
            return Err("listen address is required. Set --addr or SNIPPETBOX_ADDR".to_string());
        }
        if self.session_lifetime <= 0 {
            return Err("session_lifetime must be greater than 0".to_string());
        }
        if self.session_lifetime > MAX_SESSION_LIFETIME {
            return Err(format!(
                "session_lifetime must be at most {MAX_SESSION_LIFETIME} minutes (one year)"
            ));
        }
        if self.session_cleanup == 0 {
            return Err("session_cleanup must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn session_lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_lifetime)
    }

    pub fn cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_cleanup)
    }
}
