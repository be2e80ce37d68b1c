use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use snippetbox::config::Config;
use snippetbox::models::{SnippetModel, UserModel};
use snippetbox::session::{MemoryStore, SessionManager};
use snippetbox::web::{self, App};
use snippetbox::Server;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let server = match Server::bind(&config.addr) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "invalid listen address");
            return ExitCode::FAILURE;
        }
    };

    info!(
        static_dir = %config.static_dir.display(),
        session_lifetime_minutes = config.session_lifetime,
        session_cleanup_secs = config.session_cleanup,
        "configuration loaded"
    );
    if !config.secure_cookies {
        warn!("session cookies are not marked Secure; use only behind plain-HTTP development setups");
    }

    let store = Arc::new(MemoryStore::new());
    let _sweeper = store.start_sweeper(config.cleanup_interval());

    let sessions = SessionManager::new(store)
        .lifetime(config.session_lifetime())
        .secure(config.secure_cookies);

    let app = Arc::new(App {
        snippets: SnippetModel::new(),
        users: UserModel::new(),
        sessions,
        static_dir: config.static_dir.clone(),
    });

    match server.serve(web::routes(app)).await {
        Ok(()) => {
            info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "server error");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose { "snippetbox=debug" } else { "snippetbox=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
