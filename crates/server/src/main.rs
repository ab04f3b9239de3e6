//! cask-server: HTTP front end for the cask record store.
//!
//! All requests are POSTs whose URL path names the operation and whose body
//! is the request JSON; every response is the standard envelope, optionally
//! gzip-compressed. The server is down the moment `/down` is hit: new
//! requests get 503 while in-flight ones drain, then the store closes and
//! the process exits 0.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use cask_engine::Store;
use cask_executor::RuntimeConfig;

use cask_server::routes;
use cask_server::settings::Settings;
use cask_server::state::{AppState, RunState, ServerStatus};

/// Command line surface: only where to find the settings file.
#[derive(Debug, Parser)]
#[command(name = "cask-server", about = "cask record store HTTP server")]
struct Args {
    /// Directory containing cask_settings.json (default: current directory).
    #[arg(long, default_value = "")]
    settings: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::load(&args.settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error loading settings file: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&settings) {
        eprintln!("error initializing log output: {e}");
        return ExitCode::FAILURE;
    }
    info!(target: "cask::server", ?settings, "cask-server starting");
    cask_core::trace::set_enabled(settings.trace == "on");

    let store = match Store::open(&settings.db_path) {
        Ok(s) => s,
        Err(e) => {
            error!(target: "cask::server", db_path = %settings.db_path, error = %e, "cannot open store");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(target: "cask::server", error = %e, "cannot start runtime");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(serve(settings, store)) {
        Ok(()) => {
            info!(target: "cask::server", "db closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(target: "cask::server", error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(settings: Settings, store: Store) -> std::io::Result<()> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let state = AppState {
        store: Arc::new(store),
        cfg: Arc::new(RuntimeConfig {
            max_errs: settings.max_errs,
        }),
        status: Arc::new(ServerStatus::new()),
        compress_response: settings.compress_response,
        shutdown: shutdown_tx,
    };

    let app = routes::router(state.clone());
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port)).await?;
    state.status.set(RunState::Running);
    info!(target: "cask::server", port = settings.port, "waiting for requests ...");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;
    // state (and with it the store) drops here, closing the db file
    Ok(())
}

fn init_logging(settings: &Settings) -> std::io::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if settings.log_path.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        let file = std::fs::File::create(&settings.log_path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    Ok(())
}
