//! loth bot
//!
//! - Config: `LOTH_CONFIG` (default `loth.yaml`), password override via `LOTH_PASSWORD`
//! - One session per process; exit code 0 on interrupt, 1 otherwise so a
//!   supervisor restarts it

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use loth_bot::{app_state::AppState, config, infra::Credentials, session::{Session, SessionEnd}};

const CONFIG_ENV: &str = "LOTH_CONFIG";

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "loth.yaml".to_string());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let creds = Credentials::from(&cfg.account);
    let state = match AppState::new(cfg) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(character = %creds.character, "loth starting");
    match Session::new(state).run(&creds, shutdown_signal()).await {
        Ok(SessionEnd::Interrupted) => ExitCode::SUCCESS,
        Ok(SessionEnd::ConnectionLost) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
