use anyhow::Context;
use session_token::config::Config;
use session_token::credentials::{CredentialStore, InMemoryCredentialStore};
use session_token::http::{self, AppState};
use session_token::observability::{self, SERVICE_NAME};
use session_token::SystemClock;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    observability::init(&config.logging).context("initializing logging")?;

    info!(service = SERVICE_NAME, level = %config.logging.level, "Starting Session Token Service");

    if config.signing_key_generated {
        warn!("SIGNING_KEY not set, using a random key; tokens will not survive a restart");
    } else if config.signing_key.len() < 32 {
        warn!(len = config.signing_key.len(), "SIGNING_KEY is shorter than 32 bytes");
    }

    let store = match &config.credentials_path {
        Some(path) => InMemoryCredentialStore::from_file(path)?,
        None => {
            warn!("CREDENTIALS_PATH not set, credential store is empty");
            InMemoryCredentialStore::new()
        }
    };
    info!(users = store.len(), "Credential store loaded");
    let store: Arc<dyn CredentialStore> = Arc::new(store);

    let state = AppState::new(
        &config.signing_key,
        config.token_ttl,
        config.refresh_cooldown,
        Arc::new(SystemClock),
        store,
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(
        addr = %addr,
        token_ttl_secs = config.token_ttl.as_secs(),
        refresh_cooldown_secs = config.refresh_cooldown.as_secs(),
        "Session Token Service listening"
    );

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Session Token Service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
