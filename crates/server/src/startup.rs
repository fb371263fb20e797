use std::{future::Future, path::Path, sync::Arc};

use configs::{AppConfig, AuthConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{
    auth::{AnyOf, Argon2Credentials, CredentialVerifier, StaticCredentials},
    storage::{JsonStore, KeyPolicy},
    StoreError,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Combine every configured credential source; refuse to run without one.
pub fn build_verifier(auth: &AuthConfig) -> Result<Arc<dyn CredentialVerifier>, StartupError> {
    if !auth.has_credentials() {
        return Err(StartupError::InvalidConfig(
            "no credentials configured; set [auth] username/password, [auth.users], \
             or KV_AUTH_USERNAME/KV_AUTH_PASSWORD"
                .into(),
        ));
    }
    let mut verifier = AnyOf::new();
    if let (Some(user), Some(pass)) = (&auth.username, &auth.password) {
        verifier = verifier.with(StaticCredentials::new(user.clone(), pass.clone()));
    }
    let hashed = Argon2Credentials::new(auth.users.clone());
    info!(static_pair = auth.username.is_some(), argon2_users = hashed.len(), "credential sources ready");
    if !hashed.is_empty() {
        verifier = verifier.with(hashed);
    }
    Ok(Arc::new(verifier))
}

/// Report the startup load. A failed load is not fatal; the server
/// continues with an empty store.
fn report_load(store: &JsonStore, loaded: Result<usize, StoreError>) {
    let path = store.file_path().display().to_string();
    match loaded {
        Ok(count) => info!(%path, entries = count, event = "store_loaded", "store loaded"),
        Err(e) => error!(%path, error = %e, event = "store_load_failed", "starting with an empty store"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; shutdown only on process exit");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Serve until `shutdown` resolves, then save the store.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    let app = routes::build_router(state, build_cors());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    store.save().await.map_err(|e| {
        error!(error = %e, event = "final_save_failed", "store not persisted on shutdown");
        e
    })?;
    info!(path = %store.file_path().display(), event = "final_save", "store saved on shutdown");
    Ok(())
}

/// Public entry: build state from config and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let verifier = build_verifier(&cfg.auth)?;

    let policy = KeyPolicy::from_max_len(cfg.store.max_key_len);
    common::env::ensure_data_dir(Path::new(&cfg.store.file_path)).await?;
    let (store, loaded) = JsonStore::open(&cfg.store.file_path, policy).await;
    report_load(&store, loaded);

    let state = AppState { store, verifier, autosave: cfg.store.autosave };

    let listener = TcpListener::bind(cfg.server.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, ?policy, autosave = cfg.store.autosave, "starting kv server");
    serve(listener, state, shutdown_signal()).await
}
