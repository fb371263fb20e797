use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::{auth::CredentialVerifier, JsonStore};

pub mod auth;
pub mod store;

/// Shared handler state: the store handle, the credential check, and
/// whether mutations are flushed to disk immediately.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub autosave: bool,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public health check plus the
/// authenticated store endpoints.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new().route("/health", get(health));

    let api = Router::new()
        .route("/create", post(store::create_entry))
        .route("/read", get(store::read_entry))
        .route("/update", put(store::update_entry))
        .route("/delete", delete(store::delete_entry))
        .route("/keys", get(store::list_keys))
        .route("/save", post(store::save_store))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
