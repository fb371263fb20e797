use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use common::types::MessageResponse;

use crate::errors::ApiError;
use crate::routes::AppState;

/// Body of `/create` and `/update`. Missing fields arrive as empty strings
/// and are rejected by the store's own validation.
#[derive(Deserialize, Debug)]
pub struct EntryInput {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Deserialize, Debug)]
pub struct KeyQuery {
    pub key: Option<String>,
}

impl KeyQuery {
    fn require(self) -> Result<String, ApiError> {
        self.key.ok_or_else(|| ApiError::bad_request("Missing 'key' parameter"))
    }
}

type Message = Json<MessageResponse<()>>;

fn message(text: &str) -> Message {
    Json(MessageResponse::message(text))
}

/// Flush the store after a mutation when autosave is on.
async fn persist(state: &AppState) -> Result<(), ApiError> {
    if !state.autosave {
        return Ok(());
    }
    state.store.save().await.map_err(|e| {
        error!(event = "autosave_failed", error = %e, "store mutation applied but not persisted");
        ApiError::from(e)
    })
}

pub async fn create_entry(
    State(state): State<AppState>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> Result<(StatusCode, Message), ApiError> {
    let Json(input) = body?;
    state.store.create(&input.key, &input.value).await?;
    info!(key = %input.key, "entry_created");
    persist(&state).await?;
    Ok((StatusCode::CREATED, message("Key-value pair created successfully")))
}

pub async fn read_entry(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<MessageResponse<String>>, ApiError> {
    let key = query.require()?;
    let value = state.store.read(&key).await?;
    Ok(Json(MessageResponse::with_data("Key-value pair retrieved", value)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> Result<Message, ApiError> {
    let Json(input) = body?;
    state.store.update(&input.key, &input.value).await?;
    info!(key = %input.key, "entry_updated");
    persist(&state).await?;
    Ok(message("Key-value pair updated successfully"))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Message, ApiError> {
    let key = query.require()?;
    state.store.delete(&key).await?;
    info!(%key, "entry_deleted");
    persist(&state).await?;
    Ok(message("Key-value pair deleted successfully"))
}

pub async fn list_keys(State(state): State<AppState>) -> Json<MessageResponse<Vec<String>>> {
    Json(MessageResponse::with_data("Keys listed", state.store.keys().await))
}

pub async fn save_store(State(state): State<AppState>) -> Result<Message, ApiError> {
    state.store.save().await?;
    info!(path = %state.store.file_path().display(), "store_saved");
    Ok(message("Store saved"))
}
