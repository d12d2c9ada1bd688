//! Request handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{
    Query,
    State,
};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::server::ApiResponse;
use crate::service::build::{
    BuildSummary,
    SaveSummary,
};
use crate::service::keys::KeyLists;
use crate::service::translation::{
    TranslationSnapshot,
    TranslationUpdate,
};
use crate::service::{
    ServerState,
    build,
    keys,
    translation,
};

/// Query of `GET /_/keys`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct KeysQuery {
    language: String,
    query: String,
}

/// Query of `GET /_/translation`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TranslationQuery {
    key: String,
    language: String,
}

pub(super) async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub(super) async fn list_keys(
    State(state): State<ServerState>,
    Query(params): Query<KeysQuery>,
) -> ApiResponse<KeyLists> {
    tracing::debug!(language = %params.language, query = %params.query, "GET /_/keys");
    keys::list_keys(&state, &params.language, &params.query).await.into()
}

pub(super) async fn get_translation(
    State(state): State<ServerState>,
    Query(params): Query<TranslationQuery>,
) -> ApiResponse<TranslationSnapshot> {
    tracing::debug!(key = %params.key, language = %params.language, "GET /_/translation");
    ApiResponse::success(translation::get_translation(&state, &params.key, &params.language).await)
}

pub(super) async fn put_translation(
    State(state): State<ServerState>,
    payload: Result<Json<TranslationUpdate>, JsonRejection>,
) -> ApiResponse<()> {
    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected malformed translation body");
            return ApiResponse::failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    tracing::debug!(key = %update.key, language = %update.language, "POST /_/translation");

    match translation::put_translation(&state, update).await {
        Ok(()) => ApiResponse::done(),
        Err(error) => error.into(),
    }
}

pub(super) async fn save(State(state): State<ServerState>) -> ApiResponse<SaveSummary> {
    tracing::debug!("POST /_/save");
    build::save(&state).await.into()
}

pub(super) async fn save_and_build(State(state): State<ServerState>) -> ApiResponse<BuildSummary> {
    tracing::debug!("POST /_/save_and_build");
    build::save_and_build(&state).await.into()
}
