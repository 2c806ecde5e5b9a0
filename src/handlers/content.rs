use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::{
    error::Result,
    models::{
        content::{ContentDraft, ContentEntry, ContentQuery, ContentUpdate},
        credentials::Credentials,
        outcome::WriteOutcome,
    },
    state::AppState,
};

/// Lists lesson content entries.
pub async fn list_contents(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Vec<ContentEntry>>> {
    Ok(Json(state.content.fetch_contents(&credentials, &query).await?))
}

/// Records lesson content.
#[axum::debug_handler]
pub async fn create_content(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Json(payload): Json<ContentDraft>,
) -> Result<Json<WriteOutcome>> {
    tracing::info!(
        "📝 Content for class {} period {} on {}",
        payload.class_id,
        payload.period,
        payload.date
    );

    Ok(Json(state.content.create_content(&credentials, &payload).await?))
}

/// Rewrites lesson content.
pub async fn edit_content(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(content_id): Path<String>,
    Json(payload): Json<ContentUpdate>,
) -> Result<Json<WriteOutcome>> {
    Ok(Json(
        state
            .content
            .edit_content(&credentials, &content_id, &payload)
            .await?,
    ))
}

/// Deletes lesson content.
pub async fn delete_content(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(content_id): Path<String>,
) -> Result<Json<WriteOutcome>> {
    Ok(Json(
        state.content.delete_content(&credentials, &content_id).await?,
    ))
}
