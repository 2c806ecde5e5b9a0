use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    error::{AppError, Result},
    models::{
        credentials::Credentials,
        incident::{IncidentBuckets, IncidentDraft, IncidentRecord, StatusUpdate},
        outcome::WriteOutcome,
    },
    state::AppState,
};

/// Lists every incident, split by status.
pub async fn list_incidents(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<IncidentBuckets>> {
    Ok(Json(state.incidents.fetch_incidents(&credentials).await?))
}

/// Shows one incident.
pub async fn get_incident(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(incident_id): Path<u64>,
) -> Result<Json<IncidentRecord>> {
    state
        .incidents
        .fetch_incident(&credentials, incident_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Creates or updates an incident.
#[axum::debug_handler]
pub async fn save_incident(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Json(payload): Json<IncidentDraft>,
) -> Result<Json<WriteOutcome>> {
    Ok(Json(state.incidents.save_incident(&credentials, &payload).await?))
}

/// Approves, cancels or reopens an incident.
pub async fn set_incident_status(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(incident_id): Path<u64>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<WriteOutcome>> {
    tracing::info!(
        "🔁 Incident {} -> {:?}",
        incident_id,
        payload.status
    );

    Ok(Json(
        state
            .incidents
            .set_incident_status(
                &credentials,
                incident_id,
                payload.status,
                payload.reason.as_deref(),
            )
            .await?,
    ))
}
