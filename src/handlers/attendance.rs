use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::{
    error::Result,
    models::{
        attendance::{
            AttendanceDay, AttendanceDetail, AttendanceSubmission, ClassOption, PresenceUpdate,
            RosterEntry, SubjectOption,
        },
        credentials::Credentials,
        outcome::WriteOutcome,
    },
    state::AppState,
};

/// Lists the user's classes.
pub async fn list_classes(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<Vec<ClassOption>>> {
    Ok(Json(state.attendance.fetch_classes(&credentials).await?))
}

/// Lists the subjects of a class.
pub async fn list_subjects(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<SubjectOption>>> {
    Ok(Json(
        state.attendance.fetch_subjects(&credentials, &class_id).await?,
    ))
}

/// Lists the roster of a class.
pub async fn list_roster(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<RosterEntry>>> {
    Ok(Json(
        state.attendance.fetch_roster(&credentials, &class_id).await?,
    ))
}

/// Records attendance for a class period.
#[axum::debug_handler]
pub async fn submit_attendance(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Json(payload): Json<AttendanceSubmission>,
) -> Result<Json<WriteOutcome>> {
    tracing::info!(
        "📝 Attendance for class {} period {} on {} ({} present)",
        payload.class_id,
        payload.period,
        payload.date,
        payload.present_student_ids.len()
    );

    Ok(Json(
        state
            .attendance
            .submit_attendance(&credentials, &payload)
            .await?,
    ))
}

/// Shows per-student presence for a day.
pub async fn attendance_detail(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(day): Query<AttendanceDay>,
) -> Result<Json<Vec<AttendanceDetail>>> {
    Ok(Json(
        state
            .attendance
            .fetch_attendance_detail(&credentials, &day)
            .await?,
    ))
}

/// Deletes a day of attendance.
pub async fn delete_attendance(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(day): Query<AttendanceDay>,
) -> Result<Json<WriteOutcome>> {
    tracing::info!(
        "🗑️  Deleting attendance of class {} on {}",
        day.class_id,
        day.date
    );

    Ok(Json(
        state.attendance.delete_attendance(&credentials, &day).await?,
    ))
}

/// Changes one student's presence.
pub async fn edit_presence(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(record_id): Path<String>,
    Json(payload): Json<PresenceUpdate>,
) -> Result<Json<WriteOutcome>> {
    Ok(Json(
        state
            .attendance
            .edit_presence(&credentials, &record_id, payload.present)
            .await?,
    ))
}
