// --------------------------------------------------
// Handles API endpoints related to conference CRUD operations.
// -------------------------------------------------

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::AppState;
use crate::error::{RecordKind, StoreError};
use crate::models::{ConferenceInput, ConferencePatch};

fn conference_not_found(id: String) -> StoreError {
    StoreError::NotFound {
        kind: RecordKind::Conference,
        id,
    }
}

// -----------------------------
// GET /api/conferences
// Returns all conferences sorted by start date
// -----------------------------
pub async fn get_conferences(State(state): State<AppState>) -> impl IntoResponse {
    let conferences = state.store.lock().conferences();
    Json(conferences)
}

// -----------------------------
// POST /api/conferences
// -----------------------------
pub async fn create_conference(
    State(state): State<AppState>,
    Json(input): Json<ConferenceInput>,
) -> impl IntoResponse {
    let conference = state.store.lock().add_conference(input);
    (StatusCode::CREATED, Json(conference))
}

// -----------------------------
// GET /api/conferences/:id
// -----------------------------
pub async fn get_conference(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let conference = state.store.lock().conference_by_id(&id).cloned();
    match conference {
        Some(conference) => Json(conference).into_response(),
        None => conference_not_found(id).into_response(),
    }
}

// -----------------------------
// PUT /api/conferences/:id
// -----------------------------
pub async fn update_conference(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ConferencePatch>,
) -> impl IntoResponse {
    let updated = state.store.lock().update_conference(&id, patch);
    match updated {
        Some(conference) => Json(conference).into_response(),
        None => conference_not_found(id).into_response(),
    }
}

// -----------------------------
// DELETE /api/conferences/:id
// -----------------------------
pub async fn delete_conference(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !state.store.lock().delete_conference(&id) {
        return conference_not_found(id).into_response();
    }
    Json(serde_json::json!({ "ok": true })).into_response()
}
