// --------------------------------------------------
// Handles API endpoints for the undo/redo history.
//
// Responsibilities:
// - List history entries with the cursor position
// - Undo / redo / revert to an entry
// -------------------------------------------------

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::app::AppState;
use crate::error::{RecordKind, StoreError};
use crate::history::HistoryListing;
use crate::store::TimelineStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub index: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub entries: Vec<HistoryListing>,
}

fn history_response(store: &TimelineStore) -> HistoryResponse {
    HistoryResponse {
        index: store.history_index(),
        can_undo: store.can_undo(),
        can_redo: store.can_redo(),
        entries: store.history_entries(),
    }
}

// -----------------------------
// GET /api/history
// Entries in stored order, the cursor entry flagged isCurrent
// -----------------------------
pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock();
    Json(history_response(&store))
}

// -----------------------------
// POST /api/history/undo
// 409 when already at the oldest entry
// -----------------------------
pub async fn undo(State(state): State<AppState>) -> impl IntoResponse {
    let mut store = state.store.lock();
    if !store.undo() {
        return (StatusCode::CONFLICT, "nothing to undo").into_response();
    }
    Json(history_response(&store)).into_response()
}

// -----------------------------
// POST /api/history/redo
// 409 when already at the newest entry
// -----------------------------
pub async fn redo(State(state): State<AppState>) -> impl IntoResponse {
    let mut store = state.store.lock();
    if !store.redo() {
        return (StatusCode::CONFLICT, "nothing to redo").into_response();
    }
    Json(history_response(&store)).into_response()
}

// -----------------------------
// POST /api/history/:id/revert
// Restores an entry's snapshot as a new "revert" entry
// -----------------------------
pub async fn revert(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let mut store = state.store.lock();
    if !store.revert_to(&id) {
        return StoreError::NotFound {
            kind: RecordKind::HistoryEntry,
            id,
        }
        .into_response();
    }
    Json(history_response(&store)).into_response()
}
