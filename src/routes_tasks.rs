// --------------------------------------------------
// Handles API endpoints related to task CRUD operations.
//
// Responsibilities:
// - List tasks in timeline order
// - Create / read / update / delete a task
// -------------------------------------------------

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::AppState;
use crate::error::{RecordKind, StoreError};
use crate::models::{TaskInput, TaskPatch};

fn task_not_found(id: String) -> StoreError {
    StoreError::NotFound {
        kind: RecordKind::Task,
        id,
    }
}

// -----------------------------
// GET /api/tasks
// Returns all tasks sorted by project, start, end
// -----------------------------
pub async fn get_tasks(State(state): State<AppState>) -> impl IntoResponse {
    let tasks = state.store.lock().tasks();
    Json(tasks)
}

// -----------------------------
// POST /api/tasks
// Creates a new task; missing fields take defaults
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskInput>,
) -> impl IntoResponse {
    let task = state.store.lock().add_task(input);
    (StatusCode::CREATED, Json(task))
}

// -----------------------------
// GET /api/tasks/:id
// -----------------------------
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let task = state.store.lock().task_by_id(&id).cloned();
    match task {
        Some(task) => Json(task).into_response(),
        None => task_not_found(id).into_response(),
    }
}

// -----------------------------
// PUT /api/tasks/:id
// Merges the given fields onto an existing task
// ----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> impl IntoResponse {
    let updated = state.store.lock().update_task(&id, patch);
    match updated {
        Some(task) => Json(task).into_response(),
        None => task_not_found(id).into_response(),
    }
}

// -----------------------------
// DELETE /api/tasks/:id
// Removes a task (undoable)
// -----------------------------
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    if !state.store.lock().delete_task(&id) {
        return task_not_found(id).into_response();
    }
    Json(serde_json::json!({ "ok": true })).into_response()
}
