// --------------------------------------------------
// Preferences, derived views and import/export endpoints.
//
// Colors and settings are persisted but never enter history.
// -------------------------------------------------

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::app::AppState;
use crate::models::date_field;
use crate::preferences::{ColorPatch, SettingsPatch};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>, // "YYYY-MM-DD", defaults to today
}

impl DateQuery {
    fn today(&self) -> Result<NaiveDate, StatusCode> {
        match &self.date {
            Some(text) => date_field::parse(text).map_err(|_| StatusCode::BAD_REQUEST),
            None => Ok(Local::now().date_naive()),
        }
    }
}

// -----------------------------
// GET /api/colors
// -----------------------------
pub async fn get_colors(State(state): State<AppState>) -> impl IntoResponse {
    let colors = state.store.lock().colors().clone();
    Json(colors)
}

// -----------------------------
// PUT /api/colors
// Merges named color roles; unknown roles are rejected
// -----------------------------
pub async fn put_colors(
    State(state): State<AppState>,
    Json(patch): Json<ColorPatch>,
) -> impl IntoResponse {
    let result = state.store.lock().update_colors(&patch);
    match result {
        Ok(colors) => Json(colors).into_response(),
        Err(err) => err.into_response(),
    }
}

// -----------------------------
// DELETE /api/colors
// Restores the default palette
// -----------------------------
pub async fn reset_colors(State(state): State<AppState>) -> impl IntoResponse {
    let colors = state.store.lock().reset_colors();
    Json(colors)
}

// -----------------------------
// GET /api/settings
// -----------------------------
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.store.lock().settings().clone();
    Json(settings)
}

// -----------------------------
// PUT /api/settings
// Merges known settings; unknown keys are rejected
// -----------------------------
pub async fn put_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> impl IntoResponse {
    let result = state.store.lock().update_settings(&patch);
    match result {
        Ok(settings) => Json(settings).into_response(),
        Err(err) => err.into_response(),
    }
}

// -----------------------------
// DELETE /api/settings
// -----------------------------
pub async fn reset_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.store.lock().reset_settings();
    Json(settings)
}

// -----------------------------
// GET /api/date-range?date=YYYY-MM-DD
// -----------------------------
pub async fn get_date_range(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> impl IntoResponse {
    let today = match q.today() {
        Ok(d) => d,
        Err(status) => return (status, "invalid date").into_response(),
    };
    let range = state.store.lock().compute_date_range(today);
    Json(range).into_response()
}

// -----------------------------
// GET /api/timeline?date=YYYY-MM-DD
// Week grid data for the renderer
// -----------------------------
pub async fn get_timeline(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> impl IntoResponse {
    let today = match q.today() {
        Ok(d) => d,
        Err(status) => return (status, "invalid date").into_response(),
    };
    let grid = state.store.lock().timeline(today);
    Json(grid).into_response()
}

// -----------------------------
// GET /api/revision
// Change counter; lets the front-end detect updates cheaply
// -----------------------------
pub async fn get_revision(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "revision": state.revision() }))
}

// -----------------------------
// GET /api/export
// -----------------------------
pub async fn export_json(State(state): State<AppState>) -> impl IntoResponse {
    let exported = state.store.lock().export_data();
    match exported {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"timeline.json\""),
            ],
            body,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

// -----------------------------
// GET /api/export.csv
// -----------------------------
pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.store.lock().export_csv();
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"timeline.csv\""),
        ],
        body,
    )
}

// -----------------------------
// POST /api/import
// Body is an exported JSON document; rejected payloads change nothing
// -----------------------------
pub async fn import(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let result = state.store.lock().import_data(&body);
    match result {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => err.into_response(),
    }
}

// -----------------------------
// POST /api/clear
// Empties tasks and conferences (undoable)
// -----------------------------
pub async fn clear(State(state): State<AppState>) -> impl IntoResponse {
    state.store.lock().clear_all_data();
    Json(serde_json::json!({ "ok": true }))
}
