// --------------------------------------------------
// Shared application state and HTTP router.
//
// Every handler locks the store for exactly one core call, so all
// mutations are serialized through this one mutex.
// --------------------------------------------------

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use tower_http::services::ServeDir;

use crate::error::StoreError;
use crate::store::TimelineStore;
use crate::{routes_conferences, routes_data, routes_history, routes_tasks};

pub type SharedStore = Arc<Mutex<TimelineStore>>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Bumped on every change notification; the front-end polls it.
    pub revision: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(mut store: TimelineStore) -> Self {
        let revision = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&revision);
        store.subscribe(move |event| {
            let next = counter.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::debug!(%event, revision = next, "store changed");
            Ok(())
        });
        Self {
            store: Arc::new(Mutex::new(store)),
            revision,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Import(_)
            | StoreError::InvalidSetting { .. }
            | StoreError::InvalidColor { .. } => StatusCode::BAD_REQUEST,
            StoreError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        // tasks
        .route("/tasks", get(routes_tasks::get_tasks).post(routes_tasks::create_task))
        .route(
            "/tasks/:id",
            get(routes_tasks::get_task)
                .put(routes_tasks::update_task)
                .delete(routes_tasks::delete_task),
        )
        // conferences
        .route(
            "/conferences",
            get(routes_conferences::get_conferences).post(routes_conferences::create_conference),
        )
        .route(
            "/conferences/:id",
            get(routes_conferences::get_conference)
                .put(routes_conferences::update_conference)
                .delete(routes_conferences::delete_conference),
        )
        // history
        .route("/history", get(routes_history::get_history))
        .route("/history/undo", post(routes_history::undo))
        .route("/history/redo", post(routes_history::redo))
        .route("/history/:id/revert", post(routes_history::revert))
        // preferences
        .route(
            "/colors",
            get(routes_data::get_colors)
                .put(routes_data::put_colors)
                .delete(routes_data::reset_colors),
        )
        .route(
            "/settings",
            get(routes_data::get_settings)
                .put(routes_data::put_settings)
                .delete(routes_data::reset_settings),
        )
        // derived views
        .route("/date-range", get(routes_data::get_date_range))
        .route("/timeline", get(routes_data::get_timeline))
        .route("/revision", get(routes_data::get_revision))
        // import / export
        .route("/export", get(routes_data::export_json))
        .route("/export.csv", get(routes_data::export_csv))
        .route("/import", post(routes_data::import))
        .route("/clear", post(routes_data::clear))
}

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .nest("/api", api_router())
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}
