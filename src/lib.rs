//! Local-first project timeline: tasks and conferences on a week grid, with
//! snapshot-based undo/redo history and key-value persistence.
//!
//! The core is [`TimelineStore`]. The `routes_*` modules and [`app`] expose it
//! over HTTP for the browser front-end.

pub mod app;
pub mod config;
pub mod error;
pub mod history;
pub mod logic;
pub mod models;
pub mod notifier;
pub mod persistence;
pub mod preferences;
pub mod routes_conferences;
pub mod routes_data;
pub mod routes_history;
pub mod routes_tasks;
pub mod samples;
pub mod store;
pub mod transfer;

pub use app::{AppState, SharedStore, build_router};
pub use config::{AppConfig, ConfigError};
pub use error::{ImportError, PersistError, RecordKind, StoreError};
pub use history::{HistoryAction, HistoryEntry, HistoryListing, HistoryLog, Snapshot};
pub use logic::{DateRange, TimelineGrid};
pub use models::{
    Conference, ConferenceInput, ConferencePatch, ConferenceStatus, Task, TaskInput, TaskPatch,
    TaskStatus,
};
pub use notifier::{ChangeEvent, ChangeNotifier, Subscription};
pub use persistence::{
    FileKeyValueStore, KeyValueStore, LoadSource, MemoryKeyValueStore, PersistenceAdapter,
};
pub use preferences::{ColorPalette, ColorPatch, ColorRole, Settings, SettingsPatch, WeekStartDay};
pub use store::TimelineStore;
