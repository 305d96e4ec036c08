//! The record store: single point of mutation for tasks and conferences.
//!
//! # Responsibility
//! - Own the live tasks, conferences, settings and colors.
//! - Record every record mutation as one history step, persist, then notify.
//! - Time-travel through the history log (undo, redo, revert).
//!
//! # Invariants
//! - After `open`, the history log holds at least one entry and the entry at
//!   its cursor equals the live task/conference collections.
//! - A failed operation (not found, rejected import, invalid patch) leaves
//!   state, history and storage untouched.
//! - Settings and colors never enter history.

use chrono::{Local, NaiveDate, Utc};

use crate::error::StoreError;
use crate::history::{HistoryAction, HistoryEntry, HistoryListing, HistoryLog, Snapshot};
use crate::logic::{self, DateRange, TimelineGrid};
use crate::models::{
    Conference, ConferenceInput, ConferencePatch, Task, TaskInput, TaskPatch, new_id,
};
use crate::notifier::{ChangeEvent, ChangeNotifier, Subscription};
use crate::persistence::{LoadSource, PersistenceAdapter, StateRef};
use crate::preferences::{ColorPalette, ColorPatch, Settings, SettingsPatch};
use crate::transfer::{self, EXPORT_VERSION, ExportPayload};

#[derive(Debug)]
pub struct TimelineStore {
    tasks: Vec<Task>,
    conferences: Vec<Conference>,
    history: HistoryLog,
    settings: Settings,
    colors: ColorPalette,
    persistence: PersistenceAdapter,
    notifier: ChangeNotifier,
    load_source: LoadSource,
}

impl TimelineStore {
    /// Loads state through `persistence`, recording an initial history entry
    /// when none was stored.
    pub fn open(persistence: PersistenceAdapter) -> Self {
        let loaded = persistence.load();
        let mut store = Self {
            tasks: loaded.tasks,
            conferences: loaded.conferences,
            history: loaded.history,
            settings: loaded.settings,
            colors: loaded.colors,
            persistence,
            notifier: ChangeNotifier::new(),
            load_source: loaded.source,
        };
        if store.history.is_empty() {
            store.push_history(HistoryAction::Init, "Initial state".to_string());
            store.persist();
        } else if !store.cursor_matches_live() {
            // An earlier save stopped before the history was written.
            tracing::warn!(
                index = store.history.index(),
                "stored history is behind the stored records, recording recovery entry"
            );
            store.push_history(HistoryAction::Init, "Recovered state".to_string());
            store.persist();
        }
        store
    }

    fn cursor_matches_live(&self) -> bool {
        self.history.current().is_some_and(|entry| {
            entry.snapshot.tasks == self.tasks && entry.snapshot.conferences == self.conferences
        })
    }

    /// Writes the final state out. The store is consumed.
    pub fn close(mut self) {
        self.persist();
        tracing::info!(history = self.history.len(), "timeline store closed");
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            conferences: self.conferences.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.tasks = snapshot.tasks;
        self.conferences = snapshot.conferences;
    }

    fn push_history(&mut self, action: HistoryAction, description: String) {
        let snapshot = self.snapshot();
        self.history
            .push(action, description, snapshot, self.settings.max_history_entries);
        tracing::debug!(
            action = action.as_str(),
            index = self.history.index(),
            len = self.history.len(),
            "history push"
        );
    }

    // Write failures are logged; the in-memory state stays authoritative.
    fn persist(&mut self) {
        let result = self.persistence.save(StateRef {
            tasks: &self.tasks,
            conferences: &self.conferences,
            history: &self.history,
            settings: &self.settings,
            colors: &self.colors,
        });
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist timeline state");
        }
    }

    fn commit(&mut self, action: HistoryAction, description: String, event: ChangeEvent) {
        self.push_history(action, description);
        self.persist();
        self.notifier.notify(event);
    }

    // ---- Subscriptions ----

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: Fn(ChangeEvent) -> anyhow::Result<()> + Send + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.notifier.unsubscribe(subscription)
    }

    // ---- Tasks ----

    /// All tasks ordered by project, start date, then effective end date.
    pub fn tasks(&self) -> Vec<Task> {
        logic::sorted_tasks(&self.tasks)
    }

    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add_task(&mut self, input: TaskInput) -> Task {
        let task = input.into_task(new_id());
        let description = format!("Added task: {}", task.task);
        self.tasks.push(task.clone());
        self.commit(HistoryAction::AddTask, description, ChangeEvent::TaskAdded);
        task
    }

    /// Returns `None` when no task has `id`; nothing is recorded then.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Option<Task> {
        let position = self.tasks.iter().position(|t| t.id == id)?;
        let old_name = self.tasks[position].task.clone();
        patch.apply(&mut self.tasks[position]);
        let updated = self.tasks[position].clone();
        self.commit(
            HistoryAction::EditTask,
            format!("Edited task: {old_name}"),
            ChangeEvent::TaskUpdated,
        );
        Some(updated)
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let Some(position) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let removed = self.tasks.remove(position);
        self.commit(
            HistoryAction::DeleteTask,
            format!("Deleted task: {}", removed.task),
            ChangeEvent::TaskDeleted,
        );
        true
    }

    // ---- Conferences ----

    /// All conferences ordered by start date.
    pub fn conferences(&self) -> Vec<Conference> {
        logic::sorted_conferences(&self.conferences)
    }

    pub fn conference_by_id(&self, id: &str) -> Option<&Conference> {
        self.conferences.iter().find(|c| c.id == id)
    }

    pub fn add_conference(&mut self, input: ConferenceInput) -> Conference {
        let conference = input.into_conference(new_id());
        let description = format!("Added conference: {}", conference.project);
        self.conferences.push(conference.clone());
        self.commit(
            HistoryAction::AddConference,
            description,
            ChangeEvent::ConferenceAdded,
        );
        conference
    }

    pub fn update_conference(&mut self, id: &str, patch: ConferencePatch) -> Option<Conference> {
        let position = self.conferences.iter().position(|c| c.id == id)?;
        let old_name = self.conferences[position].project.clone();
        patch.apply(&mut self.conferences[position]);
        let updated = self.conferences[position].clone();
        self.commit(
            HistoryAction::EditConference,
            format!("Edited conference: {old_name}"),
            ChangeEvent::ConferenceUpdated,
        );
        Some(updated)
    }

    pub fn delete_conference(&mut self, id: &str) -> bool {
        let Some(position) = self.conferences.iter().position(|c| c.id == id) else {
            return false;
        };
        let removed = self.conferences.remove(position);
        self.commit(
            HistoryAction::DeleteConference,
            format!("Deleted conference: {}", removed.project),
            ChangeEvent::ConferenceDeleted,
        );
        true
    }

    // ---- History ----

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    pub fn history_entries(&self) -> Vec<HistoryListing> {
        self.history.listing()
    }

    pub fn history_entry(&self, id: &str) -> Option<&HistoryEntry> {
        self.history.find(id)
    }

    /// Steps back one entry. Returns false (and changes nothing) at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_back() else {
            return false;
        };
        self.restore(snapshot);
        tracing::debug!(index = self.history.index(), "undo");
        self.persist();
        self.notifier.notify(ChangeEvent::Undo);
        true
    }

    /// Steps forward one entry. Returns false (and changes nothing) at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_forward() else {
            return false;
        };
        self.restore(snapshot);
        tracing::debug!(index = self.history.index(), "redo");
        self.persist();
        self.notifier.notify(ChangeEvent::Redo);
        true
    }

    /// Loads the snapshot of entry `id` and records that as a new `revert` entry.
    pub fn revert_to(&mut self, id: &str) -> bool {
        let Some(target) = self.history.find(id) else {
            return false;
        };
        let snapshot = target.snapshot.clone();
        let description = format!("Reverted to: {}", target.description);
        self.restore(snapshot);
        self.commit(HistoryAction::Revert, description, ChangeEvent::Revert);
        true
    }

    // ---- Colors ----

    pub fn colors(&self) -> &ColorPalette {
        &self.colors
    }

    pub fn update_colors(&mut self, patch: &ColorPatch) -> Result<ColorPalette, StoreError> {
        self.colors = self.colors.merged(patch)?;
        self.persist();
        self.notifier.notify(ChangeEvent::ColorsChanged);
        Ok(self.colors.clone())
    }

    pub fn reset_colors(&mut self) -> ColorPalette {
        self.colors = ColorPalette::default();
        self.persist();
        self.notifier.notify(ChangeEvent::ColorsChanged);
        self.colors.clone()
    }

    // ---- Settings ----

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<Settings, StoreError> {
        let merged = patch.merged(&self.settings);
        merged.validate()?;
        self.settings = merged;
        self.history.shrink_to(self.settings.max_history_entries);
        self.persist();
        self.notifier.notify(ChangeEvent::SettingsChanged);
        Ok(self.settings.clone())
    }

    pub fn reset_settings(&mut self) -> Settings {
        self.settings = Settings::default();
        self.history.shrink_to(self.settings.max_history_entries);
        self.persist();
        self.notifier.notify(ChangeEvent::SettingsChanged);
        self.settings.clone()
    }

    // ---- Derived views ----

    pub fn compute_date_range(&self, today: NaiveDate) -> DateRange {
        logic::compute_date_range(&self.tasks, &self.conferences, &self.settings, today)
    }

    /// Date range relative to the local calendar date.
    pub fn current_date_range(&self) -> DateRange {
        self.compute_date_range(Local::now().date_naive())
    }

    pub fn timeline(&self, today: NaiveDate) -> TimelineGrid {
        let range = self.compute_date_range(today);
        logic::build_timeline(
            &self.tasks(),
            &self.conferences(),
            &self.settings,
            range,
            today,
        )
    }

    // ---- Import / export ----

    pub fn export_data(&self) -> Result<String, StoreError> {
        let payload = ExportPayload {
            version: EXPORT_VERSION,
            export_date: Utc::now(),
            tasks: &self.tasks,
            conferences: &self.conferences,
            colors: &self.colors,
            settings: &self.settings,
        };
        Ok(transfer::export_json(&payload)?)
    }

    pub fn export_csv(&self) -> String {
        transfer::to_csv(&self.tasks, &self.conferences)
    }

    /// Replaces every slice present in `text`. On any error nothing changes.
    pub fn import_data(&mut self, text: &str) -> Result<(), StoreError> {
        let payload = match transfer::parse_import(text) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "import rejected");
                return Err(err.into());
            }
        };
        if let Some(settings) = &payload.settings {
            settings.validate()?;
        }
        if let Some(colors) = &payload.colors {
            colors.validate()?;
        }

        if let Some(tasks) = payload.tasks {
            self.tasks = tasks;
        }
        if let Some(conferences) = payload.conferences {
            self.conferences = conferences;
        }
        if let Some(colors) = payload.colors {
            self.colors = colors;
        }
        if let Some(settings) = payload.settings {
            self.settings = settings;
        }
        tracing::info!(
            tasks = self.tasks.len(),
            conferences = self.conferences.len(),
            "imported data"
        );
        self.commit(
            HistoryAction::Import,
            "Imported data from file".to_string(),
            ChangeEvent::Import,
        );
        Ok(())
    }

    pub fn clear_all_data(&mut self) {
        self.tasks.clear();
        self.conferences.clear();
        tracing::info!("cleared all data");
        self.commit(
            HistoryAction::Clear,
            "Cleared all data".to_string(),
            ChangeEvent::Clear,
        );
    }
}
