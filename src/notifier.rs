//! Change notification for observers of the store.
//!
//! Listeners run synchronously in subscription order. A listener that
//! returns an error or panics is logged and skipped; the remaining
//! listeners still run and the mutating caller never sees the failure.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeEvent {
    TaskAdded,
    TaskUpdated,
    TaskDeleted,
    ConferenceAdded,
    ConferenceUpdated,
    ConferenceDeleted,
    Undo,
    Redo,
    Revert,
    Import,
    Clear,
    ColorsChanged,
    SettingsChanged,
}

impl ChangeEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskAdded => "task_added",
            Self::TaskUpdated => "task_updated",
            Self::TaskDeleted => "task_deleted",
            Self::ConferenceAdded => "conference_added",
            Self::ConferenceUpdated => "conference_updated",
            Self::ConferenceDeleted => "conference_deleted",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Revert => "revert",
            Self::Import => "import",
            Self::Clear => "clear",
            Self::ColorsChanged => "colors_changed",
            Self::SettingsChanged => "settings_changed",
        }
    }
}

impl std::fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Listener = Box<dyn Fn(ChangeEvent) -> anyhow::Result<()> + Send>;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    listeners: Vec<(Subscription, Listener)>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: Fn(ChangeEvent) -> anyhow::Result<()> + Send + 'static,
    {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    /// Returns false when the handle was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != subscription);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invokes every listener and returns how many of them failed.
    pub fn notify(&self, event: ChangeEvent) -> usize {
        let mut failures = 0;
        for (subscription, listener) in &self.listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failures += 1;
                    tracing::warn!(?subscription, %event, error = %err, "change listener failed");
                }
                Err(payload) => {
                    failures += 1;
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic payload".to_string());
                    tracing::error!(?subscription, %event, panic = %message, "change listener panicked");
                }
            }
        }
        failures
    }
}
