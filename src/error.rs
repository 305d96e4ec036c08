//! Error types for the timeline core.
//!
//! Not-found on update/delete is reported through `Option`/`bool` by the
//! store itself; `StoreError::NotFound` exists for callers (the HTTP layer)
//! that need to turn those signals into a typed error.

use thiserror::Error;

/// Which record collection an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Task,
    Conference,
    HistoryEntry,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Task => "task",
            Self::Conference => "conference",
            Self::HistoryEntry => "history entry",
        };
        f.write_str(name)
    }
}

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error("invalid setting '{field}': {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("invalid color for '{role}': {value}")]
    InvalidColor { role: String, value: String },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reasons an import payload is rejected. The store is left untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(serde_json::Error),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("unsupported export version {0}")]
    UnsupportedVersion(u64),

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: RecordKind, id: String },
}

/// Failures of the durable key-value medium.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error("stored value for '{key}' is unreadable: {source}")]
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },
}
