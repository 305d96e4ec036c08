use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::preferences::ColorRole;

/// Generates a fresh opaque record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Ongoing,
    Done,
    Accepted,
    Expected,
    Rejected,
    Postponed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Done => "done",
            Self::Accepted => "accepted",
            Self::Expected => "expected",
            Self::Rejected => "rejected",
            Self::Postponed => "postponed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Rejected, postponed and cancelled tasks are drawn greyed out.
    pub fn is_greyed(&self) -> bool {
        matches!(self, Self::Rejected | Self::Postponed | Self::Cancelled)
    }

    pub fn color_role(&self) -> ColorRole {
        match self {
            Self::Ongoing => ColorRole::Ongoing,
            Self::Done => ColorRole::Done,
            Self::Accepted => ColorRole::Accepted,
            Self::Expected => ColorRole::Expected,
            Self::Rejected | Self::Postponed | Self::Cancelled => ColorRole::Grey,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ConferenceStatus {
    #[default]
    #[serde(rename = "will attend")]
    WillAttend,
    #[serde(rename = "attended")]
    Attended,
    #[serde(rename = "unsure of attendance")]
    Unsure,
    #[serde(rename = "can't attend")]
    CantAttend,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl ConferenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WillAttend => "will attend",
            Self::Attended => "attended",
            Self::Unsure => "unsure of attendance",
            Self::CantAttend => "can't attend",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_greyed(&self) -> bool {
        matches!(self, Self::CantAttend | Self::Cancelled)
    }

    pub fn color_role(&self) -> ColorRole {
        match self {
            Self::WillAttend => ColorRole::WillAttend,
            Self::Attended => ColorRole::Attended,
            Self::Unsure => ColorRole::Unsure,
            Self::CantAttend => ColorRole::CantAttend,
            Self::Cancelled => ColorRole::ConferenceCancelled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub professor: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub task: String,
    #[serde(default, with = "date_field")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    pub finish_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Finish date, else due date, else start date.
    pub fn effective_end(&self) -> Option<NaiveDate> {
        self.finish_date.or(self.due_date).or(self.start_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub area: String,
    /// Conference name.
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub task: String,
    #[serde(default, with = "date_field")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    pub finish_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ConferenceStatus,
}

// Input for addTask: every field is optional and falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskInput {
    pub professor: String,
    pub area: String,
    pub project: String,
    pub task: String,
    #[serde(with = "date_field")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "date_field")]
    pub due_date: Option<NaiveDate>,
    #[serde(with = "date_field")]
    pub finish_date: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl TaskInput {
    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            professor: self.professor,
            area: self.area,
            project: self.project,
            task: self.task,
            start_date: self.start_date,
            due_date: self.due_date,
            finish_date: self.finish_date,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceInput {
    pub area: String,
    pub project: String,
    pub task: String,
    #[serde(with = "date_field")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "date_field")]
    pub finish_date: Option<NaiveDate>,
    pub status: ConferenceStatus,
}

impl ConferenceInput {
    pub fn into_conference(self, id: String) -> Conference {
        Conference {
            id,
            area: self.area,
            project: self.project,
            task: self.task,
            start_date: self.start_date,
            finish_date: self.finish_date,
            status: self.status,
        }
    }
}

// Partial update for a task. `id` is not patchable; a stray `id` key is ignored.
// Date fields: absent = keep, "" or null = clear, "YYYY-MM-DD" = set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub professor: Option<String>,
    pub area: Option<String>,
    pub project: Option<String>,
    pub task: Option<String>,
    #[serde(default, deserialize_with = "date_field::deserialize_patch")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "date_field::deserialize_patch")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "date_field::deserialize_patch")]
    pub finish_date: Option<Option<NaiveDate>>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn apply(self, task: &mut Task) {
        if let Some(v) = self.professor {
            task.professor = v;
        }
        if let Some(v) = self.area {
            task.area = v;
        }
        if let Some(v) = self.project {
            task.project = v;
        }
        if let Some(v) = self.task {
            task.task = v;
        }
        if let Some(v) = self.start_date {
            task.start_date = v;
        }
        if let Some(v) = self.due_date {
            task.due_date = v;
        }
        if let Some(v) = self.finish_date {
            task.finish_date = v;
        }
        if let Some(v) = self.status {
            task.status = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConferencePatch {
    pub area: Option<String>,
    pub project: Option<String>,
    pub task: Option<String>,
    #[serde(default, deserialize_with = "date_field::deserialize_patch")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "date_field::deserialize_patch")]
    pub finish_date: Option<Option<NaiveDate>>,
    pub status: Option<ConferenceStatus>,
}

impl ConferencePatch {
    pub fn apply(self, conference: &mut Conference) {
        if let Some(v) = self.area {
            conference.area = v;
        }
        if let Some(v) = self.project {
            conference.project = v;
        }
        if let Some(v) = self.task {
            conference.task = v;
        }
        if let Some(v) = self.start_date {
            conference.start_date = v;
        }
        if let Some(v) = self.finish_date {
            conference.finish_date = v;
        }
        if let Some(v) = self.status {
            conference.status = v;
        }
    }
}

/// Serde adapter for calendar dates stored as `YYYY-MM-DD`, with `""` meaning unset.
pub mod date_field {
    use chrono::{DateTime, Datelike, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de};
    use thiserror::Error;

    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Years a record date may carry (four-digit ISO years).
    pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

    #[derive(Debug, Error)]
    pub enum DateError {
        #[error(transparent)]
        Format(#[from] chrono::ParseError),

        #[error("year {0} is outside 1..=9999")]
        OutOfRange(i32),
    }

    pub fn parse(text: &str) -> Result<NaiveDate, DateError> {
        let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
            .or_else(|err| DateTime::parse_from_rfc3339(text).map(|dt| dt.date_naive()).map_err(|_| err))?;
        if !YEAR_RANGE.contains(&date.year()) {
            return Err(DateError::OutOfRange(date.year()));
        }
        Ok(date)
    }

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .map_err(|err| de::Error::custom(format!("invalid date '{text}': {err}"))),
        }
    }

    // Only called when the key is present, so a present-but-empty value clears.
    pub fn deserialize_patch<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        deserialize(deserializer).map(Some)
    }
}
