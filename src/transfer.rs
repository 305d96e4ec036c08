//! Portable export formats (versioned JSON, flat CSV) and import parsing.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, RecordKind};
use crate::models::{Conference, Task, date_field::DATE_FORMAT};
use crate::preferences::{ColorPalette, Settings};

pub const EXPORT_VERSION: u64 = 1;

pub const CSV_HEADER: [&str; 9] = [
    "Type",
    "Professor",
    "Area",
    "Project",
    "Task",
    "Start Date",
    "Due Date",
    "Finish Date",
    "Status",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload<'a> {
    pub version: u64,
    pub export_date: DateTime<Utc>,
    pub tasks: &'a [Task],
    pub conferences: &'a [Conference],
    pub colors: &'a ColorPalette,
    pub settings: &'a Settings,
}

/// A decoded import. Each present slice replaces the store's slice.
#[derive(Debug, Default, Deserialize)]
pub struct ImportPayload {
    pub version: Option<u64>,
    pub tasks: Option<Vec<Task>>,
    pub conferences: Option<Vec<Conference>>,
    pub colors: Option<ColorPalette>,
    pub settings: Option<Settings>,
}

pub fn export_json(payload: &ExportPayload<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

pub fn parse_import(text: &str) -> Result<ImportPayload, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(ImportError::Malformed)?;
    if !value.is_object() {
        return Err(ImportError::NotAnObject);
    }
    let payload: ImportPayload = serde_json::from_value(value).map_err(ImportError::Malformed)?;

    if let Some(version) = payload.version {
        if version > EXPORT_VERSION {
            return Err(ImportError::UnsupportedVersion(version));
        }
    }
    if let Some(tasks) = &payload.tasks {
        ensure_unique(RecordKind::Task, tasks.iter().map(|t| t.id.as_str()))?;
    }
    if let Some(conferences) = &payload.conferences {
        ensure_unique(RecordKind::Conference, conferences.iter().map(|c| c.id.as_str()))?;
    }
    Ok(payload)
}

fn ensure_unique<'a>(kind: RecordKind, ids: impl Iterator<Item = &'a str>) -> Result<(), ImportError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ImportError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

/// One header row, then tasks and conferences in stored order.
/// Free-text columns are always quoted; dates and status are not.
pub fn to_csv(tasks: &[Task], conferences: &[Conference]) -> String {
    let mut rows = Vec::with_capacity(1 + tasks.len() + conferences.len());
    rows.push(CSV_HEADER.join(","));

    for t in tasks {
        rows.push(
            [
                "Task".to_string(),
                quoted(&t.professor),
                quoted(&t.area),
                quoted(&t.project),
                quoted(&t.task),
                date_cell(t.start_date),
                date_cell(t.due_date),
                date_cell(t.finish_date),
                t.status.as_str().to_string(),
            ]
            .join(","),
        );
    }

    for c in conferences {
        rows.push(
            [
                "Conference".to_string(),
                String::new(),
                quoted(&c.area),
                quoted(&c.project),
                quoted(&c.task),
                date_cell(c.start_date),
                String::new(),
                date_cell(c.finish_date),
                c.status.as_str().to_string(),
            ]
            .join(","),
        );
    }

    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConferenceInput, ConferenceStatus, TaskInput, TaskStatus};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn csv_quotes_free_text_and_leaves_dates_bare() {
        let task = TaskInput {
            professor: "Dr. \"Q\" Smith".into(),
            area: "ML, DL".into(),
            project: "P".into(),
            task: "Write".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5),
            status: TaskStatus::Done,
            ..TaskInput::default()
        }
        .into_task("t".into());
        let conference = ConferenceInput {
            project: "ICML".into(),
            finish_date: NaiveDate::from_ymd_opt(2026, 7, 25),
            status: ConferenceStatus::CantAttend,
            ..ConferenceInput::default()
        }
        .into_conference("c".into());

        let csv = to_csv(&[task], &[conference]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Type,Professor,Area,Project,Task,Start Date,Due Date,Finish Date,Status",
                "Task,\"Dr. \"\"Q\"\" Smith\",\"ML, DL\",\"P\",\"Write\",2026-01-05,,,done",
                "Conference,,\"\",\"ICML\",\"\",,,2026-07-25,can't attend",
            ]
        );
    }

    #[test]
    fn csv_of_nothing_is_just_the_header() {
        assert_eq!(to_csv(&[], &[]), CSV_HEADER.join(","));
    }

    #[rstest]
    #[case("not json")]
    #[case("[1, 2, 3]")]
    #[case("\"tasks\"")]
    #[case(r#"{"tasks": {"id": "t1"}}"#)]
    #[case(r#"{"tasks": [{"status": "finished"}]}"#)]
    fn garbage_is_rejected(#[case] text: &str) {
        assert!(parse_import(text).is_err());
    }

    #[test]
    fn partial_payload_leaves_other_slices_absent() {
        let payload = parse_import(r#"{"conferences": []}"#).unwrap();
        assert!(payload.tasks.is_none());
        assert_eq!(payload.conferences.map(|c| c.len()), Some(0));
        assert!(payload.colors.is_none());
        assert!(payload.settings.is_none());
    }

    #[test]
    fn newer_versions_are_refused() {
        assert!(matches!(
            parse_import(r#"{"version": 2}"#),
            Err(ImportError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let result = parse_import(r#"{"tasks": [{"id": "a"}, {"id": "a"}]}"#);
        assert!(matches!(result, Err(ImportError::DuplicateId { kind: RecordKind::Task, .. })));
    }

    #[test]
    fn export_carries_version_and_all_slices() {
        let colors = ColorPalette::default();
        let settings = Settings::default();
        let text = export_json(&ExportPayload {
            version: EXPORT_VERSION,
            export_date: Utc::now(),
            tasks: &[],
            conferences: &[],
            colors: &colors,
            settings: &settings,
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["exportDate"].is_string());
        assert!(value["tasks"].as_array().unwrap().is_empty());
        assert_eq!(value["settings"]["maxHistoryEntries"], 200);
        assert_eq!(value["colors"]["ongoing"], "#FF0000");
    }
}
