use std::collections::BTreeMap;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use project_timeline::{
    ColorRole, ConferenceInput, ConferenceStatus, HistoryAction, ImportError, MemoryKeyValueStore,
    PersistenceAdapter, SettingsPatch, StoreError, TaskInput, TimelineStore, WeekStartDay,
};
use rstest::rstest;

fn store(seed: bool) -> TimelineStore {
    TimelineStore::open(PersistenceAdapter::new(MemoryKeyValueStore::new(), seed))
}

#[test]
fn export_then_import_reproduces_the_state() {
    let mut source = store(true);
    let mut patch = BTreeMap::new();
    patch.insert(ColorRole::Ongoing, "#123abc".to_string());
    source.update_colors(&patch).unwrap();
    source
        .update_settings(&SettingsPatch {
            week_start_day: Some(WeekStartDay::Sunday),
            due_soon_days: Some(3),
            ..SettingsPatch::default()
        })
        .unwrap();
    let exported = source.export_data().unwrap();

    let mut target = store(false);
    target.import_data(&exported).unwrap();

    assert_eq!(target.tasks(), source.tasks());
    assert_eq!(target.conferences(), source.conferences());
    assert_eq!(target.colors(), source.colors());
    assert_eq!(target.settings(), source.settings());
    assert_eq!(target.colors().get(ColorRole::Ongoing), "#123abc");
}

#[test]
fn export_carries_version_and_date() {
    let exported = store(false).export_data().unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value["version"], 1);
    assert!(value["exportDate"].is_string());
    assert_eq!(value["tasks"], serde_json::json!([]));
}

#[rstest]
#[case::not_json("not json")]
#[case::array("[1, 2, 3]")]
#[case::future_version(r#"{"version": 7, "tasks": []}"#)]
#[case::bad_date(r#"{"tasks": [{"id": "a", "startDate": "soon"}]}"#)]
#[case::far_future_date(r#"{"tasks": [{"id": "t", "startDate": "+262142-12-30"}]}"#)]
#[case::huge_padding(r#"{"settings": {"dateRangeExtendBefore": 4294967295}}"#)]
#[case::duplicate_ids(r#"{"tasks": [{"id": "a"}, {"id": "a"}]}"#)]
#[case::zero_history(r#"{"settings": {"maxHistoryEntries": 0}}"#)]
#[case::bad_color(r#"{"colors": {"ongoing": "blue"}}"#)]
fn rejected_imports_leave_everything_untouched(#[case] payload: &str) {
    let mut store = store(true);
    let before = store.export_data().unwrap();
    let tasks = store.tasks();
    let history = store.history_entries().len();

    assert!(store.import_data(payload).is_err());

    assert_eq!(store.tasks(), tasks);
    assert_eq!(store.history_entries().len(), history);
    let after: serde_json::Value = serde_json::from_str(&store.export_data().unwrap()).unwrap();
    let before: serde_json::Value = serde_json::from_str(&before).unwrap();
    assert_eq!(after["tasks"], before["tasks"]);
    assert_eq!(after["colors"], before["colors"]);
    assert_eq!(after["settings"], before["settings"]);
}

#[test]
fn malformed_json_reports_an_import_error() {
    let mut store = store(false);
    let err = store.import_data("{ nope").unwrap_err();
    assert!(matches!(err, StoreError::Import(ImportError::Malformed(_))));
}

#[test]
fn partial_import_replaces_only_present_slices() {
    let mut store = store(true);
    let conferences = store.conferences();
    let settings = store.settings().clone();

    store
        .import_data(r#"{"tasks": [{"id": "x1", "task": "Only one", "status": "done"}]}"#)
        .unwrap();

    let tasks = store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "x1");
    assert_eq!(tasks[0].professor, "");
    assert_eq!(store.conferences(), conferences);
    assert_eq!(store.settings(), &settings);
}

#[test]
fn import_is_one_undoable_history_step() {
    let mut store = store(true);
    let len = store.history_entries().len();

    store.import_data(r#"{"tasks": [], "conferences": []}"#).unwrap();
    let entries = store.history_entries();
    assert_eq!(entries.len(), len + 1);
    assert_eq!(entries.last().unwrap().entry.action, HistoryAction::Import);
    assert_eq!(entries.last().unwrap().entry.description, "Imported data from file");
    assert!(store.tasks().is_empty());

    assert!(store.undo());
    assert_eq!(store.tasks().len(), 10);
}

#[test]
fn csv_lists_tasks_then_conferences() {
    let mut store = store(false);
    store.add_task(TaskInput {
        professor: "Kim".into(),
        area: "ML".into(),
        project: "Say \"hi\"".into(),
        task: "Draft".into(),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 5),
        ..TaskInput::default()
    });
    store.add_conference(ConferenceInput {
        area: "Vision".into(),
        project: "CVPR".into(),
        task: "Poster".into(),
        start_date: NaiveDate::from_ymd_opt(2026, 6, 10),
        finish_date: NaiveDate::from_ymd_opt(2026, 6, 14),
        status: ConferenceStatus::CantAttend,
    });

    let csv = store.export_csv();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Type,Professor,Area,Project,Task,Start Date,Due Date,Finish Date,Status",
            "Task,\"Kim\",\"ML\",\"Say \"\"hi\"\"\",\"Draft\",2026-01-05,,,ongoing",
            "Conference,,\"Vision\",\"CVPR\",\"Poster\",2026-06-10,,2026-06-14,can't attend",
        ]
    );
}

#[test]
fn csv_of_an_empty_store_is_just_the_header() {
    let store = store(false);
    assert_eq!(
        store.export_csv(),
        "Type,Professor,Area,Project,Task,Start Date,Due Date,Finish Date,Status"
    );
}

#[test]
fn out_of_range_inputs_never_reach_the_date_range() {
    let mut store = store(true);
    let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let before = store.compute_date_range(today);

    let err = store
        .update_settings(&SettingsPatch {
            date_range_extend_before: Some(u32::MAX),
            ..SettingsPatch::default()
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidSetting { field: "dateRangeExtendBefore", .. }));
    assert!(
        store
            .import_data(r#"{"tasks": [{"id": "t", "startDate": "+262142-12-30"}]}"#)
            .is_err()
    );

    assert_eq!(store.compute_date_range(today), before);
}
