/*
Ordering, date-range and timeline-grid derivation.
Module is independent of the store and of HTTP / Axum for testing.
*/

use std::cmp::Ordering;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::models::{Conference, Task, TaskStatus};
use crate::preferences::{ColorRole, Settings, WeekStartDay};

// Expected tasks with no end date are drawn this far past today.
const EXPECTED_LOOKAHEAD_DAYS: u64 = 14;

// Task order: project asc, start date asc, effective end asc.
// Missing dates sort as earliest (None < Some).
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.project
        .cmp(&b.project)
        .then_with(|| a.start_date.cmp(&b.start_date))
        .then_with(|| a.effective_end().cmp(&b.effective_end()))
}

/// Stable sort by `compare_tasks`.
pub fn sorted_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(compare_tasks);
    sorted
}

/// Stable sort by start date, missing start first.
pub fn sorted_conferences(conferences: &[Conference]) -> Vec<Conference> {
    let mut sorted = conferences.to_vec();
    sorted.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    sorted
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn days_from_week_start(date: NaiveDate, week_start: WeekStartDay) -> i64 {
    let weekday = date.weekday();
    let days = match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday(),
        WeekStartDay::Sunday => weekday.num_days_from_sunday(),
    };
    i64::from(days)
}

/// Latest week start on or before `date`.
pub fn week_start_on_or_before(date: NaiveDate, week_start: WeekStartDay) -> NaiveDate {
    let back = days_from_week_start(date, week_start) as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

/// Earliest week end on or after `date`.
pub fn week_end_on_or_after(date: NaiveDate, week_start: WeekStartDay) -> NaiveDate {
    let ahead = (6 - days_from_week_start(date, week_start)) as u64;
    date.checked_add_days(Days::new(ahead)).unwrap_or(NaiveDate::MAX)
}

fn record_dates<'a>(
    tasks: &'a [Task],
    conferences: &'a [Conference],
) -> impl Iterator<Item = NaiveDate> + 'a {
    let task_dates = tasks
        .iter()
        .flat_map(|t| [t.start_date, t.due_date, t.finish_date]);
    let conference_dates = conferences.iter().flat_map(|c| [c.start_date, c.finish_date]);
    task_dates.chain(conference_dates).flatten()
}

/// Display window covering every record date, padded and snapped to whole weeks.
///
/// With no dates at all the window is one year back to three months ahead of
/// `today`. Padding applies in both cases.
pub fn compute_date_range(
    tasks: &[Task],
    conferences: &[Conference],
    settings: &Settings,
    today: NaiveDate,
) -> DateRange {
    let bounds = record_dates(tasks, conferences).fold(None, |acc, date| match acc {
        None => Some((date, date)),
        Some((lo, hi)) => Some((std::cmp::min(lo, date), std::cmp::max(hi, date))),
    });

    let (min, max) = bounds.unwrap_or_else(|| {
        (
            today.checked_sub_months(Months::new(12)).unwrap_or(today),
            today.checked_add_months(Months::new(3)).unwrap_or(today),
        )
    });

    // Saturates at the calendar bounds.
    let min = min
        .checked_sub_days(Days::new(u64::from(settings.date_range_extend_before)))
        .unwrap_or(NaiveDate::MIN);
    let max = max
        .checked_add_days(Days::new(u64::from(settings.date_range_extend_after)))
        .unwrap_or(NaiveDate::MAX);

    DateRange {
        start: week_start_on_or_before(min, settings.week_start_day),
        end: week_end_on_or_after(max, settings.week_start_day),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeekColumn {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// 1-based, counted from the week containing the 1st of `start`'s month.
    pub week_in_month: u32,
    pub is_current: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthSpan {
    pub year: i32,
    pub month: u32,
    /// Index of the first week column in this month.
    pub start: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineCell {
    pub filled: bool,
    pub due_marker: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: String,
    pub project: String,
    pub project_separator: bool,
    pub due_approaching: bool,
    pub days_remaining: Option<i64>,
    pub greyed: bool,
    pub color_role: ColorRole,
    pub cells: Vec<TimelineCell>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRow {
    pub id: String,
    pub greyed: bool,
    pub color_role: ColorRole,
    pub cells: Vec<TimelineCell>,
}

/// Everything a renderer needs to draw the week grid.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineGrid {
    pub range: DateRange,
    pub weeks: Vec<WeekColumn>,
    pub month_spans: Vec<MonthSpan>,
    pub current_week: Option<usize>,
    pub tasks: Vec<TaskRow>,
    pub conferences: Vec<ConferenceRow>,
}

fn week_in_month(week_start: NaiveDate, first_day: WeekStartDay) -> u32 {
    let month_first = week_start.with_day(1).unwrap_or(week_start);
    let first_week = week_start_on_or_before(month_first, first_day);
    ((week_start - first_week).num_days() / 7) as u32 + 1
}

pub fn week_columns(range: DateRange, settings: &Settings, today: NaiveDate) -> Vec<WeekColumn> {
    let mut weeks = Vec::new();
    let mut start = range.start;
    while start <= range.end {
        let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        weeks.push(WeekColumn {
            start,
            end,
            week_in_month: week_in_month(start, settings.week_start_day),
            is_current: start <= today && today <= end,
        });
        match start.checked_add_days(Days::new(7)) {
            Some(next) => start = next,
            None => break,
        }
    }
    weeks
}

pub fn month_spans(weeks: &[WeekColumn]) -> Vec<MonthSpan> {
    let mut spans: Vec<MonthSpan> = Vec::new();
    for (i, week) in weeks.iter().enumerate() {
        let (year, month) = (week.start.year(), week.start.month());
        match spans.last_mut() {
            Some(span) if span.year == year && span.month == month => span.count += 1,
            _ => spans.push(MonthSpan {
                year,
                month,
                start: i,
                count: 1,
            }),
        }
    }
    spans
}

fn overlaps(week: &WeekColumn, start: NaiveDate, end: NaiveDate) -> bool {
    week.start <= end && week.end >= start
}

// Last date a task's bar is painted through.
fn color_end(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    if task.status == TaskStatus::Ongoing {
        return Some(today);
    }
    match task.finish_date.or(task.due_date) {
        Some(end) => Some(end),
        None if task.status == TaskStatus::Expected => {
            today.checked_add_days(Days::new(EXPECTED_LOOKAHEAD_DAYS))
        }
        None => task.start_date,
    }
}

fn task_row(
    task: &Task,
    previous_project: Option<&str>,
    weeks: &[WeekColumn],
    settings: &Settings,
    today: NaiveDate,
) -> TaskRow {
    let ongoing = task.status == TaskStatus::Ongoing;
    let days_remaining = task.due_date.map(|due| (due - today).num_days());
    let due_approaching = ongoing
        && days_remaining.is_some_and(|days| days >= 0 && days <= i64::from(settings.due_soon_days));
    let project_separator = settings.show_project_separators
        && previous_project.is_some_and(|prev| prev != task.project);

    let bar = task.start_date.zip(color_end(task, today));
    let cells = weeks
        .iter()
        .map(|week| TimelineCell {
            filled: bar.is_some_and(|(start, end)| overlaps(week, start, end)),
            due_marker: task
                .due_date
                .is_some_and(|due| week.start <= due && due <= week.end),
        })
        .collect();

    TaskRow {
        id: task.id.clone(),
        project: task.project.clone(),
        project_separator,
        due_approaching,
        days_remaining,
        greyed: task.status.is_greyed(),
        color_role: task.status.color_role(),
        cells,
    }
}

fn conference_row(conference: &Conference, weeks: &[WeekColumn]) -> ConferenceRow {
    let bar = conference
        .start_date
        .map(|start| (start, conference.finish_date.unwrap_or(start)));
    ConferenceRow {
        id: conference.id.clone(),
        greyed: conference.status.is_greyed(),
        color_role: conference.status.color_role(),
        cells: weeks
            .iter()
            .map(|week| TimelineCell {
                filled: bar.is_some_and(|(start, end)| overlaps(week, start, end)),
                due_marker: false,
            })
            .collect(),
    }
}

/// Builds the grid from already-sorted tasks and conferences.
pub fn build_timeline(
    tasks: &[Task],
    conferences: &[Conference],
    settings: &Settings,
    range: DateRange,
    today: NaiveDate,
) -> TimelineGrid {
    let weeks = week_columns(range, settings, today);
    let month_spans = month_spans(&weeks);
    let current_week = weeks.iter().position(|w| w.is_current);

    let mut previous_project: Option<&str> = None;
    let mut task_rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        task_rows.push(task_row(task, previous_project, &weeks, settings, today));
        previous_project = Some(task.project.as_str());
    }

    let conference_rows = if settings.show_conferences {
        conferences.iter().map(|c| conference_row(c, &weeks)).collect()
    } else {
        Vec::new()
    };

    TimelineGrid {
        range,
        weeks,
        month_spans,
        current_week,
        tasks: task_rows,
        conferences: conference_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConferenceInput, ConferenceStatus, TaskInput};
    use chrono::Weekday;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: &str, project: &str, start: Option<&str>, due: Option<&str>, finish: Option<&str>) -> Task {
        TaskInput {
            project: project.to_string(),
            start_date: start.map(d),
            due_date: due.map(d),
            finish_date: finish.map(d),
            ..TaskInput::default()
        }
        .into_task(id.to_string())
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn earlier_start_sorts_first_within_project() {
        let tasks = vec![
            task("feb", "A", Some("2026-02-01"), None, None),
            task("jan", "A", Some("2026-01-01"), None, None),
        ];
        assert_eq!(ids(&sorted_tasks(&tasks)), vec!["jan", "feb"]);
    }

    #[test]
    fn tasks_sort_by_project_then_start_then_end() {
        let tasks = vec![
            task("b1", "B", Some("2026-01-01"), None, None),
            task("a-late-end", "A", Some("2026-01-01"), Some("2026-03-01"), None),
            task("a-no-start", "A", None, Some("2026-05-01"), None),
            task("a-early-end", "A", Some("2026-01-01"), Some("2026-04-01"), Some("2026-02-01")),
        ];
        assert_eq!(
            ids(&sorted_tasks(&tasks)),
            vec!["a-no-start", "a-early-end", "a-late-end", "b1"]
        );
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let tasks = vec![
            task("first", "A", Some("2026-01-01"), None, None),
            task("second", "A", Some("2026-01-01"), None, None),
        ];
        assert_eq!(ids(&sorted_tasks(&tasks)), vec!["first", "second"]);
    }

    #[test]
    fn conferences_sort_by_start_with_missing_first() {
        let make = |id: &str, start: Option<&str>| {
            ConferenceInput {
                start_date: start.map(d),
                ..ConferenceInput::default()
            }
            .into_conference(id.to_string())
        };
        let sorted = sorted_conferences(&[
            make("late", Some("2026-08-01")),
            make("none", None),
            make("early", Some("2026-06-01")),
        ]);
        let ids: Vec<&str> = sorted.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["none", "early", "late"]);
    }

    #[rstest]
    #[case("2026-10-19", "2026-10-19", "2026-10-25")] // Monday
    #[case("2026-10-21", "2026-10-19", "2026-10-25")] // Wednesday
    #[case("2026-10-25", "2026-10-19", "2026-10-25")] // Sunday
    fn monday_week_bounds(#[case] date: &str, #[case] start: &str, #[case] end: &str) {
        assert_eq!(week_start_on_or_before(d(date), WeekStartDay::Monday), d(start));
        assert_eq!(week_end_on_or_after(d(date), WeekStartDay::Monday), d(end));
    }

    #[test]
    fn sunday_week_bounds() {
        let date = d("2026-10-21");
        assert_eq!(week_start_on_or_before(date, WeekStartDay::Sunday), d("2026-10-18"));
        assert_eq!(week_end_on_or_after(date, WeekStartDay::Sunday), d("2026-10-24"));
    }

    #[test]
    fn date_range_pads_and_snaps_to_weeks() {
        let tasks = vec![task("t", "A", Some("2026-01-14"), Some("2026-02-04"), None)];
        let range = compute_date_range(&tasks, &[], &Settings::default(), d("2026-10-19"));
        // 2026-01-14 - 7 = 2026-01-07 (Wed) -> Monday 2026-01-05
        // 2026-02-04 + 14 = 2026-02-18 (Wed) -> Sunday 2026-02-22
        assert_eq!(range, DateRange { start: d("2026-01-05"), end: d("2026-02-22") });
        assert_eq!(range.start.weekday(), Weekday::Mon);
        assert_eq!(range.end.weekday(), Weekday::Sun);
    }

    #[test]
    fn date_range_includes_conference_dates() {
        let conference = ConferenceInput {
            start_date: Some(d("2026-07-19")),
            finish_date: Some(d("2026-07-25")),
            status: ConferenceStatus::WillAttend,
            ..ConferenceInput::default()
        }
        .into_conference("c".into());
        let tasks = vec![task("t", "A", Some("2026-01-14"), None, None)];
        let range = compute_date_range(&tasks, &[conference], &Settings::default(), d("2026-10-19"));
        assert!(range.end >= d("2026-08-08"));
    }

    #[test]
    fn date_range_without_dates_falls_back_around_today() {
        let settings = Settings {
            date_range_extend_before: 0,
            date_range_extend_after: 0,
            ..Settings::default()
        };
        let range = compute_date_range(&[], &[], &settings, d("2026-10-21"));
        assert_eq!(range.start, d("2025-10-20"));
        assert_eq!(range.end, d("2027-01-24"));
    }

    #[test]
    fn date_range_saturates_at_calendar_bounds() {
        let settings = Settings {
            date_range_extend_before: u32::MAX,
            date_range_extend_after: u32::MAX,
            ..Settings::default()
        };
        let range = compute_date_range(&[], &[], &settings, d("2026-01-01"));
        assert_eq!(range.start, week_start_on_or_before(NaiveDate::MIN, settings.week_start_day));
        assert_eq!(range.end, week_end_on_or_after(NaiveDate::MAX, settings.week_start_day));

        let mut edge = task("edge", "A", None, None, None);
        edge.start_date = Some(NaiveDate::MAX);
        edge.due_date = Some(NaiveDate::MIN);
        let range = compute_date_range(&[edge], &[], &Settings::default(), d("2026-01-01"));
        assert!(range.start <= range.end);
        assert_eq!(range.end, NaiveDate::MAX);
    }

    #[test]
    fn month_spans_group_consecutive_weeks() {
        let range = DateRange { start: d("2026-01-26"), end: d("2026-03-08") };
        let weeks = week_columns(range, &Settings::default(), d("2026-02-11"));
        let spans = month_spans(&weeks);
        assert_eq!(
            spans,
            vec![
                MonthSpan { year: 2026, month: 1, start: 0, count: 1 },
                MonthSpan { year: 2026, month: 2, start: 1, count: 4 },
                MonthSpan { year: 2026, month: 3, start: 5, count: 1 },
            ]
        );
        assert_eq!(weeks.iter().position(|w| w.is_current), Some(2));
    }

    #[test]
    fn week_in_month_counts_from_the_week_of_the_first() {
        // 2026-02-01 is a Sunday, so its Monday week starts 2026-01-26.
        assert_eq!(week_in_month(d("2026-02-02"), WeekStartDay::Monday), 2);
        assert_eq!(week_in_month(d("2026-02-23"), WeekStartDay::Monday), 5);
        assert_eq!(week_in_month(d("2026-06-01"), WeekStartDay::Monday), 1);
    }

    #[test]
    fn timeline_rows_mark_bars_due_weeks_and_separators() {
        let today = d("2026-02-11");
        let mut done = task("done", "A", Some("2026-02-02"), Some("2026-02-20"), Some("2026-02-10"));
        done.status = TaskStatus::Done;
        let ongoing = task("ongoing", "B", Some("2026-02-02"), Some("2026-02-16"), None);
        let mut postponed = task("postponed", "B", Some("2026-02-23"), None, None);
        postponed.status = TaskStatus::Postponed;

        let tasks = vec![done, ongoing, postponed];
        let range = DateRange { start: d("2026-02-02"), end: d("2026-03-01") };
        let grid = build_timeline(&tasks, &[], &Settings::default(), range, today);

        assert_eq!(grid.weeks.len(), 4);
        assert_eq!(grid.current_week, Some(1));

        let filled = |row: &TaskRow| row.cells.iter().map(|c| c.filled).collect::<Vec<_>>();
        let due = |row: &TaskRow| row.cells.iter().map(|c| c.due_marker).collect::<Vec<_>>();

        let done_row = &grid.tasks[0];
        assert!(!done_row.project_separator);
        assert_eq!(filled(done_row), vec![true, true, false, false]);
        assert_eq!(due(done_row), vec![false, false, true, false]);
        assert_eq!(done_row.color_role, ColorRole::Done);

        let ongoing_row = &grid.tasks[1];
        assert!(ongoing_row.project_separator);
        assert!(ongoing_row.due_approaching);
        assert_eq!(ongoing_row.days_remaining, Some(5));
        assert_eq!(filled(ongoing_row), vec![true, true, false, false]);

        let postponed_row = &grid.tasks[2];
        assert!(!postponed_row.project_separator);
        assert!(postponed_row.greyed);
        assert_eq!(postponed_row.color_role, ColorRole::Grey);
        assert_eq!(filled(postponed_row), vec![false, false, false, true]);
    }

    #[test]
    fn expected_task_without_end_extends_past_today() {
        let mut expected = task("e", "A", Some("2026-02-02"), None, None);
        expected.status = TaskStatus::Expected;
        let range = DateRange { start: d("2026-02-02"), end: d("2026-03-08") };
        let grid = build_timeline(&[expected], &[], &Settings::default(), range, d("2026-02-04"));
        let filled: Vec<bool> = grid.tasks[0].cells.iter().map(|c| c.filled).collect();
        assert_eq!(filled, vec![true, true, true, false, false]);
    }

    #[test]
    fn conferences_are_hidden_when_disabled() {
        let conference = ConferenceInput {
            start_date: Some(d("2026-02-03")),
            status: ConferenceStatus::Cancelled,
            ..ConferenceInput::default()
        }
        .into_conference("c".into());
        let range = DateRange { start: d("2026-02-02"), end: d("2026-02-15") };

        let grid = build_timeline(&[], &[conference.clone()], &Settings::default(), range, d("2026-02-04"));
        assert_eq!(grid.conferences.len(), 1);
        assert!(grid.conferences[0].greyed);
        assert_eq!(grid.conferences[0].color_role, ColorRole::ConferenceCancelled);
        assert_eq!(
            grid.conferences[0].cells.iter().map(|c| c.filled).collect::<Vec<_>>(),
            vec![true, false]
        );

        let hidden = Settings {
            show_conferences: false,
            ..Settings::default()
        };
        let grid = build_timeline(&[], &[conference], &hidden, range, d("2026-02-04"));
        assert!(grid.conferences.is_empty());
    }
}
