//! User preferences: display settings and the color palette.
//!
//! Neither participates in history. Both decode leniently (missing keys take
//! defaults, unknown keys are ignored) when read back from storage or an
//! import, and strictly (unknown keys rejected) when applied as a patch.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    #[default]
    Monday,
    Sunday,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Ongoing tasks due within this many days are flagged.
    pub due_soon_days: u32,
    pub week_start_day: WeekStartDay,
    pub show_current_week: bool,
    pub show_legend: bool,
    pub show_conferences: bool,
    pub show_tooltips: bool,
    pub compact_mode: bool,
    pub date_range_extend_before: u32,
    pub date_range_extend_after: u32,
    pub max_history_entries: usize,
    pub auto_save: bool,
    pub show_project_separators: bool,
    pub timeline_cell_width: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            due_soon_days: 7,
            week_start_day: WeekStartDay::Monday,
            show_current_week: true,
            show_legend: true,
            show_conferences: true,
            show_tooltips: true,
            compact_mode: false,
            date_range_extend_before: 7,
            date_range_extend_after: 14,
            max_history_entries: 200,
            auto_save: true,
            show_project_separators: true,
            timeline_cell_width: 28,
        }
    }
}

/// Upper bound for the date-range padding settings.
pub const MAX_RANGE_EXTEND_DAYS: u32 = 366;

impl Settings {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.max_history_entries == 0 {
            return Err(StoreError::InvalidSetting {
                field: "maxHistoryEntries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.timeline_cell_width == 0 {
            return Err(StoreError::InvalidSetting {
                field: "timelineCellWidth",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, days) in [
            ("dateRangeExtendBefore", self.date_range_extend_before),
            ("dateRangeExtendAfter", self.date_range_extend_after),
        ] {
            if days > MAX_RANGE_EXTEND_DAYS {
                return Err(StoreError::InvalidSetting {
                    field,
                    reason: format!("must be at most {MAX_RANGE_EXTEND_DAYS} days"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub due_soon_days: Option<u32>,
    pub week_start_day: Option<WeekStartDay>,
    pub show_current_week: Option<bool>,
    pub show_legend: Option<bool>,
    pub show_conferences: Option<bool>,
    pub show_tooltips: Option<bool>,
    pub compact_mode: Option<bool>,
    pub date_range_extend_before: Option<u32>,
    pub date_range_extend_after: Option<u32>,
    pub max_history_entries: Option<usize>,
    pub auto_save: Option<bool>,
    pub show_project_separators: Option<bool>,
    pub timeline_cell_width: Option<u32>,
}

impl SettingsPatch {
    /// Merges onto `base`, returning the result without validating it.
    pub fn merged(&self, base: &Settings) -> Settings {
        Settings {
            due_soon_days: self.due_soon_days.unwrap_or(base.due_soon_days),
            week_start_day: self.week_start_day.unwrap_or(base.week_start_day),
            show_current_week: self.show_current_week.unwrap_or(base.show_current_week),
            show_legend: self.show_legend.unwrap_or(base.show_legend),
            show_conferences: self.show_conferences.unwrap_or(base.show_conferences),
            show_tooltips: self.show_tooltips.unwrap_or(base.show_tooltips),
            compact_mode: self.compact_mode.unwrap_or(base.compact_mode),
            date_range_extend_before: self
                .date_range_extend_before
                .unwrap_or(base.date_range_extend_before),
            date_range_extend_after: self
                .date_range_extend_after
                .unwrap_or(base.date_range_extend_after),
            max_history_entries: self.max_history_entries.unwrap_or(base.max_history_entries),
            auto_save: self.auto_save.unwrap_or(base.auto_save),
            show_project_separators: self
                .show_project_separators
                .unwrap_or(base.show_project_separators),
            timeline_cell_width: self.timeline_cell_width.unwrap_or(base.timeline_cell_width),
        }
    }
}

/// Semantic color slots the timeline view paints with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ColorRole {
    Ongoing,
    Done,
    Accepted,
    Expected,
    Rejected,
    Postponed,
    Cancelled,
    Grey,
    Header,
    ApproachingDue,
    OngoingStripe,
    Attended,
    WillAttend,
    Unsure,
    CantAttend,
    ConferenceCancelled,
    Conference,
    CurrentWeekBorder,
    CurrentWeekBg,
    DueBorder,
}

impl ColorRole {
    pub const ALL: [ColorRole; 20] = [
        Self::Ongoing,
        Self::Done,
        Self::Accepted,
        Self::Expected,
        Self::Rejected,
        Self::Postponed,
        Self::Cancelled,
        Self::Grey,
        Self::Header,
        Self::ApproachingDue,
        Self::OngoingStripe,
        Self::Attended,
        Self::WillAttend,
        Self::Unsure,
        Self::CantAttend,
        Self::ConferenceCancelled,
        Self::Conference,
        Self::CurrentWeekBorder,
        Self::CurrentWeekBg,
        Self::DueBorder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Done => "done",
            Self::Accepted => "accepted",
            Self::Expected => "expected",
            Self::Rejected => "rejected",
            Self::Postponed => "postponed",
            Self::Cancelled => "cancelled",
            Self::Grey => "grey",
            Self::Header => "header",
            Self::ApproachingDue => "approachingDue",
            Self::OngoingStripe => "ongoingStripe",
            Self::Attended => "attended",
            Self::WillAttend => "willAttend",
            Self::Unsure => "unsure",
            Self::CantAttend => "cantAttend",
            Self::ConferenceCancelled => "conferenceCancelled",
            Self::Conference => "conference",
            Self::CurrentWeekBorder => "currentWeekBorder",
            Self::CurrentWeekBg => "currentWeekBg",
            Self::DueBorder => "dueBorder",
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            Self::Ongoing => "#FF0000",
            Self::Done => "#00B050",
            Self::Accepted => "#00B050",
            Self::Expected => "#FFC000",
            Self::Rejected => "#C0C0C0",
            Self::Postponed => "#C0C0C0",
            Self::Cancelled => "#C0C0C0",
            Self::Grey => "#C0C0C0",
            Self::Header => "#D3D3D3",
            Self::ApproachingDue => "#FF0000",
            Self::OngoingStripe => "#FF6464",
            Self::Attended => "#00B050",
            Self::WillAttend => "#FF0000",
            Self::Unsure => "#FF8000",
            Self::CantAttend => "#C0C0C0",
            Self::ConferenceCancelled => "#C0C0C0",
            Self::Conference => "#FFFF00",
            Self::CurrentWeekBorder => "#FF0000",
            Self::CurrentWeekBg => "#FFC8C8",
            Self::DueBorder => "#FF0000",
        }
    }
}

impl FromStr for ColorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown color role '{s}'"))
    }
}

impl std::fmt::Display for ColorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patch for the palette. Unknown role names fail to deserialize.
pub type ColorPatch = BTreeMap<ColorRole, String>;

/// Full palette; always holds a value for every role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorPalette(BTreeMap<ColorRole, String>);

impl Default for ColorPalette {
    fn default() -> Self {
        Self(
            ColorRole::ALL
                .into_iter()
                .map(|role| (role, role.default_color().to_string()))
                .collect(),
        )
    }
}

impl ColorPalette {
    pub fn get(&self, role: ColorRole) -> &str {
        self.0
            .get(&role)
            .map(String::as_str)
            .unwrap_or_else(|| role.default_color())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorRole, &str)> {
        self.0.iter().map(|(role, value)| (*role, value.as_str()))
    }

    /// Returns a copy with `patch` applied, rejecting values that are not hex colors.
    pub fn merged(&self, patch: &ColorPatch) -> Result<Self, StoreError> {
        let mut next = self.clone();
        for (role, value) in patch {
            let value = value.trim();
            if !is_hex_color(value) {
                return Err(StoreError::InvalidColor {
                    role: role.to_string(),
                    value: value.to_string(),
                });
            }
            next.0.insert(*role, value.to_string());
        }
        Ok(next)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        match self.iter().find(|(_, value)| !is_hex_color(value)) {
            Some((role, value)) => Err(StoreError::InvalidColor {
                role: role.to_string(),
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for ColorPalette {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut palette = ColorPalette::default();
        for (key, value) in raw {
            match key.parse::<ColorRole>() {
                Ok(role) => {
                    palette.0.insert(role, value);
                }
                Err(_) => tracing::debug!(key = %key, "ignoring unknown color role"),
            }
        }
        Ok(palette)
    }
}

/// `#RGB` or `#RRGGBB`.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
