use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::time_of_day::time_to_minutes;

/// One contiguous opening interval as written in the sheet, e.g. `09:00` to `18:00`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHourWindow {
    pub opens_at: String,
    pub closes_at: String,
}

impl OpeningHourWindow {
    pub fn new(opens_at: &str, closes_at: &str) -> Self {
        Self {
            opens_at: opens_at.to_string(),
            closes_at: closes_at.to_string(),
        }
    }
}

/// The raw opening hours for a weekday. `day_of_week` is 0 for Sunday through 6 for Saturday.
///
/// Several entries may share a weekday, their windows are merged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHour {
    pub day_of_week: u8,
    pub windows: Vec<OpeningHourWindow>,
}

impl OpeningHour {
    pub fn new(day_of_week: u8, windows: Vec<OpeningHourWindow>) -> Self {
        Self {
            day_of_week,
            windows,
        }
    }
}

/// A window that passed validation, carrying its minute offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Daily {
    window: OpeningHourWindow,
    start: u16,
    end: u16,
}

impl Daily {
    /// Returns `None` unless both times parse and the window closes after it opens.
    /// Windows that run past midnight are not representable.
    pub fn from_window(window: &OpeningHourWindow) -> Option<Self> {
        let start = time_to_minutes(&window.opens_at)?;
        let end = time_to_minutes(&window.closes_at)?;
        if end <= start {
            return None;
        }
        Some(Self {
            window: window.clone(),
            start,
            end,
        })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn opens_at(&self) -> &str {
        &self.window.opens_at
    }

    pub fn closes_at(&self) -> &str {
        &self.window.closes_at
    }

    /// Half open, the closing minute itself counts as closed.
    pub fn contains(&self, minute: u16) -> bool {
        self.start() <= minute && minute < self.end()
    }

    pub fn window(&self) -> OpeningHourWindow {
        self.window.clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaySchedule {
    pub day_of_week: u8,
    pub windows: Vec<Daily>,
}

/// Validates and groups the raw opening hours per weekday.
///
/// Invalid windows are dropped without complaint, a malformed sheet row should never take the
/// menu down. Windows of the same day are sorted by opening time (stable, so overlapping windows
/// keep their input order). Days left without a valid window are not part of the result and
/// must be read as closed.
pub fn build_day_schedules(raw_hours: &[OpeningHour]) -> Vec<DaySchedule> {
    let mut days: BTreeMap<u8, Vec<Daily>> = BTreeMap::new();

    for entry in raw_hours.iter().filter(|entry| entry.day_of_week <= 6) {
        let valid = entry.windows.iter().filter_map(Daily::from_window);
        days.entry(entry.day_of_week).or_default().extend(valid);
    }

    days.into_iter()
        .filter(|(_, windows)| !windows.is_empty())
        .map(|(day_of_week, mut windows)| {
            windows.sort_by_key(|window| window.start());
            DaySchedule {
                day_of_week,
                windows,
            }
        })
        .collect()
}
