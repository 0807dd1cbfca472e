use chrono::{DateTime, Utc};
use serde::Serialize;

use super::daily::{build_day_schedules, Daily, DaySchedule, OpeningHour, OpeningHourWindow};
use super::zoned_now::get_zoned_now;

const WEEKDAY_LABELS: [&str; 7] = [
    "Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum StatusLabel {
    Aberto,
    Fechado,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOpen {
    pub day_of_week: u8,
    pub opens_at: String,
}

/// Whether the restaurant is open at some instant.
///
/// `closes_at` is only set when open, `next_open` only when closed and something opens in the
/// coming seven days (later today included).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantStatus {
    pub is_open: bool,
    pub label: StatusLabel,
    pub current_day_index: u8,
    pub todays_windows: Vec<OpeningHourWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_open: Option<NextOpen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<String>,
}

fn find_day_schedule(schedules: &[DaySchedule], day_index: u8) -> Option<&DaySchedule> {
    schedules
        .iter()
        .find(|schedule| schedule.day_of_week == day_index)
}

/// Walks forward from today, wrapping around the week once.
/// Today only counts windows that have not started yet.
fn find_next_window(schedules: &[DaySchedule], today: u8, now_minutes: u16) -> Option<NextOpen> {
    (0..7u8).find_map(|offset| {
        let day_index = (today + offset) % 7;
        let schedule = find_day_schedule(schedules, day_index)?;
        let window = schedule
            .windows
            .iter()
            .find(|window| offset > 0 || window.start() > now_minutes)?;
        Some(NextOpen {
            day_of_week: day_index,
            opens_at: window.opens_at().to_string(),
        })
    })
}

/**
Computes the restaurant status for `instant` in `timezone`.

An empty schedule means nobody filled the sheet in yet, and the restaurant is reported as always
open so the menu stays usable. A configured schedule without windows for today is closed.

When windows overlap, the first one in opening order decides `closes_at`.
*/
pub fn get_restaurant_status(
    opening_hours: &[OpeningHour],
    timezone: &str,
    instant: DateTime<Utc>,
) -> RestaurantStatus {
    let now = get_zoned_now(timezone, instant);

    if opening_hours.is_empty() {
        return RestaurantStatus {
            is_open: true,
            label: StatusLabel::Aberto,
            current_day_index: now.day_index,
            todays_windows: vec![OpeningHourWindow::new("00:00", "23:59")],
            next_open: None,
            closes_at: None,
        };
    }

    let schedules = build_day_schedules(opening_hours);
    let todays: &[Daily] = find_day_schedule(&schedules, now.day_index)
        .map(|schedule| schedule.windows.as_slice())
        .unwrap_or_default();
    let todays_windows: Vec<OpeningHourWindow> = todays.iter().map(Daily::window).collect();

    if let Some(current) = todays
        .iter()
        .find(|window| window.contains(now.minutes_since_midnight))
    {
        return RestaurantStatus {
            is_open: true,
            label: StatusLabel::Aberto,
            current_day_index: now.day_index,
            todays_windows,
            next_open: None,
            closes_at: Some(current.closes_at().to_string()),
        };
    }

    RestaurantStatus {
        is_open: false,
        label: StatusLabel::Fechado,
        current_day_index: now.day_index,
        todays_windows,
        next_open: find_next_window(&schedules, now.day_index, now.minutes_since_midnight),
        closes_at: None,
    }
}

/// Portuguese weekday name, anything out of range reads as Sunday.
pub fn get_weekday_label(day_index: usize) -> &'static str {
    WEEKDAY_LABELS
        .get(day_index)
        .copied()
        .unwrap_or(WEEKDAY_LABELS[0])
}

/// The line shown under the open/closed badge.
///
/// The weekday is only spelled out when the next opening is not today.
pub fn status_hint(status: &RestaurantStatus) -> Option<String> {
    if status.is_open {
        return status
            .closes_at
            .as_ref()
            .map(|closes_at| format!("Fecha às {}", closes_at));
    }
    let next_open = status.next_open.as_ref()?;
    if next_open.day_of_week != status.current_day_index {
        Some(format!(
            "Abre {} às {}",
            get_weekday_label(next_open.day_of_week as usize),
            next_open.opens_at
        ))
    } else {
        Some(format!("Abre às {}", next_open.opens_at))
    }
}
