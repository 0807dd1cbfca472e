use serde::Serialize;

use crate::timing::schedule::{get_weekday_label, status_hint, RestaurantStatus};

/// What `/api/status` sends back: the evaluated status plus the text the badge shows.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    status: RestaurantStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    weekday_label: &'static str,
}

impl StatusResponse {
    pub fn new(status: RestaurantStatus) -> Self {
        Self {
            hint: status_hint(&status),
            weekday_label: get_weekday_label(status.current_day_index as usize),
            status,
        }
    }
}
