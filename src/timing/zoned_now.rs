use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// The local weekday (0 = Sunday) and minute of the day of an instant in some timezone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ZonedNow {
    pub day_index: u8,
    pub minutes_since_midnight: u16,
}

/// Parses an IANA timezone name. Callers that want to report a bad name use this directly.
pub fn resolve_timezone(timezone: &str) -> Option<Tz> {
    timezone.trim().parse::<Tz>().ok()
}

/// Projects `instant` into `timezone`.
///
/// An unknown timezone falls back to UTC instead of failing, logging that is up to the caller
/// (see `resolve_timezone`).
pub fn get_zoned_now(timezone: &str, instant: DateTime<Utc>) -> ZonedNow {
    let tz: Tz = resolve_timezone(timezone).unwrap_or(Tz::UTC);
    let local: DateTime<Tz> = instant.with_timezone(&tz);
    ZonedNow {
        day_index: local.weekday().num_days_from_sunday() as u8,
        minutes_since_midnight: (local.hour() * 60 + local.minute()) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn projects_into_sao_paulo() {
        // 2024-06-02 is a Sunday. 02:30 UTC is still Saturday 23:30 in Sao Paulo (UTC-3).
        let instant = Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap();
        let now = get_zoned_now(DEFAULT_TIMEZONE, instant);
        assert_eq!(now.day_index, 6);
        assert_eq!(now.minutes_since_midnight, 23 * 60 + 30);
    }

    #[test]
    fn sunday_is_zero() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 2, 15, 0, 0).unwrap();
        let now = get_zoned_now("UTC", instant);
        assert_eq!(now.day_index, 0);
        assert_eq!(now.minutes_since_midnight, 900);
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 5, 10, 15, 0).unwrap();
        assert!(resolve_timezone("Mars/Olympus_Mons").is_none());
        let now = get_zoned_now("Mars/Olympus_Mons", instant);
        assert_eq!(now, get_zoned_now("UTC", instant));
        assert_eq!(now.day_index, 3);
        assert_eq!(now.minutes_since_midnight, 615);
    }
}
