use std::sync::OnceLock;

use regex::Regex;

/// `H`, `HH`, `H:MM`, `HhMM`, `17h`, `8:0`
fn separated_time_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(\d{1,2})(?:[:hH](\d{1,2})?)?$").unwrap())
}

/// Normalizes a free-form spreadsheet time into `HH:MM`.
///
/// The parser is tolerant: hours are clamped to 0..=23 and minutes to 0..=59
/// rather than rejected. Anything that cannot be read returns an empty string,
/// which callers treat as "no time".
///
/// `"930"` -> `"09:30"`, `"17h30"` -> `"17:30"`, `"8:0"` -> `"08:00"`.
pub fn normalize_time(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(captures) = separated_time_regex().captures(trimmed) {
        let hours: u32 = captures[1].parse().unwrap_or(0);
        let minutes: u32 = captures
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        return format_hm(hours, minutes);
    }

    // Bare digits, with whatever punctuation the sheet had stripped out
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if (3..=4).contains(&digits.len()) {
        let (hours_part, minutes_part) = digits.split_at(digits.len() - 2);
        let hours: u32 = hours_part.parse().unwrap_or(0);
        let minutes: u32 = minutes_part.parse().unwrap_or(0);
        return format_hm(hours, minutes);
    }

    String::new()
}

fn format_hm(hours: u32, minutes: u32) -> String {
    format!("{:02}:{:02}", hours.min(23), minutes.min(59))
}

/// Converts an `H:MM` string into minutes since midnight.
///
/// Only the first two `:` parts are read, so `09:00:00` is 540. Returns `None` when the hour or
/// minute is missing, not a number, or out of range.
pub fn time_to_minutes(time: &str) -> Option<u16> {
    let mut parts = time.split(':');
    let hours: u16 = parts.next()?.trim().parse().ok()?;
    let minutes: u16 = parts.next()?.trim().parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_messy_inputs() {
        assert_eq!(normalize_time("930"), "09:30");
        assert_eq!(normalize_time("17h30"), "17:30");
        assert_eq!(normalize_time("8:0"), "08:00");
        assert_eq!(normalize_time("1730"), "17:30");
        assert_eq!(normalize_time("9"), "09:00");
        assert_eq!(normalize_time(" 18:45 "), "18:45");
        assert_eq!(normalize_time("17h"), "17:00");
        assert_eq!(normalize_time("9.30"), "09:30");
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(normalize_time("25:70"), "23:59");
        assert_eq!(normalize_time("24:00"), "23:00");
        assert_eq!(normalize_time("2599"), "23:59");
        assert_eq!(normalize_time("80"), "23:00");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalize_time(""), "");
        assert_eq!(normalize_time("   "), "");
        assert_eq!(normalize_time("fechado"), "");
        assert_eq!(normalize_time("12345"), "");
    }

    #[test]
    fn every_valid_time_is_a_fixed_point() {
        for hour in 0..24 {
            for minute in 0..60 {
                let time = format!("{:02}:{:02}", hour, minute);
                assert_eq!(normalize_time(&time), time);
                assert_eq!(time_to_minutes(&time), Some(hour * 60 + minute));
            }
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["930", "17h30", "8:0", "23:59", "00:00", "7", "25:99", "1200", "9.30", "17h", "garbage"] {
            let once = normalize_time(raw);
            assert_eq!(normalize_time(&once), once, "input {raw}");
        }
    }

    #[test]
    fn converts_to_minutes() {
        assert_eq!(time_to_minutes("00:00"), Some(0));
        assert_eq!(time_to_minutes("09:30"), Some(570));
        assert_eq!(time_to_minutes("23:59"), Some(1439));
        assert_eq!(time_to_minutes("9:5"), Some(545));
        assert_eq!(time_to_minutes("09:00:00"), Some(540));
        assert_eq!(time_to_minutes("18:30:59"), Some(1110));
        assert_eq!(time_to_minutes("24:00"), None);
        assert_eq!(time_to_minutes("12:60"), None);
        assert_eq!(time_to_minutes("12"), None);
        assert_eq!(time_to_minutes(""), None);
        assert_eq!(time_to_minutes("ab:cd"), None);
    }
}
