//! Date helpers

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Convert a statement date (`DD.MM.YYYY`) to the ledger's ISO form.
///
/// Anything that does not parse as a dotted date is returned unchanged.
pub fn normalize_date(date: &str) -> String {
    if !date.contains('.') {
        return date.to_string();
    }

    match NaiveDate::parse_from_str(date.trim(), "%d.%m.%Y") {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(_) => {
            tracing::debug!(date, "Unrecognised statement date, keeping as is");
            date.to_string()
        }
    }
}

/// Unix timestamp of UTC midnight `days` before `now`
pub fn window_start(now: DateTime<Utc>, days: u32) -> i64 {
    let day = now.date_naive() - Duration::days(i64::from(days));
    day.and_hms_opt(0, 0, 0)
        .expect("midnight exists on every date")
        .and_utc()
        .timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dotted_date_converted() {
        assert_eq!(normalize_date("05.01.2024"), "2024-01-05");
        assert_eq!(normalize_date("31.12.2023"), "2023-12-31");
    }

    #[test]
    fn test_other_formats_pass_through() {
        assert_eq!(normalize_date("2024-01-05"), "2024-01-05");
        assert_eq!(normalize_date("32.01.2024"), "32.01.2024");
        assert_eq!(normalize_date("5.1"), "5.1");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_window_start_is_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 15, 30, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();

        assert_eq!(window_start(now, 7), expected.timestamp());
    }

    #[test]
    fn test_window_start_at_midnight_and_zero_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let leap_day = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();

        assert_eq!(window_start(now, 0), now.timestamp());
        assert_eq!(window_start(now, 1), leap_day.timestamp());
    }
}
