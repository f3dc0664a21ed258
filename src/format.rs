use chrono::{Local, TimeZone};

/// `H:MM:SS` above an hour, `M:SS` below. Used for the countdown and the
/// per-step 완료/소요 columns.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// `N시간 M분` above an hour, `M분` below. Used for goal and elapsed time
/// summaries where second precision would be noise.
pub fn format_time_with_hours(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{hours}시간 {minutes}분")
    } else {
        format!("{minutes}분")
    }
}

/// `YY년 MM월 DD일` from an epoch-ms timestamp, in local time.
pub fn format_date(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format("%y년 %m월 %d일").to_string(),
        None => String::new(),
    }
}

/// Local timestamp for log lines, `YY.MM.DD. HH:MM` like the old Slack
/// message metadata block.
pub fn format_clock(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format("%y.%m.%d. %H:%M").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_under_an_hour() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(10), "0:10");
        assert_eq!(format_time(70), "1:10");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn test_format_time_with_hour_component() {
        assert_eq!(format_time(3600), "1:00:00");
        assert_eq!(format_time(3661), "1:01:01");
        assert_eq!(format_time(7325), "2:02:05");
    }

    #[test]
    fn test_format_time_negative_clamped() {
        // Overtime values are displayed as their magnitude by the caller;
        // a stray negative must not underflow the layout.
        assert_eq!(format_time(-5), "0:00");
    }

    #[test]
    fn test_format_time_with_hours() {
        assert_eq!(format_time_with_hours(0), "0분");
        assert_eq!(format_time_with_hours(1800), "30분");
        assert_eq!(format_time_with_hours(5400), "1시간 30분");
        assert_eq!(format_time_with_hours(3600), "1시간 0분");
    }

    #[test]
    fn test_format_date() {
        // 2024-01-15 00:00:00 UTC; only check the shape since the exact
        // day depends on the local offset.
        let s = format_date(1705276800000);
        assert!(s.ends_with("일"));
        assert!(s.contains("년"));
        assert!(s.contains("월"));
    }

    #[test]
    fn test_format_date_out_of_range() {
        assert_eq!(format_date(i64::MAX), "");
    }
}
