//! Human-readable sizes and ages for track cards.

use chrono::{DateTime, Local, TimeZone, Utc};

const SIZE_UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];

pub fn format_filesize(bytes: u64) -> String {
    if bytes == 0 {
        return "0 bytes".to_string();
    }

    let mut exponent = 0;
    while exponent < SIZE_UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }

    if exponent == 0 {
        return format!("{} {}", bytes, SIZE_UNITS[0]);
    }
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{:.1} {}", value, SIZE_UNITS[exponent])
}

/// Age of an upload relative to `now`, with calendar dates in the local zone.
pub fn format_relative_time(uploaded_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    format_relative_time_in(uploaded_at, now, &Local)
}

pub fn format_relative_time_in<Tz>(
    uploaded_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(uploaded_at) = uploaded_at else {
        return "Unknown age".to_string();
    };

    // Future timestamps (clock skew) land in "Just now".
    let diff = (now - uploaded_at).num_seconds();
    match diff {
        d if d < 60 => "Just now".to_string(),
        d if d < 3_600 => format!("{} minutes ago", d / 60),
        d if d < 86_400 => format!("{} hours ago", d / 3_600),
        d if d < 172_800 => "Yesterday".to_string(),
        _ => uploaded_at.with_timezone(tz).format("%b %-d, %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn unit_rank(formatted: &str) -> usize {
        let unit = formatted.rsplit(' ').next().unwrap();
        SIZE_UNITS.iter().position(|u| *u == unit).unwrap()
    }

    #[test]
    fn test_filesize_units() {
        assert_eq!(format_filesize(0), "0 bytes");
        assert_eq!(format_filesize(1), "1 bytes");
        assert_eq!(format_filesize(1023), "1023 bytes");
        assert_eq!(format_filesize(1024), "1.0 KB");
        assert_eq!(format_filesize(1536), "1.5 KB");
        assert_eq!(format_filesize(500_000), "488.3 KB");
        assert_eq!(format_filesize(15_000_000), "14.3 MB");
        assert_eq!(format_filesize(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_filesize_clamps_to_gb() {
        assert_eq!(format_filesize(5 * 1024u64.pow(4)), "5120.0 GB");
    }

    #[test]
    fn test_filesize_unit_is_monotonic() {
        let mut last = 0;
        let mut b = 0u64;
        while b < 1024u64.pow(4) * 4 {
            let rank = unit_rank(&format_filesize(b));
            assert!(rank >= last, "unit went backwards at {}", b);
            last = rank;
            b = b * 3 + 1;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let ago = |secs: i64| Some(now - Duration::seconds(secs));

        assert_eq!(format_relative_time_in(ago(0), now, &Utc), "Just now");
        assert_eq!(format_relative_time_in(ago(59), now, &Utc), "Just now");
        assert_eq!(format_relative_time_in(ago(60), now, &Utc), "1 minutes ago");
        assert_eq!(format_relative_time_in(ago(3_599), now, &Utc), "59 minutes ago");
        assert_eq!(format_relative_time_in(ago(3_600), now, &Utc), "1 hours ago");
        assert_eq!(format_relative_time_in(ago(86_399), now, &Utc), "23 hours ago");
        assert_eq!(format_relative_time_in(ago(86_400), now, &Utc), "Yesterday");
        assert_eq!(format_relative_time_in(ago(172_799), now, &Utc), "Yesterday");
        assert_eq!(format_relative_time_in(ago(172_800), now, &Utc), "May 8, 2024");
        assert_eq!(format_relative_time_in(ago(86_400 * 40), now, &Utc), "Mar 31, 2024");
    }

    #[test]
    fn test_relative_time_edge_inputs() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let future = Some(now + Duration::seconds(600));
        assert_eq!(format_relative_time_in(future, now, &Utc), "Just now");
        assert_eq!(format_relative_time_in(None, now, &Utc), "Unknown age");
    }

    #[test]
    fn test_relative_time_is_exhaustive() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut age = 0i64;
        while age < 86_400 * 400 {
            let out = format_relative_time_in(Some(now - Duration::seconds(age)), now, &Utc);
            let bucketed = out == "Just now"
                || out.ends_with(" minutes ago")
                || out.ends_with(" hours ago")
                || out == "Yesterday"
                || out.contains(", 20");
            assert!(bucketed, "age {} produced {:?}", age, out);
            age = age * 2 + 7;
        }
    }
}
