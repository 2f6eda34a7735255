//! Helpers that turn durations and amounts into short human-readable text.

use chrono::TimeDelta;

/// Whole seconds in `delta`, rounded to the nearest second and clamped at zero.
fn rounded_secs(delta: TimeDelta) -> i64 {
    let millis = delta.num_milliseconds().max(0);
    (millis + 500) / 1000
}

/// Formats short waits as "Xm Ys", "Xm" or "Ys".
pub fn minutes_seconds(delta: TimeDelta) -> String {
    let total_secs = rounded_secs(delta).max(1);
    let mins = total_secs / 60;
    let secs = total_secs % 60;

    match (mins, secs) {
        (0, secs) => format!("{secs}s"),
        (mins, 0) => format!("{mins}m"),
        (mins, secs) => format!("{mins}m {secs}s"),
    }
}

/// Formats long waits as "Xh Ym", "Xh" or "Ym".
pub fn hours_minutes(delta: TimeDelta) -> String {
    let total_secs = rounded_secs(delta);
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;

    match (hours, mins) {
        (0, mins) => format!("{mins}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, mins) => format!("{hours}h {mins}m"),
    }
}

/// Formats an uptime as "Xd Xh Xm Xs", dropping leading zero units.
pub fn uptime(dur: std::time::Duration) -> String {
    let total_secs = dur.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if days > 0 {
        format!("{days}d {hours}h {mins}m {secs}s")
    } else if hours > 0 {
        format!("{hours}h {mins}m {secs}s")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Groups digits with commas, e.g. "50,000".
pub fn thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    #[test]
    fn short_waits() {
        assert_eq!(minutes_seconds(TimeDelta::seconds(272)), "4m 32s");
        assert_eq!(minutes_seconds(TimeDelta::seconds(120)), "2m");
        assert_eq!(minutes_seconds(TimeDelta::seconds(45)), "45s");
        assert_eq!(minutes_seconds(TimeDelta::milliseconds(200)), "1s");
    }

    #[test]
    fn long_waits() {
        assert_eq!(hours_minutes(TimeDelta::minutes(23 * 60 + 5)), "23h 5m");
        assert_eq!(hours_minutes(TimeDelta::hours(3)), "3h");
        assert_eq!(hours_minutes(TimeDelta::minutes(42)), "42m");
    }

    #[test]
    fn uptime_drops_leading_zeroes() {
        assert_eq!(uptime(Duration::from_secs(5)), "5s");
        assert_eq!(uptime(Duration::from_secs(65)), "1m 5s");
        assert_eq!(uptime(Duration::from_secs(3600)), "1h 0m 0s");
        assert_eq!(uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(50_000), "50,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }
}
