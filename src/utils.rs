use chrono::{DateTime, Local, Timelike};
use std::time::Duration;

/// Wall-clock time as `HH:MM`, the format the users endpoint expects for `created_time`
pub fn created_time() -> String {
    format_clock(&Local::now())
}

pub fn format_clock<Tz: chrono::TimeZone>(dt: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", dt.hour(), dt.minute())
}

/// Render a duration like `1.5s` or `250ms` for the policy printout
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    if d < Duration::from_secs(1) {
        return format!("{}ms", d.as_millis());
    }

    let secs = d.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}s", d.as_secs())
    } else {
        let trimmed = format!("{:.3}", secs);
        format!("{}s", trimmed.trim_end_matches('0').trim_end_matches('.'))
    }
}
