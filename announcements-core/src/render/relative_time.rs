use chrono::{DateTime, Utc};

use crate::models::parse_timestamp;

/// Format a service timestamp relative to `now` (e.g. "5 minutes ago").
///
/// Timestamps that fail to parse are returned unchanged.
pub fn format_relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(posted) = parse_timestamp(timestamp) else {
        tracing::debug!("Failed to parse timestamp {:?}, displaying raw value", timestamp);
        return timestamp.to_string();
    };
    humanize(now.signed_duration_since(posted))
}

fn humanize(delta: chrono::Duration) -> String {
    let future = delta < chrono::Duration::zero();
    let delta = delta.abs();

    let seconds = delta.num_seconds();
    let minutes = delta.num_minutes();
    let hours = delta.num_hours();
    let days = delta.num_days();

    let (amount, unit) = if seconds < 60 {
        return "just now".to_string();
    } else if minutes < 60 {
        (minutes, "minute")
    } else if hours < 24 {
        (hours, "hour")
    } else if days < 7 {
        (days, "day")
    } else if days < 30 {
        (days / 7, "week")
    } else if days < 365 {
        (days / 30, "month")
    } else {
        (days / 365, "year")
    };

    let plural = if amount == 1 { "" } else { "s" };
    if future {
        format!("in {} {}{}", amount, unit, plural)
    } else {
        format!("{} {}{} ago", amount, unit, plural)
    }
}
