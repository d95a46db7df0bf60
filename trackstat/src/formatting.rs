use time::format_description::well_known;
use time::{Duration, OffsetDateTime};

/// Formats a pace in seconds per unit as "m:ss", e.g. "5:07".
/// Missing paces are shown as "-".
pub fn format_pace(secs_per_unit: Option<f64>) -> String {
    match secs_per_unit {
        Some(secs) if secs.is_finite() && secs >= 0.0 => {
            let total = secs.round() as i64;
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => "-".to_string(),
    }
}

/// Formats a duration as "h:mm:ss".
pub fn format_duration(duration: Duration) -> String {
    let total = duration.whole_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Formats an optional measurement to one decimal place.
pub fn format_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

/// Formats a date as RFC 3339, e.g. "2024-09-01T05:10:44Z", keeping the
/// offset that it was recorded with.
pub fn format_date(date: &OffsetDateTime) -> String {
    date.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| date.to_string())
}
