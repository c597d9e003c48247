use chrono::{DateTime, NaiveDateTime};

/// Parse a timestamp as the server sends it.
///
/// Flask renders datetimes as RFC 2822 (`Sat, 17 Oct 2026 08:15:00 GMT`);
/// RFC 3339 and bare ISO timestamps are accepted too. The wall-clock time is
/// kept as sent, without converting between zones.
pub fn parse_server_date(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(date) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Format a server date string to a more readable format
pub fn format_date(date: &str) -> String {
    match parse_server_date(date) {
        Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        None => date.to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// First line of a multi-line text, truncated for list views
pub fn preview(text: &str, max_len: usize) -> String {
    truncate_string(text.lines().next().unwrap_or("").trim(), max_len)
}
