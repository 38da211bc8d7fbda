use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

pub mod backup;
pub mod health;
pub mod phase;
pub mod player;
pub mod round;
pub mod sse;
pub mod stats;
pub mod validation;

/// RFC 3339 timestamp, as stored and exported.
pub fn format_date(date: OffsetDateTime) -> String {
    date.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// `YYYY-MM-DD`, as used in exported file names.
pub fn format_day(date: OffsetDateTime) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "undated".into())
}

/// Strokes against par as golfers write them: `+3`, `E`, `-1.5`.
pub fn format_diff(value: f64, decimals: usize) -> String {
    let rounded = format!("{:.*}", decimals, value.abs());
    if rounded.trim_start_matches(['0', '.']).is_empty() {
        "E".to_string()
    } else if value > 0.0 {
        format!("+{rounded}")
    } else {
        format!("-{rounded}")
    }
}
