use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const NOT_AVAILABLE: &str = "N/A";

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

pub fn format_millis(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{ms:.2} ms"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_mbps(value: Option<f64>) -> String {
    match value {
        Some(mbps) => format!("{mbps:.2} Mbps"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_hours(secs: u64) -> String {
    format!("{:.2} hours", secs as f64 / 3600.0)
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

pub fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}
