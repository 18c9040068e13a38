//! Two-column grid table for a [`Snapshot`].

use crossterm::style::{Stylize, style};
use unicode_width::UnicodeWidthStr;

use crate::format::{
    format_hours, format_kilobytes, format_mbps, format_millis, format_percent, or_unknown,
    truncate_unicode, yes_no,
};
use crate::system::snapshot::{ResourceUsage, Snapshot};

pub const HEADERS: (&str, &str) = ("Metric", "Value");
const MAX_CELL_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            cpu: 75.0,
            memory: 75.0,
            disk: 75.0,
        }
    }
}

impl Thresholds {
    /// Names of the resources above their threshold, in cpu/memory/disk order.
    pub fn exceeded(&self, usage: &ResourceUsage) -> Vec<&'static str> {
        [
            ("CPU", usage.cpu_percent, self.cpu),
            ("Memory", usage.memory_percent, self.memory),
            ("Disk", usage.disk_percent, self.disk),
        ]
        .into_iter()
        .filter(|(_, value, limit)| value > limit)
        .map(|(name, _, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Good,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub value: String,
    pub tone: Tone,
}

impl Row {
    fn plain(label: &str, value: impl Into<String>) -> Self {
        Row {
            label: label.to_string(),
            value: value.into(),
            tone: Tone::Plain,
        }
    }

    fn usage(label: &str, value: f64, threshold: f64) -> Self {
        Row {
            label: label.to_string(),
            value: format_percent(value),
            tone: if value > threshold {
                Tone::Alert
            } else {
                Tone::Good
            },
        }
    }
}

pub fn snapshot_rows(snapshot: &Snapshot, thresholds: &Thresholds) -> Vec<Row> {
    let system = &snapshot.system;
    vec![
        Row::usage("CPU Usage", snapshot.cpu_percent, thresholds.cpu),
        Row::usage("Memory Usage", snapshot.memory_percent, thresholds.memory),
        Row::plain("Updates Available", yes_no(snapshot.updates_available)),
        Row::plain("Response Time", format_millis(snapshot.response_time_ms)),
        Row::usage("Disk Usage", snapshot.disk_percent, thresholds.disk),
        Row::plain("KB Sent", format_kilobytes(snapshot.bytes_sent)),
        Row::plain("KB Received", format_kilobytes(snapshot.bytes_received)),
        Row::plain("Download Speed", format_mbps(snapshot.download_mbps)),
        Row::plain("Upload Speed", format_mbps(snapshot.upload_mbps)),
        Row::plain("OS", or_unknown(&system.os)),
        Row::plain("OS Version", or_unknown(&system.os_version)),
        Row::plain("Kernel", or_unknown(&system.kernel_version)),
        Row::plain("Processor", or_unknown(&system.processor)),
        Row::plain("Machine", or_unknown(&system.machine)),
        Row::plain("Hostname", or_unknown(&system.hostname)),
        Row::plain("Raspberry Pi", yes_no(system.is_raspberry_pi)),
        Row::plain("Uptime", format_hours(system.uptime_secs)),
    ]
}

pub fn render_snapshot(snapshot: &Snapshot, thresholds: &Thresholds, color: bool) -> String {
    render_grid(HEADERS, &snapshot_rows(snapshot, thresholds), color)
}

/// Renders `rows` as a `+---+` grid. Widths are measured on the plain text, so
/// colour codes never shift the borders.
pub fn render_grid(headers: (&str, &str), rows: &[Row], color: bool) -> String {
    let cells: Vec<(String, String, Tone)> = rows
        .iter()
        .map(|r| {
            (
                truncate_unicode(&r.label, MAX_CELL_WIDTH),
                truncate_unicode(&r.value, MAX_CELL_WIDTH),
                r.tone,
            )
        })
        .collect();

    let left = cells
        .iter()
        .map(|(l, _, _)| l.width())
        .chain(std::iter::once(headers.0.width()))
        .max()
        .unwrap_or(0);
    let right = cells
        .iter()
        .map(|(_, v, _)| v.width())
        .chain(std::iter::once(headers.1.width()))
        .max()
        .unwrap_or(0);

    let rule = |fill: char| {
        format!(
            "+{}+{}+",
            fill.to_string().repeat(left + 2),
            fill.to_string().repeat(right + 2)
        )
    };

    let mut lines = Vec::with_capacity(cells.len() * 2 + 3);
    lines.push(rule('-'));
    lines.push(format_line(headers.0, headers.1, Tone::Plain, left, right, false));
    lines.push(rule('='));
    for (label, value, tone) in &cells {
        lines.push(format_line(label, value, *tone, left, right, color));
        lines.push(rule('-'));
    }
    if cells.is_empty() {
        lines[2] = rule('-');
    }
    lines.join("\n")
}

fn format_line(
    label: &str,
    value: &str,
    tone: Tone,
    left: usize,
    right: usize,
    color: bool,
) -> String {
    let label_pad = " ".repeat(left - label.width());
    let value_pad = " ".repeat(right - value.width());
    let value = match (color, tone) {
        (true, Tone::Good) => style(value).green().to_string(),
        (true, Tone::Alert) => style(value).red().to_string(),
        _ => value.to_string(),
    };
    format!("| {label}{label_pad} | {value}{value_pad} |")
}
