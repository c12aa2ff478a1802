//! Formatting helpers for log lines.

use std::time::Duration;

/// Controls compact vs verbose output.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("1.5G", "3m5s")
    Compact,
    /// Detail: spaces, full suffixes ("1.5 GiB", "3m 5s")
    Detail,
}

/// Format byte count as human-readable size.
///
/// Compact: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`
/// Detail:  `"1.5 GiB"`, `"100.3 MiB"`, `"50.0 KiB"`, `"512 B"`
pub fn format_bytes(bytes: u64, style: FmtStyle) -> String {
    let (g, m, k, b) = match style {
        FmtStyle::Compact => ("G", "M", "K", "B"),
        FmtStyle::Detail => (" GiB", " MiB", " KiB", " B"),
    };
    let f = bytes as f64;
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0 * 1024.0), g)
    } else if bytes >= 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0), m)
    } else if bytes >= 1024 {
        format!("{:.1}{}", f / 1024.0, k)
    } else {
        format!("{}{}", bytes, b)
    }
}

/// Format a duration with second resolution.
///
/// Compact: `"3m5s"`
/// Detail:  `"3m 5s"`
pub fn format_duration(duration: Duration, style: FmtStyle) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    let sep = match style {
        FmtStyle::Compact => "",
        FmtStyle::Detail => " ",
    };
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}{}s", secs / 60, sep, secs % 60)
    } else {
        format!("{}h{}{}m", secs / 3600, sep, (secs % 3600) / 60)
    }
}
