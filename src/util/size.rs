//! Byte-size parsing and formatting.
//!
//! Deliberate deviation from the teacher's `filters::parse_size` (which uses
//! 1000-based multipliers for plain `GB`/`MB`/etc and reserves 1024-based
//! multipliers for the explicit `GiB`/`MiB` suffixes): P5 in the spec pins
//! plain-unit strings to 1024-based values (`"4.5 GB"` -> 4831838208), so this
//! parser uses 1024 uniformly regardless of suffix spelling. See DESIGN.md.

use once_cell::sync::Lazy;
use regex::Regex;

static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*([\d.,]+)\s*(b|kb|kib|mb|mib|gb|gib|tb|tib)?\s*$").unwrap());

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;
const TB: f64 = GB * 1024.0;

/// Parse a human size string (e.g. `"4.5 GB"`, `"1024 KB"`) into bytes,
/// 1024-based regardless of whether the suffix uses the `i` (binary) spelling.
pub fn parse_size(input: &str) -> Option<u64> {
    let caps = SIZE_RE.captures(input.trim())?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let unit = caps.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_else(|| "b".into());

    let bytes = match unit.as_str() {
        "b" => number,
        "kb" | "kib" => number * KB,
        "mb" | "mib" => number * MB,
        "gb" | "gib" => number * GB,
        "tb" | "tib" => number * TB,
        _ => return None,
    };

    Some(bytes as u64)
}

/// Format a byte count into a human-readable 1024-based string.
pub fn format_size(bytes: u64) -> String {
    if bytes as f64 >= TB {
        format!("{:.2} TB", bytes as f64 / TB)
    } else if bytes as f64 >= GB {
        format!("{:.2} GB", bytes as f64 / GB)
    } else if bytes as f64 >= MB {
        format!("{:.1} MB", bytes as f64 / MB)
    } else if bytes as f64 >= KB {
        format!("{:.1} KB", bytes as f64 / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p5_literal_values() {
        assert_eq!(parse_size("4.5 GB"), Some(4_831_838_208));
        assert_eq!(parse_size("500 MB"), Some(524_288_000));
        assert_eq!(parse_size("1.2 TB"), Some(1_319_413_953_331));
        assert_eq!(parse_size("1024 KB"), Some(1_048_576));
    }

    #[test]
    fn handles_ib_suffixes_identically() {
        assert_eq!(parse_size("4.5 GiB"), parse_size("4.5 GB"));
    }

    #[test]
    fn bare_bytes() {
        assert_eq!(parse_size("12345"), Some(12345));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_size("not a size"), None);
    }
}
