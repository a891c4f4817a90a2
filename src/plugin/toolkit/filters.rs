//! Small value-filter library for text transforms a plugin commonly needs
//! after pulling raw text out of a page (§4.2). Grounded on the teacher's
//! `indexer::filters` dispatch table, trimmed from a YAML-arg-driven filter
//! chain (`querystring`, `re_replace`, `dateparse`, ...) down to the handful
//! of standalone functions a compiled Rust plugin calls directly instead of
//! naming by string.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove HTML tags, collapsing the remaining whitespace runs into single spaces.
pub fn strip_tags(input: &str) -> String {
    let stripped = TAG_RE.replace_all(input, " ");
    WHITESPACE_RE.replace_all(stripped.trim(), " ").to_string()
}

/// Decode HTML entities (`&amp;`, `&#39;`, ...).
pub fn html_decode(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input).map(|s| s.into_owned()).unwrap_or_else(|_| input.to_string())
}

/// Extract one query-string parameter from a URL-like string, e.g.
/// `querystring("https://x/?id=42", "id") == Some("42")`.
pub fn querystring(input: &str, param: &str) -> Option<String> {
    let query = input.split_once('?').map(|(_, q)| q).unwrap_or(input);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == param).then(|| url_decode(value))
    })
}

/// Parse a relative time string like `"2 days ago"`, `"3 hours ago"`, `"just now"`
/// into a past `DateTime<Utc>`, relative to `now`. Returns `None` on an
/// unrecognized unit; plugins fall back to `published_date = None` in that case
/// per the tolerant-extraction rule in §4.4.
pub fn parse_timeago(input: &str, now: chrono::DateTime<chrono::Utc>) -> Option<chrono::DateTime<chrono::Utc>> {
    let lower = input.trim().to_lowercase();
    if lower.contains("just now") || lower == "now" {
        return Some(now);
    }

    static TIMEAGO_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\d+)\s*(second|minute|hour|day|week|month|year)s?\s*ago").unwrap());
    let caps = TIMEAGO_RE.captures(&lower)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();

    let delta = match unit {
        "second" => chrono::Duration::seconds(amount),
        "minute" => chrono::Duration::minutes(amount),
        "hour" => chrono::Duration::hours(amount),
        "day" => chrono::Duration::days(amount),
        "week" => chrono::Duration::weeks(amount),
        "month" => chrono::Duration::days(amount * 30),
        "year" => chrono::Duration::days(amount * 365),
        _ => return None,
    };

    Some(now - delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        assert_eq!(strip_tags("<b>Ubuntu</b>  <i>22.04</i>"), "Ubuntu 22.04");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(html_decode("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn extracts_query_param() {
        assert_eq!(querystring("https://x.example/dl?id=42&lang=en", "id"), Some("42".to_string()));
        assert_eq!(querystring("https://x.example/dl?id=42", "missing"), None);
    }

    #[test]
    fn parses_relative_time() {
        let now = chrono::Utc::now();
        let parsed = parse_timeago("2 days ago", now).unwrap();
        assert_eq!((now - parsed).num_days(), 2);
        assert!(parse_timeago("gibberish", now).is_none());
    }
}
