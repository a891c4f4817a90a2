//! Release-name parsing (§4.8 step 4, "guessit-style"): pulls quality,
//! codec, language, and season/episode markers out of a scene-style release
//! name so the stream use case can score and present candidates without a
//! full grammar — release names follow a handful of common token patterns,
//! not a formal syntax, so a handful of targeted regexes covers the
//! overwhelming majority in practice.

use once_cell::sync::Lazy;
use regex::Regex;

static QUALITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(2160p|1080p|720p|480p|cam|hdcam|hdts|webrip|web-?dl|bluray|bdrip|dvdrip)\b").unwrap());
static CODEC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(x264|x265|h264|h265|hevc|avc|xvid)\b").unwrap());
static LANGUAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(german|ger|dl|multi|french|fre|italian|ita|spanish|spa|english|eng)\b").unwrap());
static SEASON_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[Ss](\d{1,2})[Ee](\d{1,2})").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRelease {
    pub quality: Option<String>,
    pub codec: Option<String>,
    pub language: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub year: Option<u32>,
}

pub fn parse_release_name(name: &str) -> ParsedRelease {
    let quality = QUALITY_RE.captures(name).map(|c| normalize_quality(&c[1]));
    let codec = CODEC_RE.captures(name).map(|c| c[1].to_lowercase());
    let language = LANGUAGE_RE.captures(name).map(|c| normalize_language(&c[1]));
    let year = YEAR_RE.captures(name).and_then(|c| c[1].parse().ok());

    let (season, episode) = match SEASON_EPISODE_RE.captures(name) {
        Some(c) => (c.get(1).and_then(|m| m.as_str().parse().ok()), c.get(2).and_then(|m| m.as_str().parse().ok())),
        None => (None, None),
    };

    ParsedRelease { quality, codec, language, season, episode, year }
}

fn normalize_quality(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.starts_with("web") {
        "web-dl".to_string()
    } else {
        lower
    }
}

fn normalize_language(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "ger" | "german" | "dl" => "de".to_string(),
        "fre" | "french" => "fr".to_string(),
        "ita" | "italian" => "it".to_string(),
        "spa" | "spanish" => "es".to_string(),
        "eng" | "english" => "en".to_string(),
        "multi" => "multi".to_string(),
        other => other.to_string(),
    }
}

/// Numeric rank used to compare quality tiers for scoring (§4.8 step 5),
/// higher is better.
pub fn quality_rank(quality: Option<&str>) -> u32 {
    match quality {
        Some("2160p") => 6,
        Some("bluray") | Some("bdrip") => 5,
        Some("1080p") => 5,
        Some("web-dl") | Some("webrip") => 4,
        Some("720p") => 3,
        Some("480p") | Some("dvdrip") => 2,
        Some("hdts") | Some("hdcam") => 1,
        Some("cam") => 0,
        _ => 2,
    }
}

/// Best-effort hoster name inferred from a URL's host, stripping a leading
/// `www.` and the TLD so "streamtape.com" and "www.streamtape.com" agree.
pub fn infer_hoster(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");
    host.split('.').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quality_codec_year() {
        let parsed = parse_release_name("Iron Man 2008 1080p BluRay x264");
        assert_eq!(parsed.quality.as_deref(), Some("1080p"));
        assert_eq!(parsed.codec.as_deref(), Some("x264"));
        assert_eq!(parsed.year, Some(2008));
    }

    #[test]
    fn parses_cam_as_lowest_quality() {
        let parsed = parse_release_name("Iron Man 2008 CAM");
        assert_eq!(parsed.quality.as_deref(), Some("cam"));
        assert!(quality_rank(parsed.quality.as_deref()) < quality_rank(Some("1080p")));
    }

    #[test]
    fn parses_season_episode() {
        let parsed = parse_release_name("Show.Name.S02E07.German.720p");
        assert_eq!(parsed.season, Some(2));
        assert_eq!(parsed.episode, Some(7));
        assert_eq!(parsed.language.as_deref(), Some("de"));
    }

    #[test]
    fn infers_hoster_from_host() {
        assert_eq!(infer_hoster("https://www.streamtape.com/e/abc123"), Some("streamtape".to_string()));
        assert_eq!(infer_hoster("https://voe.sx/e/xyz"), Some("voe".to_string()));
    }
}
