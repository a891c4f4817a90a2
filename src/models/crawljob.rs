//! CrawlJob packaging entity (§3, §4.10) and the bit-exact `.crawljob`
//! key=value/CRLF wire format described in §6.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

pub const MEDIA_TYPE: &str = "application/x-crawljob";
pub const DEFAULT_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Priority {
    Highest,
    Higher,
    High,
    #[default]
    Default,
    Lower,
}

impl Priority {
    fn as_wire(self) -> &'static str {
        match self {
            Priority::Highest => "HIGHEST",
            Priority::Higher => "HIGHER",
            Priority::High => "HIGH",
            Priority::Default => "DEFAULT",
            Priority::Lower => "LOWER",
        }
    }

    fn from_wire(s: &str) -> Result<Self> {
        match s {
            "HIGHEST" => Ok(Priority::Highest),
            "HIGHER" => Ok(Priority::Higher),
            "HIGH" => Ok(Priority::High),
            "DEFAULT" => Ok(Priority::Default),
            "LOWER" => Ok(Priority::Lower),
            other => Err(Error::Parse(format!("invalid priority: {other}"))),
        }
    }
}

/// Tri-state boolean: `UNSET` is distinct from `FALSE` in the wire format.
fn bool_to_wire(b: Option<bool>) -> &'static str {
    match b {
        Some(true) => "TRUE",
        Some(false) => "FALSE",
        None => "UNSET",
    }
}

fn bool_from_wire(s: &str) -> Result<Option<bool>> {
    match s {
        "TRUE" => Ok(Some(true)),
        "FALSE" => Ok(Some(false)),
        "UNSET" => Ok(None),
        other => Err(Error::Parse(format!("invalid tri-state boolean: {other}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlJob {
    pub job_id: Uuid,
    /// URLs joined with CRLF, exactly as `validated_urls` was ordered.
    pub text: String,
    pub package_name: String,
    pub filename: Option<String>,
    pub comment: Option<String>,
    pub source_url: Option<String>,
    pub validated_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,

    pub auto_start: bool,
    pub auto_confirm: Option<bool>,
    pub forced_start: Option<bool>,
    pub enabled: bool,
    pub extract_after_download: Option<bool>,
    pub chunks: Option<i32>,
    pub download_folder: Option<String>,
    pub priority: Priority,
    pub extract_passwords: Vec<String>,
    pub download_password: Option<String>,
    pub deep_analyse_enabled: Option<bool>,
    pub add_offline_link: Option<bool>,
    pub overwrite_packagizer_enabled: Option<bool>,
    pub set_before_packagizer_enabled: Option<bool>,
}

impl CrawlJob {
    /// Construct per the factory rules in §4.10. Rejects empty `validated_urls`
    /// (the CrawlJob invariant in §3).
    pub fn build(
        title: &str,
        validated_urls: Vec<String>,
        release_name: Option<&str>,
        description: Option<&str>,
        size: Option<u64>,
        source_url: Option<&str>,
        ttl: Duration,
    ) -> Result<Self> {
        if validated_urls.is_empty() {
            return Err(Error::Input(
                "CrawlJob cannot be built from a result with no validated links".into(),
            ));
        }

        let package_name = if title.trim().is_empty() {
            "Scavengarr Download".to_string()
        } else {
            title.to_string()
        };

        let mut comment_parts = Vec::new();
        if let Some(d) = description.filter(|d| !d.is_empty()) {
            comment_parts.push(d.to_string());
        }
        if let Some(s) = size {
            comment_parts.push(format!("Size: {}", crate::util::size::format_size(s)));
        }
        if let Some(src) = source_url.filter(|s| !s.is_empty()) {
            comment_parts.push(format!("Source: {src}"));
        }
        let comment = if comment_parts.is_empty() {
            None
        } else {
            Some(comment_parts.join(" | "))
        };

        let now = Utc::now();
        Ok(Self {
            job_id: Uuid::new_v4(),
            text: validated_urls.join("\r\n"),
            package_name,
            filename: release_name.map(str::to_string),
            comment,
            source_url: source_url.map(str::to_string),
            validated_urls,
            created_at: now,
            expires_at: now + ttl,
            auto_start: true,
            auto_confirm: None,
            forced_start: None,
            enabled: true,
            extract_after_download: None,
            chunks: None,
            download_folder: None,
            priority: Priority::Default,
            extract_passwords: Vec::new(),
            download_password: None,
            deep_analyse_enabled: None,
            add_offline_link: None,
            overwrite_packagizer_enabled: None,
            set_before_packagizer_enabled: None,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Suggested filename for `Content-Disposition`, per §6.
    pub fn safe_filename(&self) -> String {
        let safe = crate::util::sanitize_filename(&self.package_name);
        format!("{safe}_{}.crawljob", self.job_id)
    }

    /// Serialize to the bit-exact `.crawljob` wire format (§6, P4).
    pub fn to_wire(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push(format!("text={}", self.text));
        lines.push(format!("packageName={}", self.package_name));
        lines.push(format!("autoStart={}", bool_to_wire(Some(self.auto_start))));
        lines.push(format!("priority={}", self.priority.as_wire()));
        lines.push(format!("enabled={}", bool_to_wire(Some(self.enabled))));

        if let Some(ref f) = self.filename {
            lines.push(format!("filename={f}"));
        }
        if let Some(ref c) = self.comment {
            lines.push(format!("comment={c}"));
        }
        if self.auto_confirm.is_some() {
            lines.push(format!("autoConfirm={}", bool_to_wire(self.auto_confirm)));
        }
        if self.forced_start.is_some() {
            lines.push(format!("forcedStart={}", bool_to_wire(self.forced_start)));
        }
        if self.extract_after_download.is_some() {
            lines.push(format!(
                "extractAfterDownload={}",
                bool_to_wire(self.extract_after_download)
            ));
        }
        if let Some(chunks) = self.chunks {
            lines.push(format!("chunks={chunks}"));
        }
        if let Some(ref folder) = self.download_folder {
            lines.push(format!("downloadFolder={folder}"));
        }
        if !self.extract_passwords.is_empty() {
            let json = serde_json::to_string(&self.extract_passwords).unwrap_or_default();
            lines.push(format!("extractPasswords={json}"));
        }
        if let Some(ref pw) = self.download_password {
            lines.push(format!("downloadPassword={pw}"));
        }
        if self.deep_analyse_enabled.is_some() {
            lines.push(format!(
                "deepAnalyseEnabled={}",
                bool_to_wire(self.deep_analyse_enabled)
            ));
        }
        if self.add_offline_link.is_some() {
            lines.push(format!("addOfflineLink={}", bool_to_wire(self.add_offline_link)));
        }
        if self.overwrite_packagizer_enabled.is_some() {
            lines.push(format!(
                "overwritePackagizerEnabled={}",
                bool_to_wire(self.overwrite_packagizer_enabled)
            ));
        }
        if self.set_before_packagizer_enabled.is_some() {
            lines.push(format!(
                "setBeforePackagizerEnabled={}",
                bool_to_wire(self.set_before_packagizer_enabled)
            ));
        }

        let mut out = lines.join("\r\n");
        out.push_str("\r\n");
        out
    }

    /// Parse a `.crawljob` body back into the fields that round-trip through
    /// the wire format (P4). `job_id`/`created_at`/`expires_at`/`source_url`/
    /// `validated_urls` are not carried on the wire and are supplied by the
    /// caller (the repository already knows them).
    pub fn parse_wire_fields(body: &str) -> Result<ParsedCrawlJob> {
        let mut text = None;
        let mut package_name = None;
        let mut auto_start = None;
        let mut priority = None;
        let mut enabled = None;
        let mut filename = None;
        let mut comment = None;
        let mut auto_confirm = None;
        let mut forced_start = None;
        let mut extract_after_download = None;
        let mut chunks = None;
        let mut download_folder = None;
        let mut extract_passwords = Vec::new();
        let mut download_password = None;
        let mut deep_analyse_enabled = None;
        let mut add_offline_link = None;
        let mut overwrite_packagizer_enabled = None;
        let mut set_before_packagizer_enabled = None;

        for line in body.split("\r\n") {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key {
                "text" => text = Some(value.to_string()),
                "packageName" => package_name = Some(value.to_string()),
                "autoStart" => auto_start = bool_from_wire(value)?,
                "priority" => priority = Some(Priority::from_wire(value)?),
                "enabled" => enabled = bool_from_wire(value)?,
                "filename" => filename = Some(value.to_string()),
                "comment" => comment = Some(value.to_string()),
                "autoConfirm" => auto_confirm = bool_from_wire(value)?,
                "forcedStart" => forced_start = bool_from_wire(value)?,
                "extractAfterDownload" => extract_after_download = bool_from_wire(value)?,
                "chunks" => chunks = value.parse().ok(),
                "downloadFolder" => download_folder = Some(value.to_string()),
                "extractPasswords" => {
                    extract_passwords = serde_json::from_str(value).unwrap_or_default();
                }
                "downloadPassword" => download_password = Some(value.to_string()),
                "deepAnalyseEnabled" => deep_analyse_enabled = bool_from_wire(value)?,
                "addOfflineLink" => add_offline_link = bool_from_wire(value)?,
                "overwritePackagizerEnabled" => {
                    overwrite_packagizer_enabled = bool_from_wire(value)?
                }
                "setBeforePackagizerEnabled" => {
                    set_before_packagizer_enabled = bool_from_wire(value)?
                }
                _ => {}
            }
        }

        Ok(ParsedCrawlJob {
            text: text.ok_or_else(|| Error::Parse("missing required key: text".into()))?,
            package_name: package_name
                .ok_or_else(|| Error::Parse("missing required key: packageName".into()))?,
            auto_start: auto_start
                .ok_or_else(|| Error::Parse("missing required key: autoStart".into()))?,
            priority: priority
                .ok_or_else(|| Error::Parse("missing required key: priority".into()))?,
            enabled: enabled.ok_or_else(|| Error::Parse("missing required key: enabled".into()))?,
            filename,
            comment,
            auto_confirm,
            forced_start,
            extract_after_download,
            chunks,
            download_folder,
            extract_passwords,
            download_password,
            deep_analyse_enabled,
            add_offline_link,
            overwrite_packagizer_enabled,
            set_before_packagizer_enabled,
        })
    }
}

/// Fields recovered from parsing a `.crawljob` body (P4 round-trip check).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCrawlJob {
    pub text: String,
    pub package_name: String,
    pub auto_start: bool,
    pub priority: Priority,
    pub enabled: bool,
    pub filename: Option<String>,
    pub comment: Option<String>,
    pub auto_confirm: Option<bool>,
    pub forced_start: Option<bool>,
    pub extract_after_download: Option<bool>,
    pub chunks: Option<i32>,
    pub download_folder: Option<String>,
    pub extract_passwords: Vec<String>,
    pub download_password: Option<String>,
    pub deep_analyse_enabled: Option<bool>,
    pub add_offline_link: Option<bool>,
    pub overwrite_packagizer_enabled: Option<bool>,
    pub set_before_packagizer_enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_validated_links() {
        let result = CrawlJob::build("X", vec![], None, None, None, None, Duration::hours(1));
        assert!(result.is_err());
    }

    #[test]
    fn text_uses_crlf_and_preserves_order() {
        let job = CrawlJob::build(
            "X",
            vec!["https://a".into(), "https://b".into()],
            None,
            None,
            None,
            None,
            Duration::hours(1),
        )
        .unwrap();
        assert_eq!(job.text, "https://a\r\nhttps://b");
    }

    #[test]
    fn wire_round_trip_is_byte_identical() {
        let job = CrawlJob::build(
            "Ubuntu 22.04",
            vec!["https://hoster.example/file/A".into()],
            Some("ubuntu-22.04.iso"),
            Some("Official release"),
            Some(1_500_000_000),
            Some("https://example.com/details"),
            Duration::hours(1),
        )
        .unwrap();

        let wire1 = job.to_wire();
        let parsed = CrawlJob::parse_wire_fields(&wire1).unwrap();
        assert_eq!(parsed.text, job.text);
        assert_eq!(parsed.package_name, job.package_name);
        assert_eq!(parsed.priority, job.priority);
        assert_eq!(parsed.auto_start, job.auto_start);
        assert_eq!(parsed.enabled, job.enabled);

        // Re-serialize a job built from the parsed fields and compare bytes.
        let mut job2 = job.clone();
        job2.text = parsed.text;
        job2.package_name = parsed.package_name;
        job2.filename = parsed.filename;
        job2.comment = parsed.comment;
        let wire2 = job2.to_wire();
        assert_eq!(wire1, wire2);
    }

    #[test]
    fn package_name_falls_back_when_title_empty() {
        let job = CrawlJob::build(
            "",
            vec!["https://a".into()],
            None,
            None,
            None,
            None,
            Duration::hours(1),
        )
        .unwrap();
        assert_eq!(job.package_name, "Scavengarr Download");
    }
}
