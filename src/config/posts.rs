// src/config/posts.rs
use anyhow::{anyhow, Context, Result};
use time::macros::offset;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::export::ExportFormat;

pub const DEFAULT_TZ_OFFSET: &str = "+09:00";
pub const DEFAULT_OUTPUT_PREFIX: &str = "posts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsConfig {
    pub feed_url: String,
    pub offset: UtcOffset,
    pub output_prefix: String,
    pub format: ExportFormat,
}

impl PostsConfig {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            offset: offset!(+9),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            format: ExportFormat::Json,
        }
    }

    /// `RSS_FEED_URL` is required; the rest fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let feed_url = non_empty_var("RSS_FEED_URL")
            .ok_or_else(|| anyhow!("RSS_FEED_URL is not set"))?;
        let offset = parse_offset(
            non_empty_var("POSTS_TZ_OFFSET")
                .as_deref()
                .unwrap_or(DEFAULT_TZ_OFFSET),
        )?;
        let output_prefix =
            non_empty_var("POSTS_OUTPUT_PREFIX").unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.into());
        let format = match non_empty_var("POSTS_FORMAT") {
            Some(f) => f.parse()?,
            None => ExportFormat::Json,
        };
        Ok(Self {
            feed_url,
            offset,
            output_prefix,
            format,
        })
    }

    /// The day before `now`, on the calendar of the configured offset.
    pub fn default_date(&self, now: OffsetDateTime) -> Date {
        (now.to_offset(self.offset) - Duration::DAY).date()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `+09:00`, `-05:30`, `+0900` or `Z`.
pub fn parse_offset(s: &str) -> Result<UtcOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    let (sign, rest) = if let Some(r) = s.strip_prefix('+') {
        (1i8, r)
    } else if let Some(r) = s.strip_prefix('-') {
        (-1i8, r)
    } else {
        return Err(anyhow!("invalid utc offset {s:?}"));
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("invalid utc offset {s:?}"));
    }
    let hours: i8 = digits[..2].parse().context("offset hours")?;
    let minutes: i8 = digits[2..].parse().context("offset minutes")?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0)
        .with_context(|| format!("utc offset out of range: {s}"))
}

/// `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<Date> {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), fmt).with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn offsets_parse() {
        assert_eq!(parse_offset("+09:00").unwrap(), offset!(+9));
        assert_eq!(parse_offset("-0530").unwrap(), offset!(-5:30));
        assert_eq!(parse_offset("Z").unwrap(), UtcOffset::UTC);
        assert!(parse_offset("09:00").is_err());
        assert!(parse_offset("+9").is_err());
    }

    #[test]
    fn default_date_is_yesterday_in_offset() {
        let cfg = PostsConfig::new("https://feed.test/rss");
        // 2025-04-01 16:00 UTC is already 2025-04-02 in +09:00
        assert_eq!(
            cfg.default_date(datetime!(2025-04-01 16:00 UTC)),
            date!(2025 - 04 - 01)
        );
        assert_eq!(
            cfg.default_date(datetime!(2025-04-01 14:00 UTC)),
            date!(2025 - 03 - 31)
        );
    }

    #[test]
    fn dates_parse() {
        assert_eq!(parse_date("2025-04-01").unwrap(), date!(2025 - 04 - 01));
        assert!(parse_date("2025/04/01").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn from_env_requires_feed_url() {
        std::env::remove_var("RSS_FEED_URL");
        assert!(PostsConfig::from_env().is_err());

        std::env::set_var("RSS_FEED_URL", "https://feed.test/rss");
        std::env::set_var("POSTS_FORMAT", "csv");
        std::env::set_var("POSTS_TZ_OFFSET", "+00:00");
        let cfg = PostsConfig::from_env().unwrap();
        assert_eq!(cfg.format, ExportFormat::Csv);
        assert_eq!(cfg.offset, UtcOffset::UTC);
        assert_eq!(cfg.output_prefix, "posts");

        for v in ["RSS_FEED_URL", "POSTS_FORMAT", "POSTS_TZ_OFFSET"] {
            std::env::remove_var(v);
        }
    }
}
