// src/export.rs
//! Daily post export (JSON or CSV) and its object key layout.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use time::macros::format_description;
use time::Date;

use crate::ingest::feed::FeedItem;
use crate::model::RssPostItem;
use crate::quote::rewrite_quote_markup;

/// Feed elements left out of the JSON export.
pub const EXCLUDED_FIELDS: [&str; 3] = ["title", "guid", "category"];

pub const CSV_HEADER: [&str; 4] = ["screen_name", "content", "link", "datetime"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(anyhow!("unsupported export format: {other}")),
        }
    }
}

/// Serialized export ready for the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

/// `<prefix>/<YYYY-MM>/<YYYY-MM-DD>.<ext>`
pub fn object_key(prefix: &str, date: Date, format: ExportFormat) -> Result<String> {
    let month = date
        .format(format_description!("[year]-[month]"))
        .context("formatting export month")?;
    let day = date
        .format(format_description!("[year]-[month]-[day]"))
        .context("formatting export date")?;
    let prefix = prefix.trim_end_matches('/');
    let file = format!("{month}/{day}.{}", format.extension());
    Ok(if prefix.is_empty() {
        file
    } else {
        format!("{prefix}/{file}")
    })
}

/// Generic element mapping of one feed item, with the quote markup of its
/// description rewritten.
pub fn item_record(item: &FeedItem) -> Map<String, Value> {
    let mut record = Map::new();
    for el in &item.elements {
        if EXCLUDED_FIELDS.contains(&el.name.as_str()) {
            continue;
        }
        let text = el.text.trim();
        let value = if text.is_empty() {
            Value::Null
        } else if el.name == "description" {
            Value::String(rewrite_quote_markup(text))
        } else {
            Value::String(text.to_string())
        };
        record.insert(el.name.clone(), value);
    }
    record
}

pub fn to_json<'a>(items: impl IntoIterator<Item = &'a FeedItem>) -> Result<Vec<u8>> {
    let records: Vec<Value> = items
        .into_iter()
        .map(|it| Value::Object(item_record(it)))
        .collect();
    serde_json::to_vec_pretty(&records).context("serializing posts json")
}

pub fn to_csv(posts: &[RssPostItem]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER).context("writing csv header")?;
    for p in posts {
        let datetime = p.datetime.to_string();
        wtr.write_record([
            p.screen_name.as_deref().unwrap_or_default(),
            p.content.as_str(),
            p.link.as_str(),
            datetime.as_str(),
        ])
        .with_context(|| format!("writing csv row for {}", p.link))?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("flushing csv writer: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::feed::FeedDocument;
    use time::macros::date;

    #[test]
    fn key_is_partitioned_by_month() {
        let d = date!(2025 - 04 - 01);
        assert_eq!(
            object_key("ikizu/posts", d, ExportFormat::Json).unwrap(),
            "ikizu/posts/2025-04/2025-04-01.json"
        );
        assert_eq!(
            object_key("", d, ExportFormat::Csv).unwrap(),
            "2025-04/2025-04-01.csv"
        );
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn json_record_drops_fixed_fields_and_keeps_order() {
        let xml = r#"<rss><channel><item>
            <title>t</title>
            <description><![CDATA[hi<div class="rsshub-quote">Al: yo</div>]]></description>
            <link>https://x.com/a/status/1</link>
            <guid>g</guid>
            <pubDate>Tue, 01 Apr 2025 10:00:00 +0900</pubDate>
            <category>c</category>
            <author>a</author>
        </item></channel></rss>"#;
        let doc = FeedDocument::parse(xml.as_bytes()).unwrap();
        let rec = item_record(&doc.items[0]);
        let keys: Vec<_> = rec.keys().map(String::as_str).collect();
        assert_eq!(keys, ["description", "link", "pubDate", "author"]);
        assert_eq!(
            rec["description"],
            "hi<blockquote><cite>Al</cite><br>yo</blockquote>"
        );
    }

    #[test]
    fn csv_quotes_html_content() {
        let posts = vec![RssPostItem {
            screen_name: None,
            content: r#"a, "b""#.into(),
            link: "https://example.test/1".into(),
            datetime: 1_743_469_200,
        }];
        let out = String::from_utf8(to_csv(&posts).unwrap()).unwrap();
        assert_eq!(
            out,
            "screen_name,content,link,datetime\n,\"a, \"\"b\"\"\",https://example.test/1,1743469200\n"
        );
    }
}
