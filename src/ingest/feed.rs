// src/ingest/feed.rs
//! Minimal RSS 2.0 document model: every `<item>` keeps its direct child elements
//! in document order, so normalizers and the post export can pick what they need.

use anyhow::{anyhow, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedDocument {
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedItem {
    pub elements: Vec<FeedElement>,
}

/// A direct child of `<item>`; nested markup contributes its text only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedElement {
    pub name: String,
    pub text: String,
    pub attrs: Vec<(String, String)>,
}

impl FeedItem {
    fn element(&self, name: &str) -> Option<&FeedElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Trimmed text of the first `name` child, `None` when missing or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.element(name)
            .map(|e| e.text.trim())
            .filter(|t| !t.is_empty())
    }

    pub fn attr(&self, name: &str, key: &str) -> Option<&str> {
        self.element(name)?
            .attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn link(&self) -> Option<&str> {
        self.text("link")
    }

    /// `pubDate` parsed as RFC 2822. `Err` carries a message suitable for a warning.
    pub fn pub_date(&self) -> Result<OffsetDateTime> {
        let raw = self.text("pubDate").ok_or_else(|| anyhow!("missing pubDate"))?;
        parse_rfc2822(raw).ok_or_else(|| anyhow!("unparsable pubDate {raw:?}"))
    }
}

/// RFC 2822 timestamp, keeping its offset. Falls back to chrono's more lenient
/// parser for feeds emitting obsolete zone names.
pub fn parse_rfc2822(ts: &str) -> Option<OffsetDateTime> {
    let ts = ts.trim();
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc2822) {
        return Some(dt);
    }
    let dt = chrono::DateTime::parse_from_rfc2822(ts).ok()?;
    let offset = time::UtcOffset::from_whole_seconds(dt.offset().local_minus_utc()).ok()?;
    OffsetDateTime::from_unix_timestamp(dt.timestamp())
        .ok()
        .map(|t| t.to_offset(offset))
}

impl FeedDocument {
    /// Parse `rss/channel/item` elements from raw XML bytes.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut items = Vec::new();
        let mut buf = Vec::new();

        let mut current: Option<FeedItem> = None;
        // Depth below the open <item>: 1 = direct child.
        let mut depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = qname(&e);
                    if let Some(item) = current.as_mut() {
                        depth += 1;
                        if depth == 1 {
                            item.elements.push(element_from(&e, name));
                        }
                    } else if name == "item" {
                        current = Some(FeedItem::default());
                        depth = 0;
                    }
                }
                Ok(Event::Empty(e)) => {
                    if let Some(item) = current.as_mut() {
                        if depth == 0 {
                            let name = qname(&e);
                            item.elements.push(element_from(&e, name));
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    if current.is_some() {
                        if depth == 0 {
                            items.extend(current.take());
                        } else {
                            depth -= 1;
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(el) = open_child(&mut current, depth) {
                        let text = e
                            .unescape()
                            .map(|c| c.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                        el.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(el) = open_child(&mut current, depth) {
                        el.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(anyhow!(
                        "feed xml error at byte {}: {e}",
                        reader.buffer_position()
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { items })
    }
}

fn qname(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn element_from(e: &BytesStart<'_>, name: String) -> FeedElement {
    let attrs = e
        .attributes()
        .flatten()
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            let value = a
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned());
            (key, value)
        })
        .collect();
    FeedElement {
        name,
        text: String::new(),
        attrs,
    }
}

fn open_child(current: &mut Option<FeedItem>, depth: usize) -> Option<&mut FeedElement> {
    if depth == 0 {
        return None;
    }
    current.as_mut()?.elements.last_mut()
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Channel</title>
    <item>
      <title>First &amp; foremost</title>
      <link>https://example.test/n/1</link>
      <pubDate>Tue, 01 Apr 2025 10:00:00 +0900</pubDate>
      <description><![CDATA[<p>Hello <b>there</b></p>]]></description>
      <media:thumbnail>https://img.example/1.png?width=800</media:thumbnail>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.test/n/2</link>
      <media:thumbnail url="https://img.example/2.png?width=640"/>
      <category>news</category>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_in_order_with_children() {
        let doc = FeedDocument::parse(XML.as_bytes()).unwrap();
        assert_eq!(doc.items.len(), 2);

        let first = &doc.items[0];
        assert_eq!(first.title(), Some("First & foremost"));
        assert_eq!(first.link(), Some("https://example.test/n/1"));
        assert_eq!(first.text("description"), Some("<p>Hello <b>there</b></p>"));
        assert_eq!(
            first.text("media:thumbnail"),
            Some("https://img.example/1.png?width=800")
        );
        let names: Vec<_> = first.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["title", "link", "pubDate", "description", "media:thumbnail"]
        );

        let second = &doc.items[1];
        assert_eq!(
            second.attr("media:thumbnail", "url"),
            Some("https://img.example/2.png?width=640")
        );
        assert!(second.pub_date().is_err());
    }

    #[test]
    fn pub_date_parses_rfc2822_with_offset() {
        let doc = FeedDocument::parse(XML.as_bytes()).unwrap();
        let ts = doc.items[0].pub_date().unwrap();
        // 10:00 +09:00 == 01:00 UTC
        assert_eq!(ts.unix_timestamp(), 1_743_469_200);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(FeedDocument::parse(b"<rss><channel><item></channel>").is_err());
    }
}
