// src/ingest/providers/note_rss.rs
//! Feed-kind normalizer: article feeds (note.com style RSS with `media:thumbnail`).

use chrono::{DateTime, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::feed::FeedDocument;
use crate::model::CanonicalContentItem;

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 200;

static RE_WIDTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"width=\d+").expect("width regex"));

/// Rewrite every `width=<n>` query parameter to the fixed width.
pub fn resize_thumbnail(url: &str, width: u32) -> String {
    RE_WIDTH
        .replace_all(url, format!("width={width}").as_str())
        .into_owned()
}

fn to_utc(ts: time::OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts.unix_timestamp(), ts.nanosecond())
}

pub fn normalize_feed(doc: &FeedDocument, thumbnail_width: u32) -> Vec<CanonicalContentItem> {
    let mut out = Vec::with_capacity(doc.items.len());
    for item in &doc.items {
        let title = item.title().unwrap_or_default();
        let Some(link) = item.link() else {
            tracing::warn!(title, "feed item without link, skipping");
            counter!("ingest_items_skipped_total", "kind" => "feed").increment(1);
            continue;
        };
        let date = match item.pub_date().map(to_utc) {
            Ok(Some(dt)) => dt,
            Ok(None) => {
                tracing::warn!(link, "feed item date out of range, skipping");
                counter!("ingest_items_skipped_total", "kind" => "feed").increment(1);
                continue;
            }
            Err(e) => {
                tracing::warn!(link, error = %e, "skipping feed item");
                counter!("ingest_items_skipped_total", "kind" => "feed").increment(1);
                continue;
            }
        };

        let thumbnail = item
            .text("media:thumbnail")
            .or_else(|| item.attr("media:thumbnail", "url"))
            .map(|u| resize_thumbnail(u, thumbnail_width))
            .unwrap_or_default();

        out.push(CanonicalContentItem {
            title: html_escape::decode_html_entities(title).into_owned(),
            link: link.to_string(),
            date: Some(date),
            thumbnail,
            upcoming: false,
        });
    }
    out
}
