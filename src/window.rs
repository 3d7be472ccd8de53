// src/window.rs
//! Same-day extraction: select feed items published inside one calendar day of a
//! fixed UTC offset, as a half-open `[start, start + 24h)` interval.

use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::ingest::feed::{FeedDocument, FeedItem};
use crate::model::RssPostItem;

/// Account name = first path segment after a known social host.
static RE_SCREEN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.|mobile\.)?(?:x|twitter)\.com/([^/?#]+)")
        .expect("screen name regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl DayWindow {
    pub fn new(date: Date, offset: UtcOffset) -> Self {
        let start = PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset);
        Self {
            start,
            end: start + Duration::DAY,
        }
    }

    pub fn contains(&self, ts: OffsetDateTime) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// Counters reported after one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    pub processed: usize,
    pub matched: usize,
    pub skipped: usize,
}

pub fn screen_name(link: &str) -> Option<String> {
    RE_SCREEN_NAME
        .captures(link.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Items inside `window`, in document order, with their publish instant
/// converted to the window's offset.
pub fn select_in_window<'a>(
    doc: &'a FeedDocument,
    window: &DayWindow,
) -> (Vec<(&'a FeedItem, OffsetDateTime)>, WindowStats) {
    let offset = window.start.offset();
    let mut stats = WindowStats::default();
    let mut out = Vec::new();

    for item in &doc.items {
        stats.processed += 1;
        let published = match item.pub_date() {
            Ok(ts) => ts.to_offset(offset),
            Err(e) => {
                tracing::warn!(link = item.link().unwrap_or_default(), error = %e, "skipping post");
                stats.skipped += 1;
                continue;
            }
        };
        if window.contains(published) {
            stats.matched += 1;
            out.push((item, published));
        }
    }

    counter!("posts_window_matched_total").increment(stats.matched as u64);
    (out, stats)
}

pub fn to_post(item: &FeedItem, published: OffsetDateTime) -> RssPostItem {
    let link = item.link().unwrap_or_default().to_string();
    RssPostItem {
        screen_name: screen_name(&link),
        content: item.text("description").unwrap_or_default().to_string(),
        link,
        datetime: published.unix_timestamp(),
    }
}

/// Posts of `date` (midnight to midnight at `offset`), in feed order.
pub fn extract_for_date(doc: &FeedDocument, date: Date, offset: UtcOffset) -> Vec<RssPostItem> {
    let window = DayWindow::new(date, offset);
    let (selected, stats) = select_in_window(doc, &window);
    tracing::info!(
        processed = stats.processed,
        matched = stats.matched,
        skipped = stats.skipped,
        "window extraction done"
    );
    selected
        .into_iter()
        .map(|(item, ts)| to_post(item, ts))
        .collect()
}
