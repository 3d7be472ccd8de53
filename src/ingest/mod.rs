// src/ingest/mod.rs
pub mod feed;
pub mod providers;
pub mod types;

use crate::ingest::providers::{note_rss, youtube};
use crate::ingest::types::SourcePayload;
use crate::model::CanonicalContentItem;
use crate::rank::TitleFilter;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

/// One-time metrics registration.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Records produced by the normalizers.");
        describe_counter!(
            "ingest_items_skipped_total",
            "Source items skipped because of missing or malformed fields."
        );
        describe_counter!(
            "posts_window_matched_total",
            "Feed posts that fell inside the target day window."
        );
    });
}

/// Maps every source kind onto [`CanonicalContentItem`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    pub excluded_markers: Vec<String>,
    pub thumbnail_width: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            excluded_markers: Vec::new(),
            thumbnail_width: note_rss::DEFAULT_THUMBNAIL_WIDTH,
        }
    }
}

impl Normalizer {
    pub fn new(excluded_markers: Vec<String>, thumbnail_width: u32) -> Self {
        Self {
            excluded_markers,
            thumbnail_width,
        }
    }

    /// Title filter for one source entry, with the configured markers.
    pub fn filter(&self, query: Option<&str>) -> TitleFilter {
        TitleFilter::new(query.map(str::to_string), self.excluded_markers.clone())
    }

    /// The filter only applies to search payloads.
    pub fn normalize(
        &self,
        payload: SourcePayload,
        filter: &TitleFilter,
    ) -> Vec<CanonicalContentItem> {
        ensure_metrics_described();
        let kind = payload.kind();

        let out = match payload {
            SourcePayload::Search(videos) => youtube::normalize_search(videos, filter),
            SourcePayload::Playlist(entries) => youtube::normalize_playlist(entries),
            SourcePayload::Feed(doc) => note_rss::normalize_feed(&doc, self.thumbnail_width),
        };

        counter!("ingest_items_total", "kind" => kind.as_str()).increment(out.len() as u64);
        tracing::debug!(kind = kind.as_str(), count = out.len(), "normalized source");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::feed::FeedDocument;

    #[test]
    fn empty_payloads_yield_no_records() {
        let n = Normalizer::default();
        let f = n.filter(None);
        assert!(n.normalize(SourcePayload::Search(vec![]), &f).is_empty());
        assert!(n.normalize(SourcePayload::Playlist(vec![]), &f).is_empty());
        assert!(n
            .normalize(SourcePayload::Feed(FeedDocument::default()), &f)
            .is_empty());
    }

    #[test]
    fn search_payload_uses_configured_markers() {
        let body = r#"{"items":[
          {"id":"a","snippet":{"title":"Story 1 (English Subtitles)","publishedAt":"2025-01-01T00:00:00Z"}},
          {"id":"b","snippet":{"title":"Story 1","publishedAt":"2025-01-01T00:00:00Z"}}
        ]}"#;
        let videos = youtube::decode_videos(body.as_bytes()).unwrap();
        let n = Normalizer::new(vec!["English Subtitles".into()], 200);
        let out = n.normalize(SourcePayload::Search(videos), &n.filter(Some("story")));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Story 1");
    }
}
