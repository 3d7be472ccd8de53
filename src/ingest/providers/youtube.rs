// src/ingest/providers/youtube.rs
//! Video platform payloads (Data API v3) and their normalizers.
//!
//! Responses are decoded item by item: a malformed item is skipped with a
//! warning instead of failing the whole list.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::model::CanonicalContentItem;
use crate::rank::TitleFilter;

/// Placeholder titles the platform uses for entries without visible content.
const UNAVAILABLE_TITLES: [&str; 2] = ["Private video", "Deleted video"];

const UPCOMING: &str = "upcoming";

#[derive(Debug, Deserialize)]
struct ItemList {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
}

impl Thumbnails {
    fn default_url(&self) -> String {
        self.default
            .as_ref()
            .and_then(|t| t.url.clone())
            .unwrap_or_default()
    }
}

/// `videos` resource (part=snippet,liveStreamingDetails).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub snippet: VideoSnippet,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub published_at: Option<String>,
    pub live_broadcast_content: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    pub scheduled_start_time: Option<String>,
}

/// `search` resource (part=id); only the video id is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

/// `playlistItems` resource (part=snippet,contentDetails).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub snippet: PlaylistSnippet,
    pub content_details: Option<PlaylistContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    pub title: String,
    pub published_at: Option<String>,
    pub resource_id: Option<ResourceId>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistContentDetails {
    pub video_id: Option<String>,
    pub video_published_at: Option<String>,
}

impl PlaylistEntry {
    pub fn video_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|c| c.video_id.as_deref())
            .or_else(|| {
                self.snippet
                    .resource_id
                    .as_ref()
                    .and_then(|r| r.video_id.as_deref())
            })
            .filter(|id| !id.is_empty())
    }

    fn published_at(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|c| c.video_published_at.as_deref())
            .or(self.snippet.published_at.as_deref())
    }
}

fn decode_items<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<Vec<T>> {
    let list: ItemList =
        serde_json::from_slice(body).with_context(|| format!("decoding {what} response"))?;
    let mut out = Vec::with_capacity(list.items.len());
    for (idx, raw) in list.items.into_iter().enumerate() {
        match serde_json::from_value::<T>(raw) {
            Ok(v) => out.push(v),
            Err(e) => {
                tracing::warn!(error = %e, idx, what, "skipping malformed item");
                counter!("ingest_items_skipped_total", "kind" => "decode").increment(1);
            }
        }
    }
    Ok(out)
}

pub fn decode_videos(body: &[u8]) -> Result<Vec<Video>> {
    decode_items(body, "videos")
}

pub fn decode_search_ids(body: &[u8]) -> Result<Vec<String>> {
    let results: Vec<SearchResult> = decode_items(body, "search")?;
    Ok(results
        .into_iter()
        .filter_map(|r| r.id.video_id)
        .filter(|id| !id.is_empty())
        .collect())
}

pub fn decode_playlist(body: &[u8]) -> Result<Vec<PlaylistEntry>> {
    decode_items(body, "playlistItems")
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn skip(kind: &'static str, reason: &str, title: &str) {
    tracing::warn!(kind, reason, title, "skipping item");
    counter!("ingest_items_skipped_total", "kind" => kind).increment(1);
}

/// Search-kind normalizer: exclusion rules, then date resolution by broadcast state.
pub fn normalize_search(videos: Vec<Video>, filter: &TitleFilter) -> Vec<CanonicalContentItem> {
    let mut out = Vec::with_capacity(videos.len());
    for v in videos {
        let title = v.snippet.title.as_str();
        if !filter.allows(title) {
            tracing::debug!(title, "excluded by title filter");
            continue;
        }
        if v.id.is_empty() {
            skip("search", "missing video id", title);
            continue;
        }

        let upcoming = v.snippet.live_broadcast_content.as_deref() == Some(UPCOMING);
        let date = if upcoming {
            v.live_streaming_details
                .as_ref()
                .and_then(|d| d.scheduled_start_time.as_deref())
                .and_then(parse_instant)
        } else {
            match v.snippet.published_at.as_deref().map(parse_instant) {
                Some(Some(dt)) => Some(dt),
                _ => {
                    skip("search", "missing or invalid publishedAt", title);
                    continue;
                }
            }
        };

        out.push(CanonicalContentItem::video(
            title,
            &v.id,
            date,
            v.snippet.thumbnails.default_url(),
            upcoming,
        ));
    }
    out
}

/// Playlist-kind normalizer: one record per entry, never upcoming.
pub fn normalize_playlist(entries: Vec<PlaylistEntry>) -> Vec<CanonicalContentItem> {
    let mut out = Vec::with_capacity(entries.len());
    for e in entries {
        let title = e.snippet.title.as_str();
        if UNAVAILABLE_TITLES.contains(&title) {
            skip("playlist", "unavailable entry", title);
            continue;
        }
        let Some(video_id) = e.video_id() else {
            skip("playlist", "missing video id", title);
            continue;
        };
        let Some(date) = e.published_at().and_then(parse_instant) else {
            skip("playlist", "missing or invalid publish date", title);
            continue;
        };

        out.push(CanonicalContentItem::video(
            title,
            video_id,
            Some(date),
            e.snippet.thumbnails.default_url(),
            false,
        ));
    }
    out
}
