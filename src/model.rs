// src/model.rs
//! Canonical record model shared by every source kind, plus the snapshot and
//! post shapes that get serialized.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Link prefix for video platform items.
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// One normalized video or article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalContentItem {
    pub title: String,
    pub link: String,
    #[serde(serialize_with = "iso_seconds::serialize")]
    pub date: Option<DateTime<Utc>>,
    pub thumbnail: String,
    pub upcoming: bool,
}

impl CanonicalContentItem {
    /// Build a platform item; the link is derived from the video id.
    pub fn video(
        title: impl Into<String>,
        video_id: &str,
        date: Option<DateTime<Utc>>,
        thumbnail: impl Into<String>,
        upcoming: bool,
    ) -> Self {
        Self {
            title: title.into(),
            link: watch_url(video_id),
            date,
            thumbnail: thumbnail.into(),
            upcoming,
        }
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}

/// Named, ranked and capped list of records for one configured source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentBucket {
    pub name: String,
    pub items: Vec<CanonicalContentItem>,
}

impl ContentBucket {
    pub fn new(name: impl Into<String>, items: Vec<CanonicalContentItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Buckets of one category, serialized as `{ name: [item, ...] }` in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BucketGroup(pub Vec<ContentBucket>);

impl BucketGroup {
    pub fn get(&self, name: &str) -> Option<&ContentBucket> {
        self.0.iter().find(|b| b.name == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentBucket> {
        self.0.iter()
    }
}

impl FromIterator<ContentBucket> for BucketGroup {
    fn from_iter<I: IntoIterator<Item = ContentBucket>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for BucketGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bucket in &self.0 {
            map.serialize_entry(&bucket.name, &bucket.items)?;
        }
        map.end()
    }
}

/// The document written to object storage by the aggregation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub videos: BucketGroup,
    pub notes: BucketGroup,
    #[serde(serialize_with = "iso_seconds::serialize_instant")]
    pub last_update: DateTime<Utc>,
}

/// A same-day post pulled from the social-feed mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RssPostItem {
    pub screen_name: Option<String>,
    pub content: String,
    pub link: String,
    pub datetime: i64,
}

/// ISO-8601, second precision, `Z` suffix. `None` is written as `null`.
pub mod iso_seconds {
    use super::*;

    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn serialize_instant<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }
}
