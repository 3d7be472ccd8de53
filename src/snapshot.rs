// src/snapshot.rs
//! Snapshot assembly. Buckets arrive already filtered, ranked and capped.

use chrono::{DateTime, Utc};

use crate::model::{BucketGroup, ContentBucket, Snapshot};

pub fn assemble(
    videos: Vec<ContentBucket>,
    notes: Vec<ContentBucket>,
    now: DateTime<Utc>,
) -> Snapshot {
    Snapshot {
        videos: BucketGroup(videos),
        notes: BucketGroup(notes),
        last_update: now,
    }
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// `(bucket name, item count)` for every bucket, videos first.
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.videos
            .iter()
            .chain(self.notes.iter())
            .map(|b| (b.name.clone(), b.items.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalContentItem;
    use chrono::TimeZone;

    #[test]
    fn assembles_document_shape() {
        let now = Utc.with_ymd_and_hms(2025, 4, 2, 3, 4, 5).unwrap();
        let item = CanonicalContentItem::video("t", "id1", Some(now), "th", false);
        let snap = assemble(
            vec![
                ContentBucket::new("all", vec![item]),
                ContentBucket::empty("story"),
            ],
            vec![ContentBucket::empty("all")],
            now,
        );

        let v: serde_json::Value = serde_json::from_slice(&snap.to_json().unwrap()).unwrap();
        assert_eq!(v["lastUpdate"], "2025-04-02T03:04:05Z");
        assert_eq!(v["videos"]["all"][0]["link"], "https://www.youtube.com/watch?v=id1");
        assert_eq!(v["videos"]["story"], serde_json::json!([]));
        assert_eq!(v["notes"]["all"], serde_json::json!([]));

        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["videos", "notes", "lastUpdate"]);
        assert_eq!(
            snap.counts(),
            vec![("all".into(), 1), ("story".into(), 0), ("all".into(), 0)]
        );
    }
}
