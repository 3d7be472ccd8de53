// src/rank.rs
//! Filter & rank engine.
//!
//! Ordering policy (ascending key):
//! 1. upcoming items before published ones,
//! 2. upcoming: soonest scheduled first; published: newest first,
//! 3. items without a date last inside their group.
//!
//! The sort is stable, so equal keys keep their input order.

use std::cmp::Ordering;

use crate::model::CanonicalContentItem;

/// Reference cap per bucket.
pub const DEFAULT_CAP: usize = 5;

/// Title that the platform substitutes for videos the caller cannot see.
pub const PRIVATE_VIDEO_TITLE: &str = "Private video";

/// Title-based exclusion rules for one source entry.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Keep only titles containing this text (case-insensitive).
    pub query: Option<String>,
    /// Drop titles containing any of these markers (plain substring match).
    pub excluded_markers: Vec<String>,
}

impl TitleFilter {
    pub fn new(query: Option<String>, excluded_markers: Vec<String>) -> Self {
        Self {
            query,
            excluded_markers,
        }
    }

    pub fn allows(&self, title: &str) -> bool {
        if title == PRIVATE_VIDEO_TITLE {
            return false;
        }
        if let Some(q) = self.query.as_deref() {
            if !title.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        !self
            .excluded_markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| title.contains(m.as_str()))
    }
}

/// Comparator behind [`rank`].
pub fn rank_order(a: &CanonicalContentItem, b: &CanonicalContentItem) -> Ordering {
    // upcoming (true) sorts first
    b.upcoming.cmp(&a.upcoming).then_with(|| match (a.date, b.date) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(da), Some(db)) if a.upcoming => da.cmp(&db),
        (Some(da), Some(db)) => db.cmp(&da),
    })
}

/// Sort by the ranking policy and keep the first `cap` items.
pub fn rank(mut items: Vec<CanonicalContentItem>, cap: usize) -> Vec<CanonicalContentItem> {
    items.sort_by(rank_order);
    items.truncate(cap);
    items
}
