// src/ingest/types.rs
use crate::ingest::feed::FeedDocument;
use crate::ingest::providers::youtube::{PlaylistEntry, Video};

/// Source payload after decoding, tagged by kind. Raw JSON/XML never crosses
/// the normalizer boundary.
#[derive(Debug, Clone)]
pub enum SourcePayload {
    /// Video details for a channel/keyword search.
    Search(Vec<Video>),
    /// Entries of a curated playlist.
    Playlist(Vec<PlaylistEntry>),
    /// Parsed RSS document.
    Feed(FeedDocument),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Search,
    Playlist,
    Feed,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Search => "search",
            SourceKind::Playlist => "playlist",
            SourceKind::Feed => "feed",
        }
    }
}

impl SourcePayload {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourcePayload::Search(_) => SourceKind::Search,
            SourcePayload::Playlist(_) => SourceKind::Playlist,
            SourcePayload::Feed(_) => SourceKind::Feed,
        }
    }
}
