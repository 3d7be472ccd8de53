// src/clients/youtube.rs
//! Video platform Data API v3: search → video details, and playlist items.

use anyhow::{Context, Result};
use reqwest::Url;

use super::Fetch;
use crate::ingest::providers::youtube::{
    decode_playlist, decode_search_ids, decode_videos, PlaylistEntry, Video,
};

pub const DEFAULT_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3";

pub struct YoutubeApi<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    api_key: String,
    pub search_max_results: u32,
    pub playlist_max_results: u32,
}

impl<'a, F: Fetch + ?Sized> YoutubeApi<'a, F> {
    pub fn new(fetcher: &'a F, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            search_max_results: 20,
            playlist_max_results: 10,
        }
    }

    pub fn with_limits(mut self, search: u32, playlist: u32) -> Self {
        self.search_max_results = search;
        self.playlist_max_results = playlist;
        self
    }

    fn url(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{DEFAULT_API_ENDPOINT}/{resource}");
        let mut all: Vec<(&str, &str)> = params.to_vec();
        all.push(("key", self.api_key.as_str()));
        Url::parse_with_params(&base, &all).with_context(|| format!("building {resource} url"))
    }

    async fn get(&self, url: Url) -> Result<Option<Vec<u8>>> {
        self.fetcher.fetch(url.as_str()).await
    }

    /// Latest videos of a channel, optionally narrowed by a keyword, with full details.
    pub async fn search_videos(
        &self,
        channel_id: &str,
        query: Option<&str>,
    ) -> Result<Option<Vec<Video>>> {
        let max = self.search_max_results.to_string();
        let mut params = vec![
            ("part", "id"),
            ("channelId", channel_id),
            ("order", "date"),
            ("maxResults", max.as_str()),
            ("type", "video"),
        ];
        if let Some(q) = query {
            params.push(("q", q));
        }

        let Some(body) = self.get(self.url("search", &params)?).await? else {
            return Ok(None);
        };
        let ids = match decode_search_ids(&body) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, channel_id, "undecodable search response");
                return Ok(None);
            }
        };
        self.videos(&ids).await
    }

    /// Details (snippet + live streaming) for a batch of video ids.
    pub async fn videos(&self, ids: &[String]) -> Result<Option<Vec<Video>>> {
        if ids.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let joined = ids.join(",");
        let params = [("part", "snippet,liveStreamingDetails"), ("id", joined.as_str())];

        let Some(body) = self.get(self.url("videos", &params)?).await? else {
            return Ok(None);
        };
        match decode_videos(&body) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable videos response");
                Ok(None)
            }
        }
    }

    pub async fn playlist_entries(&self, playlist_id: &str) -> Result<Option<Vec<PlaylistEntry>>> {
        let max = self.playlist_max_results.to_string();
        let params = [
            ("part", "snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max.as_str()),
        ];

        let Some(body) = self.get(self.url("playlistItems", &params)?).await? else {
            return Ok(None);
        };
        match decode_playlist(&body) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(error = %e, playlist_id, "undecodable playlist response");
                Ok(None)
            }
        }
    }
}
