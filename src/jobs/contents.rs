// src/jobs/contents.rs
//! Aggregation job: every configured search, playlist and note feed becomes one
//! ranked bucket; the buckets are written as a single snapshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::clients::secrets::SecretStore;
use crate::clients::store::ObjectStore;
use crate::clients::youtube::YoutubeApi;
use crate::clients::Fetch;
use crate::config::ContentsConfig;
use crate::ingest::feed::FeedDocument;
use crate::ingest::types::SourcePayload;
use crate::ingest::Normalizer;
use crate::model::{ContentBucket, Snapshot};
use crate::notify::{Field, NotificationEvent, Notifier};
use crate::rank::{rank, TitleFilter};
use crate::snapshot::assemble;

pub const SERVICE: &str = "dashboard-contents";

pub struct ContentsJob<'a> {
    pub cfg: &'a ContentsConfig,
    pub fetcher: &'a dyn Fetch,
    pub secrets: &'a dyn SecretStore,
    pub store: &'a dyn ObjectStore,
}

impl<'a> ContentsJob<'a> {
    pub fn new(
        cfg: &'a ContentsConfig,
        fetcher: &'a dyn Fetch,
        secrets: &'a dyn SecretStore,
        store: &'a dyn ObjectStore,
    ) -> Self {
        Self {
            cfg,
            fetcher,
            secrets,
            store,
        }
    }

    /// Fetch, normalize, rank and store. Sources are processed one after another.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<Snapshot> {
        let cfg = self.cfg;
        let api_key = self.secrets.get_secret(&cfg.api_key_secret).await?;
        let api = YoutubeApi::new(self.fetcher, api_key)
            .with_limits(cfg.search_max_results, cfg.playlist_max_results);
        let normalizer = Normalizer::new(cfg.excluded_title_markers.clone(), cfg.thumbnail_width);
        let no_filter = TitleFilter::default();

        let mut videos = Vec::with_capacity(cfg.searches.len() + cfg.playlists.len());
        for s in &cfg.searches {
            let filter = normalizer.filter(s.query.as_deref());
            let bucket = match api.search_videos(&cfg.channel_id, s.query.as_deref()).await? {
                Some(v) => self.bucket(&normalizer, &s.name, SourcePayload::Search(v), &filter),
                None => absent(&s.name),
            };
            videos.push(bucket);
        }
        for p in &cfg.playlists {
            let bucket = match api.playlist_entries(&p.id).await? {
                Some(e) => self.bucket(&normalizer, &p.name, SourcePayload::Playlist(e), &no_filter),
                None => absent(&p.name),
            };
            videos.push(bucket);
        }

        let mut notes = Vec::with_capacity(cfg.notes.len());
        for n in &cfg.notes {
            let bucket = match self.feed(&n.url).await? {
                Some(doc) => self.bucket(&normalizer, &n.name, SourcePayload::Feed(doc), &no_filter),
                None => absent(&n.name),
            };
            notes.push(bucket);
        }

        let snapshot = assemble(videos, notes, now);
        let body = snapshot.to_json().context("serializing snapshot")?;
        self.store
            .put_object(&cfg.object_key, body, "application/json")
            .await
            .with_context(|| format!("storing snapshot at {}", cfg.object_key))?;
        tracing::info!(
            key = %cfg.object_key,
            videos = snapshot.videos.len(),
            notes = snapshot.notes.len(),
            "snapshot written"
        );
        Ok(snapshot)
    }

    /// [`run`](Self::run), then report the outcome. Errors are re-raised after
    /// the notification.
    pub async fn run_and_notify(
        &self,
        now: DateTime<Utc>,
        notifier: &dyn Notifier,
    ) -> Result<Snapshot> {
        match self.run(now).await {
            Ok(snapshot) => {
                let fields = snapshot
                    .counts()
                    .into_iter()
                    .map(|(name, n)| Field::new(name, n.to_string()).inline())
                    .collect();
                let ev = NotificationEvent::ok(SERVICE, fields);
                send(notifier, &ev).await;
                Ok(snapshot)
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "aggregation failed");
                send(notifier, &NotificationEvent::error(SERVICE, format!("{e:#}"))).await;
                Err(e)
            }
        }
    }

    async fn feed(&self, url: &str) -> Result<Option<FeedDocument>> {
        let Some(body) = self.fetcher.fetch(url).await? else {
            return Ok(None);
        };
        match FeedDocument::parse(&body) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                tracing::warn!(url, error = %e, "unparsable feed");
                Ok(None)
            }
        }
    }

    fn bucket(
        &self,
        normalizer: &Normalizer,
        name: &str,
        payload: SourcePayload,
        filter: &TitleFilter,
    ) -> ContentBucket {
        let kind = payload.kind();
        let items = rank(normalizer.normalize(payload, filter), self.cfg.max_contents);
        tracing::info!(bucket = name, kind = kind.as_str(), count = items.len(), "bucket ready");
        ContentBucket::new(name, items)
    }
}

fn absent(name: &str) -> ContentBucket {
    tracing::warn!(bucket = name, "source returned no data");
    ContentBucket::empty(name)
}

async fn send(notifier: &dyn Notifier, ev: &NotificationEvent) {
    if let Err(e) = notifier.send(ev).await {
        tracing::warn!(error = %e, "notification failed");
    }
}
