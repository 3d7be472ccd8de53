// src/jobs/posts.rs
//! Posts-save job: export one day of feed posts.

use anyhow::{bail, Context, Result};
use time::{Date, OffsetDateTime};

use crate::clients::store::ObjectStore;
use crate::clients::Fetch;
use crate::config::PostsConfig;
use crate::export::{self, ExportFile, ExportFormat};
use crate::ingest::feed::{FeedDocument, FeedItem};
use crate::model::RssPostItem;
use crate::notify::{Field, NotificationEvent, Notifier};
use crate::quote::rewrite_quote_markup;
use crate::window::{select_in_window, to_post, DayWindow};

pub const SERVICE: &str = "posts-save";
pub const NO_FILE: &str = "No file saved.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsReport {
    pub date: Date,
    pub processed: usize,
    pub matched: usize,
    /// Store location of the export; `None` when nothing matched.
    pub file: Option<String>,
}

impl PostsReport {
    pub fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("Date", self.date.to_string()).inline(),
            Field::new("Posts count", self.matched.to_string()).inline(),
            Field::new("File", self.file.as_deref().unwrap_or(NO_FILE)),
        ]
    }
}

/// Fetch the feed, keep the posts of `date`, write the export if any matched.
pub async fn run(
    cfg: &PostsConfig,
    date: Date,
    fetcher: &dyn Fetch,
    store: &dyn ObjectStore,
) -> Result<PostsReport> {
    let Some(body) = fetcher.fetch(&cfg.feed_url).await? else {
        bail!("feed request failed: {}", cfg.feed_url);
    };
    let doc = FeedDocument::parse(&body).context("parsing posts feed")?;

    let window = DayWindow::new(date, cfg.offset);
    let (selected, stats) = select_in_window(&doc, &window);

    let mut report = PostsReport {
        date,
        processed: stats.processed,
        matched: stats.matched,
        file: None,
    };
    if selected.is_empty() {
        tracing::info!(%date, processed = stats.processed, "no posts in window, nothing saved");
        return Ok(report);
    }

    let file = build_export(cfg, date, &selected)?;
    store
        .put_object(&file.key, file.body, file.content_type)
        .await
        .with_context(|| format!("storing {}", file.key))?;
    report.file = Some(store.uri(&file.key));

    tracing::info!(
        %date,
        processed = stats.processed,
        matched = stats.matched,
        exported = selected.len(),
        key = %file.key,
        "posts exported"
    );
    Ok(report)
}

fn build_export(
    cfg: &PostsConfig,
    date: Date,
    selected: &[(&FeedItem, OffsetDateTime)],
) -> Result<ExportFile> {
    let key = export::object_key(&cfg.output_prefix, date, cfg.format)?;
    let body = match cfg.format {
        ExportFormat::Json => export::to_json(selected.iter().map(|(item, _)| *item))?,
        ExportFormat::Csv => {
            let posts: Vec<RssPostItem> = selected
                .iter()
                .map(|(item, ts)| {
                    let mut post = to_post(item, *ts);
                    post.content = rewrite_quote_markup(&post.content);
                    post
                })
                .collect();
            export::to_csv(&posts)?
        }
    };
    Ok(ExportFile {
        key,
        body,
        content_type: cfg.format.content_type(),
    })
}

/// [`run`], then report `OK` with the summary fields or `ERROR` with the
/// message. The job's error is returned unchanged.
pub async fn run_and_notify(
    cfg: &PostsConfig,
    date: Date,
    fetcher: &dyn Fetch,
    store: &dyn ObjectStore,
    notifier: &dyn Notifier,
) -> Result<PostsReport> {
    let result = run(cfg, date, fetcher, store).await;
    let ev = match &result {
        Ok(report) => NotificationEvent::ok(SERVICE, report.fields()),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), %date, "posts-save failed");
            NotificationEvent::error(SERVICE, format!("{e:#}"))
        }
    };
    if let Err(e) = notifier.send(&ev).await {
        tracing::warn!(error = %e, "notification failed");
    }
    result
}
