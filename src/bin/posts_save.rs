//! Posts-save entrypoint: `posts-save [YYYY-MM-DD]` (or `TARGET_DATE`);
//! defaults to yesterday in the configured offset.

use anyhow::Result;
use time::OffsetDateTime;

use dashboard_contents::clients::store::FsObjectStore;
use dashboard_contents::clients::HttpFetcher;
use dashboard_contents::config::posts::parse_date;
use dashboard_contents::config::{object_store_root, PostsConfig};
use dashboard_contents::jobs::posts;
use dashboard_contents::{init_runtime, NotifierMux};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_runtime();

    let cfg = PostsConfig::from_env()?;
    let date = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TARGET_DATE").ok())
        .filter(|s| !s.trim().is_empty())
    {
        Some(s) => parse_date(&s)?,
        None => cfg.default_date(OffsetDateTime::now_utc()),
    };

    let fetcher = HttpFetcher::new();
    let store = FsObjectStore::new(object_store_root());
    let notifier = NotifierMux::from_env();

    let report = posts::run_and_notify(&cfg, date, &fetcher, &store, &notifier).await?;
    tracing::info!(
        %date,
        matched = report.matched,
        file = report.file.as_deref().unwrap_or(posts::NO_FILE),
        "done"
    );
    Ok(())
}
