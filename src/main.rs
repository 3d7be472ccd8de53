//! Aggregation job entrypoint: one run, one snapshot.

use anyhow::Result;
use chrono::Utc;

use dashboard_contents::clients::secrets::EnvSecretStore;
use dashboard_contents::clients::store::{FsObjectStore, ObjectStore};
use dashboard_contents::clients::HttpFetcher;
use dashboard_contents::config::{object_store_root, ContentsConfig};
use dashboard_contents::jobs::contents::ContentsJob;
use dashboard_contents::{init_runtime, NotifierMux};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_runtime();

    let cfg = ContentsConfig::load_default()?;
    let fetcher = HttpFetcher::new();
    let secrets = EnvSecretStore;
    let store = FsObjectStore::new(object_store_root());
    let notifier = NotifierMux::from_env();

    let job = ContentsJob::new(&cfg, &fetcher, &secrets, &store);
    let snapshot = job.run_and_notify(Utc::now(), &notifier).await?;
    tracing::info!(
        last_update = %snapshot.last_update,
        uri = %store.uri(&cfg.object_key),
        "done"
    );
    Ok(())
}
